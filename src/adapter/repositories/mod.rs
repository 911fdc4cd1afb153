//! Repository Implementations
//!
//! ファイルシステムベースのRepository実装

pub mod file_photo_repository;
