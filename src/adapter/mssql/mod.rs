//! SQL Server Adapter
//!
//! tiberiusクライアントとスキーマ読み取り（SELECTのみ）

pub mod client;
pub mod schema_repository;
