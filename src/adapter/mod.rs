//! Adapter Layer
//!
//! 外部システム（LuzSombra API, Google Sheets, SQL Server, ファイルシステム）との統合

pub mod auth;
pub mod config;
pub mod luzsombra;
pub mod mssql;
pub mod repositories;
pub mod sheets;
