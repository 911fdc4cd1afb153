//! # Configuration
//!
//! `.env.local` から読み込む実行時設定

use std::env;
use std::path::Path;

use log::{info, warn};

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// `.env.local` を読み込んで環境変数に反映する
///
/// ファイルが無い場合はシステムの環境変数のみを使う（エラーにしない）
pub fn load_env_file(path: &str) -> bool {
    let expanded = shellexpand::tilde(path).to_string();

    if !Path::new(&expanded).exists() {
        warn!("Env file not found: {}, using system environment", expanded);
        return false;
    }

    match dotenvy::from_path(&expanded) {
        Ok(()) => {
            info!("Loaded environment from {}", expanded);
            true
        }
        Err(e) => {
            warn!("Failed to load {}: {}", expanded, e);
            false
        }
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// LuzSombraデバイスAPIの設定
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// バックエンドのベースURL（例: `https://luzsombra-backend.azurewebsites.net/api`）
    pub base_url: String,
    /// Webアプリで登録したデバイスID（例: `BURRO_001`)
    pub device_id: String,
    /// デバイスのAPIキー
    pub api_key: String,
}

impl DeviceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: require_var("LUZSOMBRA_API_URL")?,
            device_id: require_var("LUZSOMBRA_DEVICE_ID")?,
            api_key: require_var("LUZSOMBRA_API_KEY")?,
        })
    }
}

/// SQL Server接続設定
#[derive(Debug, Clone)]
pub struct SqlConfig {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl SqlConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_raw = env::var("SQL_PORT").unwrap_or_else(|_| "1433".to_string());
        let port = port_raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue {
                name: "SQL_PORT",
                value: port_raw.clone(),
            })?;

        Ok(Self {
            server: require_var("SQL_SERVER")?,
            port,
            database: require_var("SQL_DATABASE")?,
            user: require_var("SQL_USER")?,
            password: require_var("SQL_PASSWORD")?,
        })
    }
}

/// Google Sheets接続設定
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// authorized-user形式のトークンJSONへのパス（チルダ展開済み）
    pub token_path: String,
}

impl SheetsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let token_path = require_var("GOOGLE_SHEETS_TOKEN_PATH")?;

        Ok(Self {
            spreadsheet_id: require_var("GOOGLE_SHEETS_SPREADSHEET_ID")?,
            token_path: shellexpand::tilde(&token_path).to_string(),
        })
    }
}
