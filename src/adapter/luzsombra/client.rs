//! LuzSombra Device Client
//!
//! Burroデバイス用のREST APIクライアント（認証＋写真アップロード）

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::info;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::adapter::config::DeviceConfig;
use crate::domain::entities::photo::{PhotoAnalysis, PhotoJob};

use super::retry::{calculate_retry_delay, error_chain_to_string, is_retryable_error, MAX_RETRIES};

/// トークン失効前に再ログインする安全マージン（秒）
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 300;
/// ログインリクエストのタイムアウト（秒）
const LOGIN_TIMEOUT_SECS: u64 = 10;
/// アップロードのタイムアウト（秒）。サーバ側の画像処理を待つため長め
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// デバイスAPIエラー
#[derive(Debug, thiserror::Error)]
pub enum DeviceApiError {
    #[error("Login failed ({status}): {body}")]
    LoginRejected { status: u16, body: String },

    #[error("Upload rejected ({status}): {message}")]
    UploadRejected { status: u16, message: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    device_id: &'a str,
    api_key: &'a str,
}

fn default_expires_in() -> i64 {
    86400
}

/// `POST /auth/login` のレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "expiresIn", default = "default_expires_in")]
    pub expires_in: i64,
}

/// `POST /photos/upload` のレスポンス
///
/// バックエンドはsnake_caseとcamelCaseが混在したフィールドを返す
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, rename = "photoId", alias = "analisisID")]
    pub photo_id: Option<serde_json::Value>,
    #[serde(default)]
    pub porcentaje_luz: Option<f64>,
    #[serde(default)]
    pub porcentaje_sombra: Option<f64>,
    #[serde(default)]
    pub empresa: Option<String>,
    #[serde(default)]
    pub fundo: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub lote: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl UploadResponse {
    fn photo_id_string(&self) -> Option<String> {
        self.photo_id.as_ref().map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        })
    }
}

impl From<UploadResponse> for PhotoAnalysis {
    fn from(response: UploadResponse) -> Self {
        let analysis_id = response.photo_id_string();
        PhotoAnalysis {
            analysis_id,
            light_pct: response.porcentaje_luz,
            shadow_pct: response.porcentaje_sombra,
            empresa: response.empresa,
            fundo: response.fundo,
            sector: response.sector,
            lote: response.lote,
        }
    }
}

/// Transport for the device REST API
/// This enables mocking in tests while using reqwest in production
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Authenticate the device and obtain a JWT
    async fn login(&self, device_id: &str, api_key: &str) -> Result<LoginResponse>;

    /// Upload one photo as multipart/form-data
    async fn upload(
        &self,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
        plant_id: &str,
        timestamp: Option<String>,
    ) -> Result<UploadResponse>;
}

/// reqwest-based transport implementation
pub struct HttpDeviceTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDeviceTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn mime_for(file_name: &str) -> &'static str {
        if file_name.to_lowercase().ends_with(".png") {
            "image/png"
        } else {
            "image/jpeg"
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl DeviceTransport for HttpDeviceTransport {
    async fn login(&self, device_id: &str, api_key: &str) -> Result<LoginResponse> {
        let url = format!("{}/auth/login", self.base_url);

        let response = self
            .http
            .post(&url)
            .timeout(std::time::Duration::from_secs(LOGIN_TIMEOUT_SECS))
            .json(&LoginRequest { device_id, api_key })
            .send()
            .await
            .with_context(|| format!("POST {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeviceApiError::LoginRejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        response
            .json::<LoginResponse>()
            .await
            .context("Failed to parse login response")
    }

    async fn upload(
        &self,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
        plant_id: &str,
        timestamp: Option<String>,
    ) -> Result<UploadResponse> {
        let url = format!("{}/photos/upload", self.base_url);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(Self::mime_for(file_name))
            .context("Invalid MIME type")?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("plantId", plant_id.to_string());
        if let Some(timestamp) = timestamp {
            form = form.text("timestamp", timestamp);
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("POST {}", url))?;

        let status = response.status();
        if !status.is_success() {
            // エラー本文の `error` フィールドを取り出せたら使う
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UploadResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(body);
            return Err(DeviceApiError::UploadRejected {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        response
            .json::<UploadResponse>()
            .await
            .context("Failed to parse upload response")
    }
}

/// 認証状態を保持するデバイスセッション
///
/// トークンの有効期限を追跡し、必要なときだけ再ログインする
pub struct DeviceSession<T: DeviceTransport> {
    transport: T,
    device_id: String,
    api_key: String,
    token: Option<String>,
    token_expires_at: Option<DateTime<Utc>>,
}

impl<T: DeviceTransport> DeviceSession<T> {
    /// 新しいセッションを作成（未ログイン状態）
    pub fn new(transport: T, config: &DeviceConfig) -> Self {
        Self {
            transport,
            device_id: config.device_id.clone(),
            api_key: config.api_key.clone(),
            token: None,
            token_expires_at: None,
        }
    }

    /// デバイスを認証してトークンを取得する
    pub async fn login(&mut self) -> Result<()> {
        let response = self.transport.login(&self.device_id, &self.api_key).await?;

        // 失効5分前には期限切れ扱いにする
        let expires_at =
            Utc::now() + Duration::seconds(response.expires_in - TOKEN_EXPIRY_MARGIN_SECS);

        info!(
            "Device {} authenticated, token valid for {}s",
            self.device_id, response.expires_in
        );

        self.token = Some(response.token);
        self.token_expires_at = Some(expires_at);
        Ok(())
    }

    /// 現在のトークンが有効かどうか
    pub fn is_token_valid(&self) -> bool {
        match (&self.token, self.token_expires_at) {
            (Some(_), Some(expires_at)) => Utc::now() < expires_at,
            _ => false,
        }
    }

    /// 有効なトークンを保証する（必要ならログインする）
    pub async fn ensure_authenticated(&mut self) -> Result<()> {
        if !self.is_token_valid() {
            info!("Token missing or expired, logging in...");
            self.login().await?;
        }
        Ok(())
    }

    /// 写真を1枚アップロードする
    ///
    /// 一時的なエラーは指数バックオフでリトライする
    pub async fn upload_photo(&mut self, job: &PhotoJob) -> Result<PhotoAnalysis> {
        let bytes = tokio::fs::read(&job.path)
            .await
            .with_context(|| format!("Failed to read photo: {}", job.path.display()))?;
        let timestamp = job.timestamp.map(|t| t.to_rfc3339());

        let mut retry_count = 0;

        loop {
            self.ensure_authenticated().await?;
            let token = self
                .token
                .clone()
                .context("No token after authentication")?;

            match self
                .transport
                .upload(
                    &token,
                    &job.file_name,
                    bytes.clone(),
                    &job.plant_id,
                    timestamp.clone(),
                )
                .await
            {
                Ok(response) => return Ok(response.into()),
                Err(e) => {
                    let error_msg = error_chain_to_string(&e);

                    if is_retryable_error(&error_msg) && retry_count < MAX_RETRIES {
                        retry_count += 1;
                        let delay = calculate_retry_delay(retry_count);
                        log::warn!(
                            "Upload of {} failed (attempt {}), retrying in {}ms: {}",
                            job.file_name,
                            retry_count,
                            delay,
                            error_msg
                        );
                        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
                    } else {
                        return Err(e)
                            .with_context(|| format!("Failed to upload {}", job.file_name));
                    }
                }
            }
        }
    }

    #[cfg(test)]
    fn force_expire_token(&mut self) {
        self.token_expires_at = Some(Utc::now() - Duration::seconds(1));
    }
}
