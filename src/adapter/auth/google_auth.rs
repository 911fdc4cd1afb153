//! Google OAuth2 Authentication
//!
//! Google Sheets API用のアクセストークン取得

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// authorized-user形式のトークンJSON
///
/// Google OAuthフローで保存される `token.json` と同じ形式
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUserToken {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl AuthorizedUserToken {
    /// トークンJSONファイルを読み込む
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?;
        let token: Self =
            serde_json::from_str(&content).context("Failed to parse authorized user token JSON")?;
        Ok(token)
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// refresh_tokenグラントでアクセストークンを取得する
pub async fn fetch_access_token(
    http: &reqwest::Client,
    credentials: &AuthorizedUserToken,
) -> Result<String> {
    let params = [
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("refresh_token", credentials.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];

    let response = http
        .post(credentials.token_uri())
        .form(&params)
        .send()
        .await
        .context("Failed to reach Google token endpoint")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Token refresh failed ({}): {}", status, body);
    }

    let token: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token response")?;

    Ok(token.access_token)
}
