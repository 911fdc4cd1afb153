//! Google Sheets Client
//!
//! Sheets API v4 `values.get` によるSheetRepository実装

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::adapter::auth::google_auth::{fetch_access_token, AuthorizedUserToken};
use crate::domain::repositories::sheet_repository::SheetRepository;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// `values.get` のレスポンス
///
/// セルは常にフォーマット済み文字列で返る（FORMATTED_VALUE）
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheetsクライアント
///
/// 生成時にrefresh_tokenグラントでアクセストークンを取得し、
/// 以後のリクエストでBearerとして使う
pub struct SheetsClient {
    http: reqwest::Client,
    access_token: String,
    api_base: String,
}

impl SheetsClient {
    /// トークンファイルから認証済みクライアントを作成する
    pub async fn new(token_path: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        let credentials = AuthorizedUserToken::from_file(std::path::Path::new(token_path))?;
        let access_token = fetch_access_token(&http, &credentials)
            .await
            .context("Failed to authenticate with Google Sheets")?;

        Ok(Self {
            http,
            access_token,
            api_base: SHEETS_API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base(access_token: &str, api_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token: access_token.to_string(),
            api_base: api_base.to_string(),
        }
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!("{}/{}/values/{}", self.api_base, spreadsheet_id, range)
    }
}

#[async_trait]
impl SheetRepository for SheetsClient {
    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(spreadsheet_id, range);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sheets API error ({}): {}", status, body);
        }

        let value_range: ValueRange = response
            .json()
            .await
            .context("Failed to parse Sheets API response")?;

        Ok(value_range.values)
    }
}
