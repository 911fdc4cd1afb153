//! # Photo Upload Entities
//!
//! Burroデバイスからの写真アップロードを表すドメインエンティティ

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// アップロード対象の1枚の写真
#[derive(Debug, Clone)]
pub struct PhotoJob {
    pub path: PathBuf,
    pub file_name: String,
    /// 写真に紐づく植物ID（例: "00805221"）
    pub plant_id: String,
    /// 撮影日時（省略時はサーバ側でEXIFから抽出される）
    pub timestamp: Option<DateTime<Utc>>,
}

impl PhotoJob {
    pub fn new(path: PathBuf, plant_id: String) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path,
            file_name,
            plant_id,
            timestamp: None,
        }
    }
}

/// サーバでの画像解析結果
///
/// LuzSombraバックエンドが返す光/影の分類結果
#[derive(Debug, Clone, Default)]
pub struct PhotoAnalysis {
    pub analysis_id: Option<String>,
    pub light_pct: Option<f64>,
    pub shadow_pct: Option<f64>,
    pub empresa: Option<String>,
    pub fundo: Option<String>,
    pub sector: Option<String>,
    pub lote: Option<String>,
}

/// フォルダ処理のサマリー
#[derive(Debug, Clone, Default)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub failed: usize,
    pub total: usize,
}

impl UploadSummary {
    /// 全件成功したかどうか
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_job_extracts_file_name() {
        let job = PhotoJob::new(
            PathBuf::from("/fotos/00805221_2025-12-15.jpg"),
            "00805221".to_string(),
        );

        assert_eq!(job.file_name, "00805221_2025-12-15.jpg");
        assert_eq!(job.plant_id, "00805221");
        assert!(job.timestamp.is_none());
    }

    #[test]
    fn test_upload_summary_success() {
        let summary = UploadSummary {
            uploaded: 3,
            failed: 0,
            total: 3,
        };
        assert!(summary.is_success());

        let partial = UploadSummary {
            uploaded: 2,
            failed: 1,
            total: 3,
        };
        assert!(!partial.is_success());
    }
}
