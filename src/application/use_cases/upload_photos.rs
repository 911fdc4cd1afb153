//! # Upload Photos Use Case
//!
//! フォルダ内の写真をLuzSombraバックエンドへアップロードするユースケース

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::warn;

use crate::domain::entities::photo::{PhotoJob, UploadSummary};
use crate::domain::repositories::photo_repository::PhotoUploadRepository;
use crate::domain::repositories::photo_source_repository::PhotoSourceRepository;

/// ファイル名からplantIdを解決する
///
/// マッピングにあればそれを優先し、無ければファイル名の
/// 先頭セグメント（最初の `_` まで）を使う。
/// 例: `00805221_2025-12-15.jpg` → `00805221`
pub fn resolve_plant_id(file_name: &str, mapping: Option<&HashMap<String, String>>) -> Option<String> {
    if let Some(mapping) = mapping {
        if let Some(plant_id) = mapping.get(file_name) {
            return Some(plant_id.clone());
        }
    }

    let stem = Path::new(file_name).file_stem()?.to_string_lossy();
    let prefix = stem.split('_').next().unwrap_or_default().trim().to_string();

    if prefix.is_empty() {
        None
    } else {
        Some(prefix)
    }
}

/// 写真アップロードユースケース
///
/// 写真を1枚ずつアップロードし、個別の失敗はログに残して続行する
pub struct UploadPhotosUseCase<S: PhotoSourceRepository, U: PhotoUploadRepository> {
    source_repository: Arc<S>,
    upload_repository: Arc<U>,
}

impl<S: PhotoSourceRepository, U: PhotoUploadRepository> UploadPhotosUseCase<S, U> {
    /// 新しいユースケースを作成
    pub fn new(source_repository: Arc<S>, upload_repository: Arc<U>) -> Self {
        Self {
            source_repository,
            upload_repository,
        }
    }

    /// ディレクトリ内の写真を処理する
    ///
    /// # Arguments
    ///
    /// * `dir` - 写真ディレクトリ
    /// * `mapping_path` - ファイル名 → plantId マッピングJSON（任意）
    /// * `dry_run` - trueの場合はアップロードせず対象のみ表示
    pub async fn execute(
        &self,
        dir: &Path,
        mapping_path: Option<&Path>,
        dry_run: bool,
    ) -> Result<UploadSummary> {
        let mapping = match mapping_path {
            Some(path) => Some(
                self.source_repository
                    .load_mapping(path)
                    .await
                    .with_context(|| format!("Failed to load mapping file: {}", path.display()))?,
            ),
            None => None,
        };

        let photos = self.source_repository.discover_photos(dir).await?;
        println!("✓ Found {} photos in {}", photos.len(), dir.display());

        let mut summary = UploadSummary {
            total: photos.len(),
            ..Default::default()
        };

        for path in photos {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let plant_id = match resolve_plant_id(&file_name, mapping.as_ref()) {
                Some(plant_id) => plant_id,
                None => {
                    warn!("Could not resolve plantId for {}, skipping", file_name);
                    summary.failed += 1;
                    continue;
                }
            };

            let job = PhotoJob::new(path, plant_id);

            if dry_run {
                println!("  - Would upload {} (plantId: {})", job.file_name, job.plant_id);
                summary.uploaded += 1;
                continue;
            }

            match self.upload_repository.upload_photo(&job).await {
                Ok(analysis) => {
                    println!(
                        "✓ {} processed (luz: {}%, sombra: {}%)",
                        job.file_name,
                        analysis
                            .light_pct
                            .map(|p| p.to_string())
                            .unwrap_or_else(|| "N/A".to_string()),
                        analysis
                            .shadow_pct
                            .map(|p| p.to_string())
                            .unwrap_or_else(|| "N/A".to_string()),
                    );
                    summary.uploaded += 1;
                }
                Err(e) => {
                    println!("✗ {} failed: {:#}", job.file_name, e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
