//! File Photo Repository Implementation
//!
//! PhotoSourceRepositoryのファイルシステム実装

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::domain::repositories::photo_source_repository::PhotoSourceRepository;

/// 対象とする画像拡張子
const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// ファイルシステムベースの写真ソースリポジトリ
pub struct FilePhotoRepository;

impl FilePhotoRepository {
    /// 新しいリポジトリを作成
    pub fn new() -> Self {
        Self
    }

    /// ディレクトリ直下の写真を発見する（内部実装）
    fn discover_photos_internal(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            anyhow::bail!("Photo directory does not exist: {}", dir.display());
        }

        let mut photos = Vec::new();

        // サブディレクトリは対象外（写真はフォルダ直下に置かれる運用）
        for entry in WalkDir::new(dir)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase());

            if let Some(ext) = extension {
                if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
                    photos.push(path.to_path_buf());
                }
            }
        }

        photos.sort();

        info!("Found {} photos in {}", photos.len(), dir.display());
        Ok(photos)
    }

    /// マッピングJSONを読み込む（内部実装）
    fn load_mapping_internal(path: &Path) -> Result<HashMap<String, String>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read mapping file: {}", path.display()))?;

        let mapping: HashMap<String, String> =
            serde_json::from_str(&content).context("Mapping file must be a JSON object of string to string")?;

        Ok(mapping)
    }
}

#[async_trait]
impl PhotoSourceRepository for FilePhotoRepository {
    async fn discover_photos(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || Self::discover_photos_internal(&dir))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }

    async fn load_mapping(&self, path: &Path) -> Result<HashMap<String, String>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::load_mapping_internal(&path))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }
}

impl Default for FilePhotoRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(b"data").unwrap();
    }

    #[test]
    fn test_discover_photos_filters_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "b.JPEG");
        touch(dir.path(), "c.png");
        touch(dir.path(), "notas.txt");
        touch(dir.path(), "script.sql");

        let photos = FilePhotoRepository::discover_photos_internal(dir.path()).unwrap();

        assert_eq!(photos.len(), 3);
        let names: Vec<String> = photos
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.JPEG", "c.png"]);
    }

    #[test]
    fn test_discover_photos_ignores_subdirectories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg");
        let sub = dir.path().join("procesadas");
        std::fs::create_dir(&sub).unwrap();
        touch(&sub, "b.jpg");

        let photos = FilePhotoRepository::discover_photos_internal(dir.path()).unwrap();
        assert_eq!(photos.len(), 1);
    }

    #[test]
    fn test_discover_photos_missing_dir() {
        let result = FilePhotoRepository::discover_photos_internal(Path::new("/no/existe"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_mapping() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapeo.json");
        std::fs::write(&path, r#"{"foto1.jpg": "00805221", "foto2.jpg": "00805222"}"#).unwrap();

        let mapping = FilePhotoRepository::load_mapping_internal(&path).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["foto1.jpg"], "00805221");
    }

    #[test]
    fn test_load_mapping_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mapeo.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = FilePhotoRepository::load_mapping_internal(&path);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_async_discover() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.jpg");

        let repo = FilePhotoRepository::new();
        let photos = repo.discover_photos(dir.path()).await.unwrap();
        assert_eq!(photos.len(), 1);
    }
}
