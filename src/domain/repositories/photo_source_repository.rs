//! # Photo Source Repository Trait
//!
//! アップロード対象写真の発見とマッピング読み込みを抽象化

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 写真ソースリポジトリ
///
/// ローカルファイルシステム上の写真の発見を担当するリポジトリ
#[async_trait]
pub trait PhotoSourceRepository: Send + Sync {
    /// ディレクトリ直下の画像ファイル（jpg/jpeg/png）を発見する
    ///
    /// # Returns
    ///
    /// ファイル名順にソートされたパスのリスト
    async fn discover_photos(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// ファイル名 → plantId のマッピングファイル（JSON）を読み込む
    async fn load_mapping(&self, path: &Path) -> Result<HashMap<String, String>>;
}
