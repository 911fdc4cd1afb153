//! # Photo Upload Repository Trait
//!
//! 写真アップロードを抽象化

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::photo::{PhotoAnalysis, PhotoJob};

/// 写真アップロードリポジトリ
///
/// 認証とアップロードの詳細はAdapter層の実装に委ねる
#[async_trait]
pub trait PhotoUploadRepository: Send + Sync {
    /// 1枚の写真をアップロードして解析結果を受け取る
    ///
    /// # Errors
    ///
    /// 認証・通信・サーバ側処理のいずれかに失敗した場合にエラーを返す
    async fn upload_photo(&self, job: &PhotoJob) -> Result<PhotoAnalysis>;
}
