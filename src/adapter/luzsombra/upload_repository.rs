//! LuzSombra Upload Repository Implementation
//!
//! PhotoUploadRepositoryのデバイスAPI実装

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::adapter::config::DeviceConfig;
use crate::adapter::luzsombra::client::{DeviceSession, DeviceTransport, HttpDeviceTransport};
use crate::domain::entities::photo::{PhotoAnalysis, PhotoJob};
use crate::domain::repositories::photo_repository::PhotoUploadRepository;

/// LuzSombraアップロードリポジトリ
///
/// セッション（トークン状態）を内部に保持し、
/// 複数回のアップロードで認証を共有する
pub struct LuzSombraUploadRepository<T: DeviceTransport> {
    session: Mutex<DeviceSession<T>>,
}

impl LuzSombraUploadRepository<HttpDeviceTransport> {
    /// 設定からリポジトリを作成
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let transport = HttpDeviceTransport::new(&config.base_url)?;
        Ok(Self {
            session: Mutex::new(DeviceSession::new(transport, config)),
        })
    }
}

impl<T: DeviceTransport> LuzSombraUploadRepository<T> {
    /// 任意のトランスポートからリポジトリを作成（テスト用）
    pub fn with_transport(transport: T, config: &DeviceConfig) -> Self {
        Self {
            session: Mutex::new(DeviceSession::new(transport, config)),
        }
    }
}

#[async_trait]
impl<T: DeviceTransport> PhotoUploadRepository for LuzSombraUploadRepository<T> {
    async fn upload_photo(&self, job: &PhotoJob) -> Result<PhotoAnalysis> {
        let mut session = self.session.lock().await;
        session.upload_photo(job).await
    }
}
