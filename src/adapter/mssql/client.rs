//! SQL Server Client
//!
//! tiberiusによるSQL Server接続

use anyhow::{Context, Result};
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::adapter::config::SqlConfig;

/// 接続済みのSQL Serverクライアント
pub type MssqlClient = Client<Compat<TcpStream>>;

/// SQL Serverへ接続する
///
/// SQL Server認証を使用し、サーバ証明書は検証しない
/// （`TrustServerCertificate=yes` 相当）
pub async fn connect(config: &SqlConfig) -> Result<MssqlClient> {
    let mut tds_config = Config::new();
    tds_config.host(&config.server);
    tds_config.port(config.port);
    tds_config.database(&config.database);
    tds_config.authentication(AuthMethod::sql_server(&config.user, &config.password));
    tds_config.trust_cert();

    let tcp = TcpStream::connect(tds_config.get_addr())
        .await
        .with_context(|| {
            format!(
                "Failed to connect to SQL Server {}:{}",
                config.server, config.port
            )
        })?;
    tcp.set_nodelay(true)
        .context("Failed to set TCP_NODELAY")?;

    let client = Client::connect(tds_config, tcp.compat_write())
        .await
        .with_context(|| format!("Failed to authenticate against {}", config.database))?;

    Ok(client)
}
