//! # Schema Repository Trait
//!
//! データベースのテーブル構造読み取りを抽象化

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::table_schema::{TableRef, TableSchema};

/// スキーマリポジトリ
///
/// テーブル構造の読み取り（SELECTのみ）を担当するリポジトリ
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// テーブルが存在するかどうかを確認する
    async fn table_exists(&self, table: &TableRef) -> Result<bool>;

    /// テーブル構造（カラム、PK、FK、インデックス、件数）を読み取る
    ///
    /// # Errors
    ///
    /// テーブルが存在しない、または読み取りに失敗した場合にエラーを返す
    async fn describe_table(&self, table: &TableRef) -> Result<TableSchema>;
}
