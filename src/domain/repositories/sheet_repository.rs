//! # Sheet Repository Trait
//!
//! スプレッドシートの範囲読み取りを抽象化

use anyhow::Result;
use async_trait::async_trait;

/// シートリポジトリ
///
/// Google Sheetsからのデータ読み取りを担当するリポジトリ
#[async_trait]
pub trait SheetRepository: Send + Sync {
    /// 指定範囲のセル値を読み取る
    ///
    /// # Arguments
    ///
    /// * `spreadsheet_id` - スプレッドシートID
    /// * `range` - A1形式の範囲（例: `Data-campo!A:I`）
    ///
    /// # Returns
    ///
    /// 行ごとのセル値（ヘッダー行を含む）。短い行は末尾セルが省略される
    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>>;
}
