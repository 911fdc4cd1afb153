//! # Migration Options DTO
//!
//! Sheets → SQL Server 移行のData Transfer Object

/// 移行設定
///
/// Data-campoシートの読み取りとSQLスクリプト生成に必要な設定
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    /// 読み取り対象のシート名
    pub sheet_name: String,
    /// 1ファイルあたりのLote数（INSERTスクリプトの分割単位）
    pub lot_batch_size: usize,
    /// 全行に適用する国名
    pub country_name: String,
    /// 国コード
    pub country_code: String,
}

impl MigrationOptions {
    /// 新しい移行設定を作成
    pub fn new(sheet_name: &str, lot_batch_size: usize) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            lot_batch_size,
            country_name: "Perú".to_string(),
            country_code: "PE".to_string(),
        }
    }

    /// 読み取り範囲（A1形式）を返す
    ///
    /// データは列A〜Iに収まる
    pub fn data_range(&self) -> String {
        format!("{}!A:I", self.sheet_name)
    }
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self::new("Data-campo", 500)
    }
}
