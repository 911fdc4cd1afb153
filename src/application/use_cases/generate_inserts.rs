//! # Generate Inserts Use Case
//!
//! Data-campoシートを読み取り、INSERTスクリプト一式を生成するユースケース

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::application::dto::migration_options::MigrationOptions;
use crate::domain::entities::hierarchy::Hierarchy;
use crate::domain::repositories::sheet_repository::SheetRepository;
use crate::domain::services::hierarchy_builder::HierarchyBuilder;
use crate::domain::services::insert_script_renderer::{render_scripts, InsertScripts, ScriptMeta};

/// 生成結果
#[derive(Debug)]
pub struct GenerationOutput {
    pub hierarchy: Hierarchy,
    /// `dry_run` 時は `None`
    pub scripts: Option<InsertScripts>,
}

/// INSERTスクリプト生成ユースケース
///
/// シート読み取り → 階層構築 → スクリプトレンダリングまでを担当する。
/// ファイルへの書き出しはDriver層が行う
pub struct GenerateInsertsUseCase<S: SheetRepository> {
    sheet_repository: Arc<S>,
}

impl<S: SheetRepository> GenerateInsertsUseCase<S> {
    /// 新しいユースケースを作成
    pub fn new(sheet_repository: Arc<S>) -> Self {
        Self { sheet_repository }
    }

    /// シートを読み取りスクリプトを生成する
    ///
    /// # Arguments
    ///
    /// * `spreadsheet_id` - スプレッドシートID
    /// * `options` - 移行設定
    /// * `meta` - スクリプトヘッダーのメタデータ
    /// * `dry_run` - trueの場合は階層構築と統計のみ
    ///
    /// # Errors
    ///
    /// シートの読み取りに失敗した場合にエラーを返す
    pub async fn execute(
        &self,
        spreadsheet_id: &str,
        options: &MigrationOptions,
        meta: &ScriptMeta,
        dry_run: bool,
    ) -> Result<GenerationOutput> {
        let range = options.data_range();
        info!("Reading sheet range {}", range);

        let values = self
            .sheet_repository
            .read_range(spreadsheet_id, &range)
            .await
            .context("Failed to read spreadsheet data")?;

        if values.is_empty() {
            anyhow::bail!("Sheet range {} returned no data", range);
        }

        // 先頭行はヘッダー
        let data_rows = &values[1..];
        info!("Read {} data rows", data_rows.len());

        let builder = HierarchyBuilder::new(&options.country_name, &options.country_code);
        let hierarchy = builder.build(data_rows);

        let scripts = if dry_run {
            None
        } else {
            Some(render_scripts(&hierarchy, options.lot_batch_size, meta))
        };

        Ok(GenerationOutput { hierarchy, scripts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct MockSheetRepository {
        values: Vec<Vec<String>>,
    }

    #[async_trait]
    impl SheetRepository for MockSheetRepository {
        async fn read_range(&self, _spreadsheet_id: &str, _range: &str) -> Result<Vec<Vec<String>>> {
            Ok(self.values.clone())
        }
    }

    struct FailingSheetRepository;

    #[async_trait]
    impl SheetRepository for FailingSheetRepository {
        async fn read_range(&self, _spreadsheet_id: &str, _range: &str) -> Result<Vec<Vec<String>>> {
            anyhow::bail!("401 Unauthorized")
        }
    }

    fn meta() -> ScriptMeta {
        ScriptMeta {
            generated_at: "2026-01-15 10:00:00".to_string(),
            generated_on: "test-host".to_string(),
            source_sheet: "Data-campo".to_string(),
        }
    }

    fn header() -> Vec<String> {
        [
            "growerID",
            "GrowerDescripcion",
            "farmID",
            "farmDescripcion",
            "SectorID",
            "CentroCosto",
            "sectorDescripcion",
            "lotID",
            "loteDescripcion",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn data_row(lote: &str) -> Vec<String> {
        ["AGM", "Agricola Migiva", "F01", "Olmos", "S1", "CC", "Norte", "L1", lote]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_execute_skips_header_row() {
        let repo = Arc::new(MockSheetRepository {
            values: vec![header(), data_row("Lote 1"), data_row("Lote 2")],
        });
        let use_case = GenerateInsertsUseCase::new(repo);

        let output = use_case
            .execute("sheet-id", &MigrationOptions::default(), &meta(), false)
            .await
            .unwrap();

        // ヘッダー行は処理対象外
        assert_eq!(output.hierarchy.stats.total_rows, 2);
        assert_eq!(output.hierarchy.lotes.len(), 2);
        assert!(output.scripts.is_some());
    }

    #[tokio::test]
    async fn test_execute_dry_run_renders_nothing() {
        let repo = Arc::new(MockSheetRepository {
            values: vec![header(), data_row("Lote 1")],
        });
        let use_case = GenerateInsertsUseCase::new(repo);

        let output = use_case
            .execute("sheet-id", &MigrationOptions::default(), &meta(), true)
            .await
            .unwrap();

        assert!(output.scripts.is_none());
        assert_eq!(output.hierarchy.stats.processed, 1);
    }

    #[tokio::test]
    async fn test_execute_empty_sheet_is_error() {
        let repo = Arc::new(MockSheetRepository { values: vec![] });
        let use_case = GenerateInsertsUseCase::new(repo);

        let result = use_case
            .execute("sheet-id", &MigrationOptions::default(), &meta(), false)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_execute_header_only_sheet() {
        let repo = Arc::new(MockSheetRepository {
            values: vec![header()],
        });
        let use_case = GenerateInsertsUseCase::new(repo);

        let output = use_case
            .execute("sheet-id", &MigrationOptions::default(), &meta(), false)
            .await
            .unwrap();

        assert_eq!(output.hierarchy.stats.total_rows, 0);
        let scripts = output.scripts.unwrap();
        assert_eq!(scripts.lot_file_count, 0);
    }

    #[tokio::test]
    async fn test_execute_propagates_read_error() {
        let use_case = GenerateInsertsUseCase::new(Arc::new(FailingSheetRepository));

        let result = use_case
            .execute("sheet-id", &MigrationOptions::default(), &meta(), false)
            .await;

        assert!(result.is_err());
        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains("Failed to read spreadsheet data"));
    }
}
