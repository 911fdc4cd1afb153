//! # Catalog Schemas Use Case
//!
//! 既存テーブルの構造を読み取りカタログを生成するユースケース

use std::sync::Arc;

use anyhow::Result;
use log::warn;

use crate::domain::entities::table_schema::{CatalogEntry, TableRef};
use crate::domain::repositories::schema_repository::SchemaRepository;

/// カタログ対象のテーブル一覧（スキーマ, テーブル, 用途）
///
/// 既存システムのテーブル構成に合わせた固定リスト
pub const CATALOG_TABLES: &[(&str, &str, &str)] = &[
    ("MAST", "USERS", "USUARIO"),
    ("MAST", "ORIGIN", "PAIS"),
    ("GROWER", "GROWERS", "EMPRESA"),
    ("GROWER", "FARMS", "FUNDO"),
    ("GROWER", "STAGE", "SECTOR"),
    ("GROWER", "LOT", "LOTE"),
    ("GROWER", "PLANTATION", "UNION PLANTAS"),
    ("GROWER", "PLANT", "PLANTAS POR LOTE"),
    ("GROWER", "VARIETY", "VARIEDAD"),
    ("PPP", "ESTADOFENOLOGICO", "ESTADO_FENOLOGICO"),
    ("PPP", "GRUPOFENOLOGICO", "GRUPO_FENOLOGICO"),
    ("GROWER", "CAMPAIGN", "CAMPAÑA"),
];

/// スキーマカタログ生成ユースケース
///
/// テーブルごとに構造を読み取り、失敗したテーブルは
/// 「見つからない」エントリとして記録して処理を続行する
pub struct CatalogSchemasUseCase<R: SchemaRepository> {
    schema_repository: Arc<R>,
}

impl<R: SchemaRepository> CatalogSchemasUseCase<R> {
    /// 新しいユースケースを作成
    pub fn new(schema_repository: Arc<R>) -> Self {
        Self { schema_repository }
    }

    /// 全対象テーブルのカタログエントリを収集する
    pub async fn execute(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::with_capacity(CATALOG_TABLES.len());

        for (schema, name, description) in CATALOG_TABLES {
            let table = TableRef::new(schema, name);
            print!("Checking {}... ", table);

            let entry = match self.describe(&table).await {
                Ok(Some(table_schema)) => {
                    let row_count = table_schema
                        .row_count
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "N/A".to_string());
                    println!(
                        "✓ ({} columns, {} rows)",
                        table_schema.columns.len(),
                        row_count
                    );
                    CatalogEntry {
                        table,
                        description: description.to_string(),
                        schema: Some(table_schema),
                    }
                }
                Ok(None) => {
                    println!("⚠ not found");
                    CatalogEntry {
                        table,
                        description: description.to_string(),
                        schema: None,
                    }
                }
                Err(e) => {
                    println!("✗ error");
                    warn!("Failed to describe {}: {:#}", table, e);
                    CatalogEntry {
                        table,
                        description: description.to_string(),
                        schema: None,
                    }
                }
            };

            entries.push(entry);
        }

        Ok(entries)
    }

    async fn describe(
        &self,
        table: &TableRef,
    ) -> Result<Option<crate::domain::entities::table_schema::TableSchema>> {
        if !self.schema_repository.table_exists(table).await? {
            return Ok(None);
        }
        let schema = self.schema_repository.describe_table(table).await?;
        Ok(Some(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;

    use crate::domain::entities::table_schema::TableSchema;

    struct MockSchemaRepository {
        existing: HashSet<String>,
        fail_describe: HashSet<String>,
    }

    impl MockSchemaRepository {
        fn with_tables(names: &[&str]) -> Self {
            Self {
                existing: names.iter().map(|n| n.to_string()).collect(),
                fail_describe: HashSet::new(),
            }
        }
    }

    fn empty_schema() -> TableSchema {
        TableSchema {
            columns: vec![],
            primary_keys: vec![],
            foreign_keys: vec![],
            indexes: vec![],
            row_count: Some(0),
        }
    }

    #[async_trait]
    impl SchemaRepository for MockSchemaRepository {
        async fn table_exists(&self, table: &TableRef) -> Result<bool> {
            Ok(self.existing.contains(&table.to_string()))
        }

        async fn describe_table(&self, table: &TableRef) -> Result<TableSchema> {
            if self.fail_describe.contains(&table.to_string()) {
                anyhow::bail!("permission denied");
            }
            Ok(empty_schema())
        }
    }

    #[tokio::test]
    async fn test_execute_covers_all_catalog_tables() {
        let repo = Arc::new(MockSchemaRepository::with_tables(&["GROWER.FARMS"]));
        let use_case = CatalogSchemasUseCase::new(repo);

        let entries = use_case.execute().await.unwrap();

        assert_eq!(entries.len(), CATALOG_TABLES.len());
        let farms = entries
            .iter()
            .find(|e| e.table.to_string() == "GROWER.FARMS")
            .unwrap();
        assert!(farms.schema.is_some());
        assert_eq!(farms.description, "FUNDO");
    }

    #[tokio::test]
    async fn test_execute_missing_table_recorded_as_none() {
        let repo = Arc::new(MockSchemaRepository::with_tables(&[]));
        let use_case = CatalogSchemasUseCase::new(repo);

        let entries = use_case.execute().await.unwrap();

        assert!(entries.iter().all(|e| e.schema.is_none()));
    }

    #[tokio::test]
    async fn test_execute_describe_failure_does_not_abort() {
        let mut repo = MockSchemaRepository::with_tables(&["GROWER.FARMS", "GROWER.LOT"]);
        repo.fail_describe.insert("GROWER.FARMS".to_string());
        let use_case = CatalogSchemasUseCase::new(Arc::new(repo));

        let entries = use_case.execute().await.unwrap();

        let farms = entries
            .iter()
            .find(|e| e.table.to_string() == "GROWER.FARMS")
            .unwrap();
        assert!(farms.schema.is_none());

        let lot = entries
            .iter()
            .find(|e| e.table.to_string() == "GROWER.LOT")
            .unwrap();
        assert!(lot.schema.is_some());
    }
}
