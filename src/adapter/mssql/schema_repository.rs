//! SQL Server Schema Repository Implementation
//!
//! SchemaRepositoryのSQL Server実装（SELECTのみ、書き込みは行わない）

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::warn;
use tokio::sync::Mutex;

use crate::adapter::mssql::client::MssqlClient;
use crate::domain::entities::table_schema::{
    ColumnDef, ForeignKeyRef, IndexDef, PrimaryKeyColumn, TableRef, TableSchema,
};
use crate::domain::repositories::schema_repository::SchemaRepository;

/// 識別子が英数字とアンダースコアのみで構成されるか
///
/// 動的SQLに埋め込めるのはこの条件を満たす名前だけ
fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// ブラケット識別子用のエスケープ（`]` を `]]` に重ねる）
fn bracket_escape(name: &str) -> String {
    name.replace(']', "]]")
}

/// `[schema].[table]` 形式の修飾名
fn quoted_name(table: &TableRef) -> String {
    format!(
        "[{}].[{}]",
        bracket_escape(&table.schema),
        bracket_escape(&table.name)
    )
}

/// SQL Serverベースのスキーマリポジトリ
pub struct MssqlSchemaRepository {
    client: Mutex<MssqlClient>,
}

impl MssqlSchemaRepository {
    /// 接続済みクライアントからリポジトリを作成
    pub fn new(client: MssqlClient) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    async fn fetch_columns(&self, table: &TableRef) -> Result<Vec<ColumnDef>> {
        const QUERY: &str = "\
            SELECT \
                COLUMN_NAME, \
                DATA_TYPE, \
                CAST(CHARACTER_MAXIMUM_LENGTH AS INT) AS CHARACTER_MAXIMUM_LENGTH, \
                CAST(NUMERIC_PRECISION AS INT) AS NUMERIC_PRECISION, \
                CAST(NUMERIC_SCALE AS INT) AS NUMERIC_SCALE, \
                IS_NULLABLE, \
                COLUMN_DEFAULT, \
                CAST(ORDINAL_POSITION AS INT) AS ORDINAL_POSITION \
            FROM INFORMATION_SCHEMA.COLUMNS \
            WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2 \
            ORDER BY ORDINAL_POSITION";

        let mut client = self.client.lock().await;
        let rows = client
            .query(QUERY, &[&table.schema.as_str(), &table.name.as_str()])
            .await
            .context("Failed to query INFORMATION_SCHEMA.COLUMNS")?
            .into_first_result()
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let is_nullable: Option<&str> = row.try_get(5)?;
            columns.push(ColumnDef {
                name: row
                    .try_get::<&str, _>(0)?
                    .unwrap_or_default()
                    .to_string(),
                data_type: row
                    .try_get::<&str, _>(1)?
                    .unwrap_or_default()
                    .to_string(),
                max_length: row.try_get(2)?,
                numeric_precision: row.try_get(3)?,
                numeric_scale: row.try_get(4)?,
                is_nullable: is_nullable == Some("YES"),
                default: row.try_get::<&str, _>(6)?.map(|s| s.to_string()),
                position: row.try_get::<i32, _>(7)?.unwrap_or_default(),
            });
        }

        Ok(columns)
    }

    async fn fetch_primary_keys(&self, table: &TableRef) -> Result<Vec<PrimaryKeyColumn>> {
        const QUERY: &str = "\
            SELECT kcu.COLUMN_NAME, col.DATA_TYPE \
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
            INNER JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu \
                ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME \
                AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA \
                AND tc.TABLE_NAME = kcu.TABLE_NAME \
            INNER JOIN INFORMATION_SCHEMA.COLUMNS col \
                ON col.TABLE_SCHEMA = kcu.TABLE_SCHEMA \
                AND col.TABLE_NAME = kcu.TABLE_NAME \
                AND col.COLUMN_NAME = kcu.COLUMN_NAME \
            WHERE tc.TABLE_SCHEMA = @P1 \
              AND tc.TABLE_NAME = @P2 \
              AND tc.CONSTRAINT_TYPE = 'PRIMARY KEY' \
            ORDER BY kcu.ORDINAL_POSITION";

        let mut client = self.client.lock().await;
        let rows = client
            .query(QUERY, &[&table.schema.as_str(), &table.name.as_str()])
            .await
            .context("Failed to query primary keys")?
            .into_first_result()
            .await?;

        rows.iter()
            .map(|row| {
                Ok(PrimaryKeyColumn {
                    name: row
                        .try_get::<&str, _>(0)?
                        .unwrap_or_default()
                        .to_string(),
                    data_type: row
                        .try_get::<&str, _>(1)?
                        .unwrap_or_default()
                        .to_string(),
                })
            })
            .collect()
    }

    async fn fetch_foreign_keys(&self, table: &TableRef) -> Result<Vec<ForeignKeyRef>> {
        const QUERY: &str = "\
            SELECT \
                fk.name AS ForeignKeyName, \
                COL_NAME(fc.parent_object_id, fc.parent_column_id) AS ParentColumn, \
                OBJECT_SCHEMA_NAME(fk.referenced_object_id) AS ReferencedSchema, \
                OBJECT_NAME(fk.referenced_object_id) AS ReferencedTable, \
                COL_NAME(fc.referenced_object_id, fc.referenced_column_id) AS ReferencedColumn \
            FROM sys.foreign_keys AS fk \
            INNER JOIN sys.foreign_key_columns AS fc \
                ON fk.object_id = fc.constraint_object_id \
            WHERE OBJECT_SCHEMA_NAME(fk.parent_object_id) = @P1 \
              AND OBJECT_NAME(fk.parent_object_id) = @P2 \
            ORDER BY fk.name, fc.constraint_column_id";

        let mut client = self.client.lock().await;
        let rows = client
            .query(QUERY, &[&table.schema.as_str(), &table.name.as_str()])
            .await
            .context("Failed to query foreign keys")?
            .into_first_result()
            .await?;

        rows.iter()
            .map(|row| {
                Ok(ForeignKeyRef {
                    name: row
                        .try_get::<&str, _>(0)?
                        .unwrap_or_default()
                        .to_string(),
                    column: row
                        .try_get::<&str, _>(1)?
                        .unwrap_or_default()
                        .to_string(),
                    referenced_schema: row
                        .try_get::<&str, _>(2)?
                        .unwrap_or_default()
                        .to_string(),
                    referenced_table: row
                        .try_get::<&str, _>(3)?
                        .unwrap_or_default()
                        .to_string(),
                    referenced_column: row
                        .try_get::<&str, _>(4)?
                        .unwrap_or_default()
                        .to_string(),
                })
            })
            .collect()
    }

    async fn fetch_indexes(&self, table: &TableRef) -> Result<Vec<IndexDef>> {
        // OBJECT_IDは完全な文字列を要求するためパラメータ化できない。
        // ブラケットエスケープ済みの修飾名を文字列リテラルとして埋め込む
        let object_name = quoted_name(table).replace('\'', "''");
        let query = format!(
            "SELECT \
                i.name AS IndexName, \
                i.type_desc AS IndexType, \
                i.is_unique AS IsUnique, \
                STRING_AGG(c.name, ', ') WITHIN GROUP (ORDER BY ic.key_ordinal) AS Columns \
            FROM sys.indexes i \
            INNER JOIN sys.index_columns ic \
                ON i.object_id = ic.object_id AND i.index_id = ic.index_id \
            INNER JOIN sys.columns c \
                ON ic.object_id = c.object_id AND ic.column_id = c.column_id \
            WHERE i.object_id = OBJECT_ID('{}') \
              AND i.type > 0 \
            GROUP BY i.name, i.type_desc, i.is_unique \
            ORDER BY i.name",
            object_name
        );

        let mut client = self.client.lock().await;
        let rows = client
            .query(query, &[])
            .await
            .context("Failed to query indexes")?
            .into_first_result()
            .await?;

        rows.iter()
            .map(|row| {
                Ok(IndexDef {
                    name: row
                        .try_get::<&str, _>(0)?
                        .unwrap_or_default()
                        .to_string(),
                    type_desc: row
                        .try_get::<&str, _>(1)?
                        .unwrap_or_default()
                        .to_string(),
                    is_unique: row.try_get::<bool, _>(2)?.unwrap_or(false),
                    columns: row
                        .try_get::<&str, _>(3)?
                        .unwrap_or_default()
                        .to_string(),
                })
            })
            .collect()
    }

    /// レコード数を数える（読み取れない場合は `None`）
    async fn fetch_row_count(&self, table: &TableRef) -> Option<i64> {
        if !is_safe_identifier(&table.schema) || !is_safe_identifier(&table.name) {
            warn!("Skipping row count for non-simple table name: {}", table);
            return None;
        }

        let query = format!("SELECT COUNT_BIG(*) FROM {}", quoted_name(table));

        let mut client = self.client.lock().await;
        let result = async {
            let row = client
                .query(query, &[])
                .await?
                .into_row()
                .await?
                .context("COUNT_BIG returned no row")?;
            row.try_get::<i64, _>(0)?
                .context("COUNT_BIG returned NULL")
        }
        .await;

        match result {
            Ok(count) => Some(count),
            Err(e) => {
                warn!("Could not count rows of {}: {:#}", table, e);
                None
            }
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[async_trait]
impl SchemaRepository for MssqlSchemaRepository {
    async fn table_exists(&self, table: &TableRef) -> Result<bool> {
        const QUERY: &str = "\
            SELECT COUNT(*) \
            FROM INFORMATION_SCHEMA.TABLES \
            WHERE TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2";

        let mut client = self.client.lock().await;
        let row = client
            .query(QUERY, &[&table.schema.as_str(), &table.name.as_str()])
            .await
            .context("Failed to query INFORMATION_SCHEMA.TABLES")?
            .into_row()
            .await?
            .context("Existence query returned no row")?;

        let count: i32 = row.try_get(0)?.unwrap_or(0);
        Ok(count > 0)
    }

    async fn describe_table(&self, table: &TableRef) -> Result<TableSchema> {
        let columns = self.fetch_columns(table).await?;
        if columns.is_empty() {
            anyhow::bail!("Table {} has no visible columns", table);
        }

        let primary_keys = self.fetch_primary_keys(table).await?;
        let foreign_keys = self.fetch_foreign_keys(table).await?;
        let indexes = self.fetch_indexes(table).await?;
        let row_count = self.fetch_row_count(table).await;

        Ok(TableSchema {
            columns,
            primary_keys,
            foreign_keys,
            indexes,
            row_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_safe_identifier() {
        assert!(is_safe_identifier("GROWER"));
        assert!(is_safe_identifier("ESTADO_FENOLOGICO"));
        assert!(is_safe_identifier("USERS2"));

        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier("GROWER FARMS"));
        assert!(!is_safe_identifier("x;DROP TABLE y"));
        assert!(!is_safe_identifier("CAMPAÑA"));
    }

    #[test]
    fn test_bracket_escape() {
        assert_eq!(bracket_escape("FARMS"), "FARMS");
        assert_eq!(bracket_escape("weird]name"), "weird]]name");
    }

    #[test]
    fn test_quoted_name() {
        let table = TableRef::new("GROWER", "FARMS");
        assert_eq!(quoted_name(&table), "[GROWER].[FARMS]");
    }
}
