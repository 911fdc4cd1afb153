//! # Table Schema Entities
//!
//! SQL Serverテーブル構造のドメインエンティティ

use serde::Serialize;
use std::fmt;

/// カタログ対象テーブルへの参照（スキーマ名＋テーブル名）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: &str, name: &str) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// カラム定義
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
    pub max_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub position: i32,
}

impl ColumnDef {
    /// 表示用のデータ型表記を返す
    ///
    /// 文字型は `NVARCHAR(50)`、`max_length == -1` は `NVARCHAR(MAX)`、
    /// 数値型は `DECIMAL(10,2)` のように整形する
    pub fn formatted_type(&self) -> String {
        let dt = self.data_type.to_uppercase();

        if let Some(max_len) = self.max_length {
            if matches!(dt.as_str(), "NVARCHAR" | "VARCHAR" | "NCHAR" | "CHAR") {
                if max_len == -1 {
                    return format!("{}(MAX)", dt);
                }
                return format!("{}({})", dt, max_len);
            }
        }

        if let Some(precision) = self.numeric_precision {
            if let Some(scale) = self.numeric_scale.filter(|s| *s != 0) {
                return format!("{}({},{})", dt, precision, scale);
            }
            return format!("{}({})", dt, precision);
        }

        dt
    }
}

/// 主キーカラム
#[derive(Debug, Clone, Serialize)]
pub struct PrimaryKeyColumn {
    pub name: String,
    pub data_type: String,
}

/// 外部キー参照
#[derive(Debug, Clone, Serialize)]
pub struct ForeignKeyRef {
    pub name: String,
    pub column: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// インデックス定義
#[derive(Debug, Clone, Serialize)]
pub struct IndexDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_desc: String,
    pub is_unique: bool,
    pub columns: String,
}

/// テーブル構造一式
#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
    pub primary_keys: Vec<PrimaryKeyColumn>,
    pub foreign_keys: Vec<ForeignKeyRef>,
    pub indexes: Vec<IndexDef>,
    /// 総レコード数（読み取れなかった場合は `None`）
    pub row_count: Option<i64>,
}

impl TableSchema {
    /// 指定カラムが主キーに含まれるか
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys.iter().any(|pk| pk.name == column)
    }

    /// 指定カラムを参照元とする外部キーの一覧
    pub fn foreign_keys_for(&self, column: &str) -> Vec<&ForeignKeyRef> {
        self.foreign_keys
            .iter()
            .filter(|fk| fk.column == column)
            .collect()
    }
}

/// カタログの1エントリ
///
/// `schema == None` は「テーブルが見つからない／アクセス不可」を表す
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub table: TableRef,
    pub description: String,
    pub schema: Option<TableSchema>,
}
