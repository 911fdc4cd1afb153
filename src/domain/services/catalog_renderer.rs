//! # Catalog Renderer
//!
//! テーブルカタログのMarkdown/JSONレンダリング

use anyhow::Result;
use std::collections::BTreeMap;

use crate::domain::entities::table_schema::{CatalogEntry, TableSchema};

/// カタログヘッダーに埋め込むメタデータ
#[derive(Debug, Clone)]
pub struct CatalogMeta {
    pub database: String,
    pub server: String,
    pub generated_at: String,
    pub generated_on: String,
}

/// カタログ全体をMarkdownにレンダリングする
pub fn render_markdown(entries: &[CatalogEntry], meta: &CatalogMeta) -> String {
    let mut md = String::new();

    md.push_str("# Catálogo de Schemas - Tablas Existentes\n\n");
    md.push_str("## Base de Datos\n\n");
    md.push_str(&format!(
        "**{}** en servidor `{}`\n\n",
        meta.database, meta.server
    ));
    md.push_str(&format!(
        "**Generado automáticamente** el {} desde `{}`\n\n---\n\n",
        meta.generated_at, meta.generated_on
    ));

    // 目次
    md.push_str("## Tabla de Contenido\n\n");
    for (i, entry) in entries.iter().enumerate() {
        if entry.schema.is_some() {
            md.push_str(&format!(
                "{num}. [{table}](#{num}-{anchor}) - {desc}\n",
                num = i + 1,
                table = entry.table,
                anchor = format!("{}{}", entry.table.schema, entry.table.name).to_lowercase(),
                desc = entry.description,
            ));
        }
    }
    md.push_str("\n---\n\n");

    for (i, entry) in entries.iter().enumerate() {
        md.push_str(&render_table_section(i + 1, entry));
    }

    md.push_str(&render_relations());
    md
}

fn render_table_section(num: usize, entry: &CatalogEntry) -> String {
    let mut md = format!("## {}. {} - {}\n\n", num, entry.table, entry.description);

    let schema = match &entry.schema {
        Some(schema) => schema,
        None => {
            md.push_str("**Tabla no encontrada o sin acceso**\n\n---\n\n");
            return md;
        }
    };

    md.push_str(&format!("**Propósito**: {}\n\n", entry.description));

    md.push_str("### Estructura\n\n");
    md.push_str("| COLUMN_NAME | DATA_TYPE | MAX_LENGTH | IS_NULLABLE | DEFAULT | NOTAS |\n");
    md.push_str("|-------------|-----------|------------|-------------|---------|-------|\n");

    for col in &schema.columns {
        let mut notes: Vec<String> = Vec::new();
        if schema.is_primary_key(&col.name) {
            notes.push("**PK**".to_string());
        }
        for fk in schema.foreign_keys_for(&col.name) {
            notes.push(format!(
                "FK → {}.{}.{}",
                fk.referenced_schema, fk.referenced_table, fk.referenced_column
            ));
        }
        let lower = col.name.to_lowercase();
        if lower.contains("status") || lower.contains("active") {
            notes.push("**Estado**".to_string());
        }

        let max_len = col
            .max_length
            .map(|l| l.to_string())
            .unwrap_or_default();
        let nullable = if col.is_nullable { "YES" } else { "NO" };
        let default = col.default.clone().unwrap_or_default();

        md.push_str(&format!(
            "| **{}** | {} | {} | {} | {} | {} |\n",
            col.name,
            col.formatted_type(),
            max_len,
            nullable,
            default,
            notes.join(" / "),
        ));
    }

    if !schema.primary_keys.is_empty() {
        md.push_str("\n### Primary Keys\n\n");
        for pk in &schema.primary_keys {
            md.push_str(&format!("- `{}` ({})\n", pk.name, pk.data_type));
        }
    }

    if !schema.foreign_keys.is_empty() {
        md.push_str("\n### Foreign Keys\n\n");
        for fk in &schema.foreign_keys {
            md.push_str(&format!(
                "- `{}` → `{}.{}.{}`\n",
                fk.column, fk.referenced_schema, fk.referenced_table, fk.referenced_column
            ));
        }
    }

    if !schema.indexes.is_empty() {
        md.push_str("\n### Índices\n\n");
        for idx in &schema.indexes {
            let unique = if idx.is_unique { "UNIQUE " } else { "" };
            md.push_str(&format!(
                "- `{}` ({}{}) - Columnas: {}\n",
                idx.name, unique, idx.type_desc, idx.columns
            ));
        }
    }

    if let Some(count) = schema.row_count {
        md.push_str("\n### Estadísticas\n\n");
        md.push_str(&format!("- **Total de registros**: {}\n", count));
    }

    md.push_str("\n---\n\n");
    md
}

/// 既知のテーブル間リレーション図（固定）
fn render_relations() -> String {
    "## Relaciones Entre Tablas\n\n\
     ```\n\
     GROWER.GROWERS (empresa)\n\
     \x20 └─ GROWER.FARMS (fundo)\n\
     \x20     └─ GROWER.STAGE (sector)\n\
     \x20         └─ GROWER.LOT (lote)\n\
     \x20             ├─ GROWER.PLANTATION (relación lote-variedad)\n\
     \x20             │   └─ GROWER.VARIETY (variedad)\n\
     \x20             └─ image.Analisis_Imagen (análisis luz/sombra)\n\
     \n\
     MAST.USERS (usuarios)\n\
     ```\n"
        .to_string()
}

/// JSONミラーをレンダリングする
///
/// 読み取れなかったテーブルは出力に含まれない
pub fn render_json(entries: &[CatalogEntry]) -> Result<String> {
    let map: BTreeMap<String, &TableSchema> = entries
        .iter()
        .filter_map(|entry| {
            entry
                .schema
                .as_ref()
                .map(|schema| (entry.table.to_string(), schema))
        })
        .collect();

    Ok(serde_json::to_string_pretty(&map)?)
}
