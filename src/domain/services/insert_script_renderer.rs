//! # Insert Script Renderer
//!
//! 組織階層から冪等なINSERTスクリプト群を生成するドメインサービス

use crate::domain::entities::hierarchy::{Hierarchy, Lote};

/// 移行先データベース名
pub const TARGET_DATABASE: &str = "AgricolaDB";
/// 移行先スキーマ名
pub const TARGET_SCHEMA: &str = "image";

/// 生成される1つのSQLファイル
#[derive(Debug, Clone)]
pub struct ScriptFile {
    pub name: String,
    pub content: String,
}

/// スクリプトヘッダーに埋め込むメタデータ
#[derive(Debug, Clone)]
pub struct ScriptMeta {
    /// 生成日時（表示用にフォーマット済み）
    pub generated_at: String,
    /// 生成したホスト名
    pub generated_on: String,
    /// データ取得元のシート名
    pub source_sheet: String,
}

/// 生成されたスクリプト一式
///
/// `files` は実行順（マスター、1、2、3-1、3-2…）に並ぶ
#[derive(Debug, Clone)]
pub struct InsertScripts {
    pub files: Vec<ScriptFile>,
    pub lot_file_count: usize,
}

/// SQL文字列リテラル用のエスケープ（`'` を `''` に重ねる）
pub fn sql_escape(value: &str) -> String {
    value.replace('\'', "''")
}

/// 階層全体からスクリプト一式をレンダリングする
///
/// # Arguments
///
/// * `hierarchy` - 構築済みの組織階層
/// * `lot_batch_size` - 1ファイルあたりのLote数（0は全件1ファイル）
/// * `meta` - ヘッダーメタデータ
pub fn render_scripts(hierarchy: &Hierarchy, lot_batch_size: usize, meta: &ScriptMeta) -> InsertScripts {
    let file_1 = ScriptFile {
        name: "insert_1_pais_empresa_fundo.sql".to_string(),
        content: render_pais_empresa_fundo(hierarchy, meta),
    };

    let file_2 = ScriptFile {
        name: "insert_2_sectores.sql".to_string(),
        content: render_sectores(hierarchy, meta),
    };

    let lot_files = render_lotes(hierarchy, lot_batch_size, meta);
    let lot_file_count = lot_files.len();

    let master = ScriptFile {
        name: "insert_0_ejecutar_todos.sql".to_string(),
        content: render_master(&lot_files),
    };

    let mut files = vec![master, file_1, file_2];
    files.extend(lot_files);

    InsertScripts {
        files,
        lot_file_count,
    }
}

/// 各SQLファイル共通のヘッダー
fn render_header(description: &str, meta: &ScriptMeta) -> String {
    format!(
        "-- =====================================================\n\
         -- {description}\n\
         -- Generado automáticamente desde Google Sheets\n\
         -- Fecha: {generated_at} ({generated_on})\n\
         -- Fuente: {source_sheet}\n\
         -- Base de datos: {database}\n\
         -- Schema: {schema}\n\
         -- =====================================================\n\
         \n\
         USE {database};\n\
         GO\n\
         \n",
        description = description,
        generated_at = meta.generated_at,
        generated_on = meta.generated_on,
        source_sheet = meta.source_sheet,
        database = TARGET_DATABASE,
        schema = TARGET_SCHEMA,
    )
}

fn section_banner(title: &str) -> String {
    format!(
        "-- =====================================================\n\
         -- {title}\n\
         -- =====================================================\n\
         \n"
    )
}

/// スクリプト1: Países, Empresas, Fundos
fn render_pais_empresa_fundo(hierarchy: &Hierarchy, meta: &ScriptMeta) -> String {
    let mut sql = render_header("Script 1: Inserción de Países, Empresas y Fundos", meta);

    sql.push_str(&section_banner("1. INSERTAR PAÍSES"));
    for pais in &hierarchy.paises {
        let nombre = sql_escape(&pais.pais);
        let abrev = sql_escape(&pais.paisabrev);
        sql.push_str(&format!(
            "IF NOT EXISTS (SELECT 1 FROM {schema}.pais WHERE paisabrev = '{abrev}')\n\
             BEGIN\n\
             \x20   INSERT INTO {schema}.pais (pais, paisabrev, statusid, usercreatedid, usermodifiedid)\n\
             \x20   VALUES ('{nombre}', '{abrev}', 1, 1, 1);\n\
             \x20   PRINT 'País {nombre} insertado';\n\
             END\n\
             ELSE\n\
             BEGIN\n\
             \x20   PRINT 'País {nombre} ya existe';\n\
             END\n\
             GO\n\n",
            schema = TARGET_SCHEMA,
        ));
    }

    sql.push_str(&section_banner(&format!(
        "2. INSERTAR EMPRESAS\n-- Total: {}",
        hierarchy.empresas.len()
    )));
    for empresa in &hierarchy.empresas {
        let nombre = sql_escape(&empresa.empresa);
        let abrev = sql_escape(&empresa.empresabrev);
        let pais = sql_escape(&empresa.pais_abrev);
        sql.push_str(&format!(
            "-- Empresa: [{abrev}] {nombre}\n\
             IF NOT EXISTS (SELECT 1 FROM {schema}.empresa WHERE empresabrev = '{abrev}' AND paisid = (SELECT paisid FROM {schema}.pais WHERE paisabrev = '{pais}'))\n\
             BEGIN\n\
             \x20   INSERT INTO {schema}.empresa (paisid, empresa, empresabrev, statusid, usercreatedid, usermodifiedid)\n\
             \x20   VALUES (\n\
             \x20       (SELECT paisid FROM {schema}.pais WHERE paisabrev = '{pais}'),\n\
             \x20       '{nombre}',\n\
             \x20       '{abrev}',\n\
             \x20       1, 1, 1\n\
             \x20   );\n\
             \x20   PRINT 'Empresa [{abrev}] {nombre} insertada';\n\
             END\n\
             GO\n\n",
            schema = TARGET_SCHEMA,
        ));
    }

    sql.push_str(&section_banner(&format!(
        "3. INSERTAR FUNDOS\n-- Total: {}",
        hierarchy.fundos.len()
    )));
    for fundo in &hierarchy.fundos {
        let nombre = sql_escape(&fundo.fundo);
        let abrev = sql_escape(&fundo.fundobrev);
        let empresa = sql_escape(&fundo.empresa_abrev);
        sql.push_str(&format!(
            "-- Fundo: [{abrev}] {nombre} | Empresa: [{empresa}]\n\
             IF NOT EXISTS (SELECT 1 FROM {schema}.fundo WHERE fundobrev = '{abrev}' AND empresaid = (SELECT empresaid FROM {schema}.empresa WHERE empresabrev = '{empresa}'))\n\
             BEGIN\n\
             \x20   INSERT INTO {schema}.fundo (empresaid, fundo, fundobrev, statusid, usercreatedid, usermodifiedid)\n\
             \x20   VALUES (\n\
             \x20       (SELECT empresaid FROM {schema}.empresa WHERE empresabrev = '{empresa}'),\n\
             \x20       '{nombre}',\n\
             \x20       '{abrev}',\n\
             \x20       1, 1, 1\n\
             \x20   );\n\
             \x20   PRINT 'Fundo [{abrev}] {nombre} insertado en empresa [{empresa}]';\n\
             END\n\
             GO\n\n",
            schema = TARGET_SCHEMA,
        ));
    }

    sql.push_str("\nPRINT 'Script 1 completado: Países, Empresas y Fundos insertados';\nGO\n");
    sql
}

/// スクリプト2: Sectores
fn render_sectores(hierarchy: &Hierarchy, meta: &ScriptMeta) -> String {
    let mut sql = render_header("Script 2: Inserción de Sectores", meta);

    sql.push_str(&section_banner(&format!(
        "INSERTAR SECTORES\n-- Total: {}",
        hierarchy.sectores.len()
    )));

    for sector in &hierarchy.sectores {
        let nombre = sql_escape(&sector.sector);
        let brev = sql_escape(&sector.sectorbrev);
        let fundo = sql_escape(&sector.fundo_abrev);
        let empresa = sql_escape(&sector.empresa_abrev);
        sql.push_str(&format!(
            "-- Sector: {nombre} | Fundo: [{fundo}] | Empresa: [{empresa}]\n\
             IF NOT EXISTS (\n\
             \x20   SELECT 1 FROM {schema}.sector\n\
             \x20   WHERE sector = '{nombre}'\n\
             \x20   AND fundoid = (\n\
             \x20       SELECT fundoid FROM {schema}.fundo\n\
             \x20       WHERE fundobrev = '{fundo}'\n\
             \x20       AND empresaid = (SELECT empresaid FROM {schema}.empresa WHERE empresabrev = '{empresa}')\n\
             \x20   )\n\
             )\n\
             BEGIN\n\
             \x20   INSERT INTO {schema}.sector (fundoid, sector, sectorbrev, statusid, usercreatedid, usermodifiedid)\n\
             \x20   VALUES (\n\
             \x20       (SELECT fundoid FROM {schema}.fundo WHERE fundobrev = '{fundo}' AND empresaid = (SELECT empresaid FROM {schema}.empresa WHERE empresabrev = '{empresa}')),\n\
             \x20       '{nombre}',\n\
             \x20       '{brev}',\n\
             \x20       1, 1, 1\n\
             \x20   );\n\
             \x20   PRINT 'Sector {nombre} insertado en fundo [{fundo}]';\n\
             END\n\
             GO\n\n",
            schema = TARGET_SCHEMA,
        ));
    }

    sql.push_str("\nPRINT 'Script 2 completado: Sectores insertados';\nGO\n");
    sql
}

fn render_lote_insert(lote: &Lote) -> String {
    let nombre = sql_escape(&lote.lote);
    let brev = sql_escape(&lote.lotebrev);
    let sector = sql_escape(&lote.sector);
    let fundo = sql_escape(&lote.fundo_abrev);
    let empresa = sql_escape(&lote.empresa_abrev);

    format!(
        "-- Lote: {nombre}\n\
         IF NOT EXISTS (\n\
         \x20   SELECT 1 FROM {schema}.lote\n\
         \x20   WHERE lote = '{nombre}'\n\
         \x20   AND sectorid = (\n\
         \x20       SELECT sectorid FROM {schema}.sector\n\
         \x20       WHERE sector = '{sector}'\n\
         \x20       AND fundoid = (\n\
         \x20           SELECT fundoid FROM {schema}.fundo\n\
         \x20           WHERE fundobrev = '{fundo}'\n\
         \x20           AND empresaid = (SELECT empresaid FROM {schema}.empresa WHERE empresabrev = '{empresa}')\n\
         \x20       )\n\
         \x20   )\n\
         )\n\
         BEGIN\n\
         \x20   INSERT INTO {schema}.lote (sectorid, lote, lotebrev, statusid, usercreatedid, usermodifiedid)\n\
         \x20   VALUES (\n\
         \x20       (SELECT sectorid FROM {schema}.sector\n\
         \x20        WHERE sector = '{sector}'\n\
         \x20        AND fundoid = (\n\
         \x20            SELECT fundoid FROM {schema}.fundo\n\
         \x20            WHERE fundobrev = '{fundo}'\n\
         \x20            AND empresaid = (SELECT empresaid FROM {schema}.empresa WHERE empresabrev = '{empresa}')\n\
         \x20        )),\n\
         \x20       '{nombre}',\n\
         \x20       '{brev}',\n\
         \x20       1, 1, 1\n\
         \x20   );\n\
         END\n\
         GO\n\n",
        schema = TARGET_SCHEMA,
    )
}

/// スクリプト3: Lotes（複数ファイルに分割）
fn render_lotes(hierarchy: &Hierarchy, lot_batch_size: usize, meta: &ScriptMeta) -> Vec<ScriptFile> {
    let lotes = &hierarchy.lotes;
    if lotes.is_empty() {
        return Vec::new();
    }

    let batch_size = if lot_batch_size == 0 {
        lotes.len()
    } else {
        lot_batch_size
    };
    let total_files = lotes.len().div_ceil(batch_size);

    lotes
        .chunks(batch_size)
        .enumerate()
        .map(|(part, chunk)| {
            let first = part * batch_size + 1;
            let last = part * batch_size + chunk.len();
            let part_num = part + 1;

            let mut sql = render_header(
                &format!(
                    "Script 3 Parte {}/{}: Inserción de Lotes ({}-{})",
                    part_num, total_files, first, last
                ),
                meta,
            );
            sql.push_str(&section_banner(&format!(
                "INSERTAR LOTES - PARTE {} de {}\n-- Lotes: {} a {} (Total: {})",
                part_num,
                total_files,
                first,
                last,
                chunk.len()
            )));

            for lote in chunk {
                sql.push_str(&render_lote_insert(lote));
            }

            sql.push_str(&format!(
                "\nPRINT 'Script 3 Parte {} completado: Lotes {}-{} insertados';\nGO\n",
                part_num, first, last
            ));

            ScriptFile {
                name: format!("insert_3_lotes_part_{}.sql", part_num),
                content: sql,
            }
        })
        .collect()
}

/// マスタースクリプト: 全ファイルを依存順に実行する
fn render_master(lot_files: &[ScriptFile]) -> String {
    let mut sql = format!(
        "-- =====================================================\n\
         -- SCRIPT MAESTRO: Ejecutar todos los inserts en orden\n\
         -- =====================================================\n\
         -- IMPORTANTE: Ejecutar con sqlcmd (o SSMS en modo SQLCMD)\n\
         -- desde el directorio de los archivos generados\n\
         --\n\
         -- Jerarquía: País -> Empresa -> Fundo -> Sector -> Lote\n\
         -- =====================================================\n\
         \n\
         PRINT 'Iniciando inserción de jerarquía organizacional...';\n\
         PRINT '';\n\
         \n\
         -- Verificar que la base de datos existe\n\
         IF NOT EXISTS (SELECT name FROM sys.databases WHERE name = '{database}')\n\
         BEGIN\n\
         \x20   PRINT 'ERROR: La base de datos {database} no existe';\n\
         \x20   RAISERROR('Base de datos no encontrada', 16, 1);\n\
         \x20   RETURN;\n\
         END\n\
         GO\n\
         \n\
         USE {database};\n\
         GO\n\
         \n\
         PRINT 'Base de datos: {database}';\n\
         PRINT '';\n\
         \n\
         PRINT '1. Ejecutando: insert_1_pais_empresa_fundo.sql';\n\
         :r insert_1_pais_empresa_fundo.sql\n\
         PRINT '';\n\
         \n\
         PRINT '2. Ejecutando: insert_2_sectores.sql';\n\
         :r insert_2_sectores.sql\n\
         PRINT '';\n\
         \n",
        database = TARGET_DATABASE,
    );

    for (idx, file) in lot_files.iter().enumerate() {
        sql.push_str(&format!(
            "PRINT '3.{num} Ejecutando: {name}';\n:r {name}\nPRINT '';\n\n",
            num = idx + 1,
            name = file.name,
        ));
    }

    sql.push_str(&format!(
        "-- =====================================================\n\
         -- RESUMEN FINAL\n\
         -- =====================================================\n\
         PRINT '';\n\
         PRINT 'INSERCIÓN DE JERARQUÍA COMPLETADA';\n\
         PRINT '';\n\
         \n\
         SELECT 'Países' AS Nivel, COUNT(*) AS Total FROM {schema}.pais WHERE statusid = 1\n\
         UNION ALL\n\
         SELECT 'Empresas', COUNT(*) FROM {schema}.empresa WHERE statusid = 1\n\
         UNION ALL\n\
         SELECT 'Fundos', COUNT(*) FROM {schema}.fundo WHERE statusid = 1\n\
         UNION ALL\n\
         SELECT 'Sectores', COUNT(*) FROM {schema}.sector WHERE statusid = 1\n\
         UNION ALL\n\
         SELECT 'Lotes', COUNT(*) FROM {schema}.lote WHERE statusid = 1;\n\
         \n\
         PRINT 'Proceso completado.';\n\
         GO\n",
        schema = TARGET_SCHEMA,
    ));

    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::hierarchy_builder::HierarchyBuilder;

    fn meta() -> ScriptMeta {
        ScriptMeta {
            generated_at: "2026-01-15 10:00:00".to_string(),
            generated_on: "test-host".to_string(),
            source_sheet: "Data-campo".to_string(),
        }
    }

    fn row(empresa_abrev: &str, lote: &str) -> Vec<String> {
        vec![
            empresa_abrev.to_string(),
            "Agricola Migiva".to_string(),
            "F01".to_string(),
            "Olmos".to_string(),
            "S1".to_string(),
            "CC".to_string(),
            "Norte".to_string(),
            "L1".to_string(),
            lote.to_string(),
        ]
    }

    fn sample_hierarchy(lote_count: usize) -> crate::domain::entities::hierarchy::Hierarchy {
        let rows: Vec<Vec<String>> = (0..lote_count)
            .map(|i| row("AGM", &format!("Lote {}", i)))
            .collect();
        HierarchyBuilder::new("Perú", "PE").build(&rows)
    }

    #[test]
    fn test_sql_escape_doubles_quotes() {
        assert_eq!(sql_escape("O'Brien"), "O''Brien");
        assert_eq!(sql_escape("sin comillas"), "sin comillas");
        assert_eq!(sql_escape("a'b'c"), "a''b''c");
    }

    #[test]
    fn test_render_scripts_file_names() {
        let scripts = render_scripts(&sample_hierarchy(3), 500, &meta());

        let names: Vec<&str> = scripts.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "insert_0_ejecutar_todos.sql",
                "insert_1_pais_empresa_fundo.sql",
                "insert_2_sectores.sql",
                "insert_3_lotes_part_1.sql",
            ]
        );
        assert_eq!(scripts.lot_file_count, 1);
    }

    #[test]
    fn test_lote_chunking() {
        // 1201件を500件ずつ → 3ファイル
        let scripts = render_scripts(&sample_hierarchy(1201), 500, &meta());
        assert_eq!(scripts.lot_file_count, 3);

        let part_3 = scripts
            .files
            .iter()
            .find(|f| f.name == "insert_3_lotes_part_3.sql")
            .unwrap();
        assert!(part_3.content.contains("Parte 3/3"));
        assert!(part_3.content.contains("1001 a 1201"));
    }

    #[test]
    fn test_every_insert_is_guarded() {
        let scripts = render_scripts(&sample_hierarchy(2), 500, &meta());

        for file in scripts.files.iter().filter(|f| f.name != "insert_0_ejecutar_todos.sql") {
            let inserts = file.content.matches("INSERT INTO").count();
            let guards = file.content.matches("IF NOT EXISTS").count();
            assert_eq!(inserts, guards, "unguarded INSERT in {}", file.name);
        }
    }

    #[test]
    fn test_duplicate_empresa_yields_single_insert() {
        let rows = vec![row("AGM", "Lote 1"), row("AGM", "Lote 2")];
        let hierarchy = HierarchyBuilder::new("Perú", "PE").build(&rows);
        let scripts = render_scripts(&hierarchy, 500, &meta());

        let file_1 = &scripts.files[1];
        assert_eq!(file_1.content.matches("INSERT INTO image.empresa").count(), 1);
    }

    #[test]
    fn test_quotes_escaped_in_output() {
        let mut raw = row("AGM", "Lote O'Higgins");
        raw[1] = "Agricola O'Farrell".to_string();
        let hierarchy = HierarchyBuilder::new("Perú", "PE").build(&[raw]);
        let scripts = render_scripts(&hierarchy, 500, &meta());

        let file_1 = &scripts.files[1];
        assert!(file_1.content.contains("'Agricola O''Farrell'"));

        let lotes = &scripts.files[3];
        assert!(lotes.content.contains("O''Higgins"));
        // エスケープ前の裸のリテラルが残っていないこと
        assert!(!lotes.content.contains("'Lote O'Higgins'"));
    }

    #[test]
    fn test_header_uses_target_database() {
        let scripts = render_scripts(&sample_hierarchy(1), 500, &meta());
        let file_1 = &scripts.files[1];

        assert!(file_1.content.starts_with("-- ====="));
        assert!(file_1.content.contains("USE AgricolaDB;"));
        assert!(file_1.content.contains("Fuente: Data-campo"));
        assert!(file_1.content.contains("2026-01-15 10:00:00"));
    }

    #[test]
    fn test_master_references_all_lot_files_in_order() {
        let scripts = render_scripts(&sample_hierarchy(1201), 500, &meta());
        let master = &scripts.files[0];

        assert!(master.content.contains(":r insert_1_pais_empresa_fundo.sql"));
        assert!(master.content.contains(":r insert_2_sectores.sql"));

        let pos_1 = master.content.find(":r insert_3_lotes_part_1.sql").unwrap();
        let pos_2 = master.content.find(":r insert_3_lotes_part_2.sql").unwrap();
        let pos_3 = master.content.find(":r insert_3_lotes_part_3.sql").unwrap();
        assert!(pos_1 < pos_2 && pos_2 < pos_3);

        assert!(master.content.contains("RAISERROR('Base de datos no encontrada', 16, 1)"));
    }

    #[test]
    fn test_empty_hierarchy_produces_no_lot_files() {
        let hierarchy = HierarchyBuilder::new("Perú", "PE").build(&[]);
        let scripts = render_scripts(&hierarchy, 500, &meta());

        assert_eq!(scripts.lot_file_count, 0);
        assert_eq!(scripts.files.len(), 3); // マスター + 1 + 2
    }

    #[test]
    fn test_zero_batch_size_single_file() {
        let scripts = render_scripts(&sample_hierarchy(750), 0, &meta());
        assert_eq!(scripts.lot_file_count, 1);
    }

    #[test]
    fn test_sector_insert_resolves_parents_by_subquery() {
        let scripts = render_scripts(&sample_hierarchy(1), 500, &meta());
        let sectores = &scripts.files[2];

        assert!(sectores
            .content
            .contains("SELECT fundoid FROM image.fundo WHERE fundobrev = 'F01'"));
        assert!(sectores
            .content
            .contains("SELECT empresaid FROM image.empresa WHERE empresabrev = 'AGM'"));
    }
}
