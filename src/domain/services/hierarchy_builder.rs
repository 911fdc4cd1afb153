//! # Hierarchy Builder Service
//!
//! シート行から組織階層を構築するドメインサービス

use std::collections::HashSet;

use crate::domain::entities::hierarchy::{
    truncate_brev, Empresa, FieldRow, Fundo, Hierarchy, Lote, Pais, Sector,
};

/// 階層構築サービス
///
/// 非正規化されたシート行を1パスで走査し、各レベルを重複排除しながら
/// 挿入順を保った階層に組み立てる
pub struct HierarchyBuilder {
    country_name: String,
    country_code: String,
}

impl HierarchyBuilder {
    /// 新しいビルダーを作成
    ///
    /// # Arguments
    ///
    /// * `country_name` - 全行に適用する国名（例: "Perú"）
    /// * `country_code` - 国コード（例: "PE"）
    pub fn new(country_name: &str, country_code: &str) -> Self {
        Self {
            country_name: country_name.to_string(),
            country_code: country_code.to_string(),
        }
    }

    /// データ行（ヘッダーを除く）から階層を構築する
    ///
    /// セルが9個未満の行、および必須名称が欠けている行はスキップされ
    /// 統計情報に計上される
    pub fn build(&self, rows: &[Vec<String>]) -> Hierarchy {
        let mut hierarchy = Hierarchy::default();
        hierarchy.stats.total_rows = rows.len();

        let mut seen_paises: HashSet<String> = HashSet::new();
        let mut seen_empresas: HashSet<String> = HashSet::new();
        let mut seen_fundos: HashSet<(String, String)> = HashSet::new();
        let mut seen_sectores: HashSet<(String, String, String)> = HashSet::new();

        for cells in rows {
            let row = match FieldRow::from_cells(cells) {
                Some(row) => row,
                None => {
                    hierarchy.stats.skipped += 1;
                    continue;
                }
            };

            if !row.has_required_names() {
                hierarchy.stats.skipped += 1;
                continue;
            }

            if seen_paises.insert(self.country_code.clone()) {
                hierarchy.paises.push(Pais {
                    pais: self.country_name.clone(),
                    paisabrev: self.country_code.clone(),
                });
            }

            if seen_empresas.insert(row.empresa_abrev.clone()) {
                hierarchy.empresas.push(Empresa {
                    pais_abrev: self.country_code.clone(),
                    empresa: row.empresa_nombre.clone(),
                    empresabrev: row.empresa_abrev.clone(),
                });
            }

            let fundo_key = (row.empresa_abrev.clone(), row.fundo_abrev.clone());
            if seen_fundos.insert(fundo_key) {
                hierarchy.fundos.push(Fundo {
                    empresa_abrev: row.empresa_abrev.clone(),
                    fundo: row.fundo_nombre.clone(),
                    fundobrev: row.fundo_abrev.clone(),
                });
            }

            let sector_name = row.sector_display_name();
            let sector_key = (
                row.empresa_abrev.clone(),
                row.fundo_abrev.clone(),
                sector_name.clone(),
            );
            if seen_sectores.insert(sector_key) {
                hierarchy.sectores.push(Sector {
                    empresa_abrev: row.empresa_abrev.clone(),
                    fundo_abrev: row.fundo_abrev.clone(),
                    sector: sector_name.clone(),
                    sectorbrev: truncate_brev(&row.sector_nombre),
                });
            }

            // Loteは重複排除しない（処理された行ごとに1件）
            hierarchy.lotes.push(Lote {
                empresa_abrev: row.empresa_abrev.clone(),
                fundo_abrev: row.fundo_abrev.clone(),
                sector: sector_name,
                lote: row.lote_display_name(),
                lotebrev: truncate_brev(&row.lote_nombre),
            });

            hierarchy.stats.processed += 1;
        }

        hierarchy
    }
}
