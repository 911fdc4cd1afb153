//! # Organizational Hierarchy Entities
//!
//! 組織階層（País → Empresa → Fundo → Sector → Lote）のドメインエンティティ

use serde::Serialize;

/// `*brev`（略称）カラムの最大文字数
///
/// 移行先テーブルの NVARCHAR(50) 制約に合わせる
pub const BREV_MAX_CHARS: usize = 50;

/// スプレッドシート1行分のフィールドデータ（列A〜I）
///
/// Data-campoシートの非正規化された1行を表す。
/// A: empresa略称, B: empresa名, C: fundo略称, D: fundo名,
/// E: sector ID, F: centro de costo（未使用）, G: sector名,
/// H: lote ID, I: lote名
#[derive(Debug, Clone)]
pub struct FieldRow {
    pub empresa_abrev: String,
    pub empresa_nombre: String,
    pub fundo_abrev: String,
    pub fundo_nombre: String,
    pub sector_id: String,
    pub centro_costo: String,
    pub sector_nombre: String,
    pub lote_id: String,
    pub lote_nombre: String,
}

impl FieldRow {
    /// 生のセル値から行を構築する
    ///
    /// セルが9個未満の行は `None` を返す。各セルはトリムされる。
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        if cells.len() < 9 {
            return None;
        }

        let cell = |i: usize| cells[i].trim().to_string();

        Some(Self {
            empresa_abrev: cell(0),
            empresa_nombre: cell(1),
            fundo_abrev: cell(2),
            fundo_nombre: cell(3),
            sector_id: cell(4),
            centro_costo: cell(5),
            sector_nombre: cell(6),
            lote_id: cell(7),
            lote_nombre: cell(8),
        })
    }

    /// 階層構築に必須の4つの名称が揃っているかどうか
    pub fn has_required_names(&self) -> bool {
        !self.empresa_nombre.is_empty()
            && !self.fundo_nombre.is_empty()
            && !self.sector_nombre.is_empty()
            && !self.lote_nombre.is_empty()
    }

    /// Sectorの表示名（`[<id>] <名称>`、IDが無ければ名称のみ）
    pub fn sector_display_name(&self) -> String {
        display_name(&self.sector_id, &self.sector_nombre)
    }

    /// Loteの表示名（`[<id>] <名称>`、IDが無ければ名称のみ）
    pub fn lote_display_name(&self) -> String {
        display_name(&self.lote_id, &self.lote_nombre)
    }
}

fn display_name(id: &str, nombre: &str) -> String {
    if id.is_empty() {
        nombre.to_string()
    } else {
        format!("[{}] {}", id, nombre)
    }
}

/// 略称カラム用に文字数を切り詰める（文字境界を尊重）
pub fn truncate_brev(name: &str) -> String {
    name.chars().take(BREV_MAX_CHARS).collect()
}

/// 国
#[derive(Debug, Clone, Serialize)]
pub struct Pais {
    pub pais: String,
    pub paisabrev: String,
}

/// 企業（Empresa）
///
/// `empresabrev` で重複排除される
#[derive(Debug, Clone, Serialize)]
pub struct Empresa {
    pub pais_abrev: String,
    pub empresa: String,
    pub empresabrev: String,
}

/// 農場（Fundo）
#[derive(Debug, Clone, Serialize)]
pub struct Fundo {
    pub empresa_abrev: String,
    pub fundo: String,
    pub fundobrev: String,
}

/// セクター（Sector）
///
/// `sector` は表示名（`[ID] 名称`形式）、`sectorbrev` は元の名称を
/// 50文字に切り詰めたもの
#[derive(Debug, Clone, Serialize)]
pub struct Sector {
    pub empresa_abrev: String,
    pub fundo_abrev: String,
    pub sector: String,
    pub sectorbrev: String,
}

/// 区画（Lote）
///
/// 重複排除されない（処理された行ごとに1件）
#[derive(Debug, Clone, Serialize)]
pub struct Lote {
    pub empresa_abrev: String,
    pub fundo_abrev: String,
    pub sector: String,
    pub lote: String,
    pub lotebrev: String,
}

/// 行処理の統計情報
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessStats {
    pub total_rows: usize,
    pub processed: usize,
    pub skipped: usize,
}

/// 構築済みの組織階層
///
/// 各コレクションはシート上の出現順（挿入順）を保持する
#[derive(Debug, Clone, Default, Serialize)]
pub struct Hierarchy {
    pub paises: Vec<Pais>,
    pub empresas: Vec<Empresa>,
    pub fundos: Vec<Fundo>,
    pub sectores: Vec<Sector>,
    pub lotes: Vec<Lote>,
    pub stats: ProcessStats,
}

impl Hierarchy {
    pub fn is_empty(&self) -> bool {
        self.lotes.is_empty()
    }
}
