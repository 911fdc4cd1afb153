//! # Explore Sheet Use Case
//!
//! Data-campoシートの構造を調査するユースケース

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::repositories::sheet_repository::SheetRepository;

/// 調査時に読み取る最大範囲
const EXPLORE_RANGE: &str = "A1:Z1000";
/// サンプル表示する行数
const SAMPLE_ROWS: usize = 5;
/// 一意値を列挙する上限
const LIST_UNIQUE_LIMIT: usize = 20;

/// 階層カラムとして扱うヘッダーのキーワード
const HIERARCHY_KEYWORDS: &[&str] = &["empresa", "fundo", "sector", "lote"];

/// 列インデックスをスプレッドシートの列文字に変換する
///
/// 0 → A, 25 → Z, 26 → AA
pub fn column_letter(idx: usize) -> String {
    if idx < 26 {
        ((b'A' + idx as u8) as char).to_string()
    } else {
        format!("A{}", (b'A' + (idx - 26) as u8) as char)
    }
}

/// 1カラム分の一意値レポート
#[derive(Debug, Clone)]
pub struct UniqueColumnReport {
    pub letter: String,
    pub header: String,
    pub unique_count: usize,
    /// 一意値が [`LIST_UNIQUE_LIMIT`] 以下のときのみ、ソート済みで最大10件
    pub sample_values: Vec<String>,
    pub omitted: usize,
}

/// シート調査レポート
#[derive(Debug, Clone, Default)]
pub struct SheetReport {
    pub headers: Vec<String>,
    pub sample_rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub data_rows: usize,
    pub column_count: usize,
    pub unique_columns: Vec<UniqueColumnReport>,
}

/// シート調査ユースケース
pub struct ExploreSheetUseCase<S: SheetRepository> {
    sheet_repository: Arc<S>,
}

impl<S: SheetRepository> ExploreSheetUseCase<S> {
    /// 新しいユースケースを作成
    pub fn new(sheet_repository: Arc<S>) -> Self {
        Self { sheet_repository }
    }

    /// シートを読み取りレポートを構築する
    pub async fn execute(&self, spreadsheet_id: &str, sheet_name: &str) -> Result<SheetReport> {
        let range = format!("{}!{}", sheet_name, EXPLORE_RANGE);

        let values = self
            .sheet_repository
            .read_range(spreadsheet_id, &range)
            .await
            .with_context(|| format!("Failed to read range {}", range))?;

        Ok(build_report(&values))
    }
}

/// 読み取ったセル値からレポートを構築する（純粋関数）
pub fn build_report(values: &[Vec<String>]) -> SheetReport {
    if values.is_empty() {
        return SheetReport::default();
    }

    let headers = values[0].clone();
    let data = &values[1..];

    let sample_rows = data.iter().take(SAMPLE_ROWS).cloned().collect();

    let unique_columns = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| {
            let lower = header.to_lowercase();
            HIERARCHY_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .map(|(idx, header)| unique_column_report(idx, header, data))
        .collect();

    SheetReport {
        column_count: headers.len(),
        headers,
        sample_rows,
        total_rows: values.len(),
        data_rows: data.len(),
        unique_columns,
    }
}

fn unique_column_report(idx: usize, header: &str, data: &[Vec<String>]) -> UniqueColumnReport {
    // BTreeSetで重複排除とソートを同時に行う
    let unique: BTreeSet<String> = data
        .iter()
        .filter_map(|row| row.get(idx))
        .map(|cell| cell.trim().to_string())
        .filter(|cell| !cell.is_empty())
        .collect();

    let unique_count = unique.len();
    let (sample_values, omitted) = if unique_count <= LIST_UNIQUE_LIMIT {
        let values: Vec<String> = unique.into_iter().take(10).collect();
        let omitted = unique_count.saturating_sub(values.len());
        (values, omitted)
    } else {
        (Vec::new(), 0)
    };

    UniqueColumnReport {
        letter: column_letter(idx),
        header: header.to_string(),
        unique_count,
        sample_values,
        omitted,
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

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_column_letter_single() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(8), "I");
        assert_eq!(column_letter(25), "Z");
    }

    #[test]
    fn test_column_letter_beyond_z() {
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_build_report_empty() {
        let report = build_report(&[]);
        assert_eq!(report.total_rows, 0);
        assert!(report.headers.is_empty());
    }

    #[test]
    fn test_build_report_counts() {
        let values = rows(&[
            &["growerID", "Empresa", "Fundo"],
            &["AGM", "Agricola", "Olmos"],
            &["AGM", "Agricola", "Viru"],
        ]);
        let report = build_report(&values);

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.data_rows, 2);
        assert_eq!(report.column_count, 3);
        assert_eq!(report.sample_rows.len(), 2);
    }

    #[test]
    fn test_build_report_samples_capped_at_five() {
        let mut values = rows(&[&["Empresa"]]);
        for i in 0..10 {
            values.push(vec![format!("Empresa {}", i)]);
        }
        let report = build_report(&values);
        assert_eq!(report.sample_rows.len(), 5);
    }

    #[test]
    fn test_unique_columns_only_hierarchy_headers() {
        let values = rows(&[
            &["growerID", "Empresa", "CentroCosto", "Descripcion Lote"],
            &["AGM", "Agricola", "CC1", "Lote 1"],
        ]);
        let report = build_report(&values);

        let headers: Vec<&str> = report
            .unique_columns
            .iter()
            .map(|c| c.header.as_str())
            .collect();
        // "Empresa" と "Descripcion Lote" のみが階層カラム
        assert_eq!(headers, vec!["Empresa", "Descripcion Lote"]);
        assert_eq!(report.unique_columns[0].letter, "B");
        assert_eq!(report.unique_columns[1].letter, "D");
    }

    #[test]
    fn test_unique_counts_trim_and_dedup() {
        let values = rows(&[
            &["Fundo"],
            &["Olmos"],
            &[" Olmos "],
            &["Viru"],
            &[""],
        ]);
        let report = build_report(&values);

        let fundo = &report.unique_columns[0];
        assert_eq!(fundo.unique_count, 2);
        assert_eq!(fundo.sample_values, vec!["Olmos", "Viru"]);
    }

    #[test]
    fn test_unique_values_sorted_and_capped_at_ten() {
        let mut values = rows(&[&["Sector"]]);
        for i in (0..15).rev() {
            values.push(vec![format!("Sector {:02}", i)]);
        }
        let report = build_report(&values);

        let sector = &report.unique_columns[0];
        assert_eq!(sector.unique_count, 15);
        assert_eq!(sector.sample_values.len(), 10);
        assert_eq!(sector.sample_values[0], "Sector 00");
        assert_eq!(sector.omitted, 5);
    }

    #[test]
    fn test_unique_values_not_listed_above_limit() {
        let mut values = rows(&[&["Sector"]]);
        for i in 0..30 {
            values.push(vec![format!("Sector {:02}", i)]);
        }
        let report = build_report(&values);

        let sector = &report.unique_columns[0];
        assert_eq!(sector.unique_count, 30);
        assert!(sector.sample_values.is_empty());
    }

    #[test]
    fn test_short_rows_do_not_panic() {
        let values = rows(&[
            &["growerID", "Empresa"],
            &["AGM"], // Empresaセルが欠けた短い行
        ]);
        let report = build_report(&values);
        assert_eq!(report.unique_columns[0].unique_count, 0);
    }

    #[tokio::test]
    async fn test_execute_builds_report() {
        let repo = Arc::new(MockSheetRepository {
            values: rows(&[&["Empresa"], &["Agricola"]]),
        });
        let use_case = ExploreSheetUseCase::new(repo);

        let report = use_case.execute("sheet-id", "Data-campo").await.unwrap();
        assert_eq!(report.data_rows, 1);
    }
}
