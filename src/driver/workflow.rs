//! Workflow Orchestration
//!
//! ワークフローのオーケストレーション

use anyhow::{Context, Result};
use chrono::Local;
use log::info;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::adapter::config::{load_env_file, DeviceConfig, SheetsConfig, SqlConfig};
use crate::adapter::luzsombra::upload_repository::LuzSombraUploadRepository;
use crate::adapter::mssql;
use crate::adapter::mssql::schema_repository::MssqlSchemaRepository;
use crate::adapter::repositories::file_photo_repository::FilePhotoRepository;
use crate::adapter::sheets::client::SheetsClient;
use crate::application::dto::migration_options::MigrationOptions;
use crate::application::use_cases::catalog_schemas::CatalogSchemasUseCase;
use crate::application::use_cases::explore_sheet::{column_letter, ExploreSheetUseCase, SheetReport};
use crate::application::use_cases::generate_inserts::GenerateInsertsUseCase;
use crate::application::use_cases::upload_photos::UploadPhotosUseCase;
use crate::domain::entities::hierarchy::Hierarchy;
use crate::domain::services::catalog_renderer::{self, CatalogMeta};
use crate::domain::services::insert_script_renderer::{ScriptFile, ScriptMeta};

use super::cli::{Args, Command};

/// 実行中のホスト名（取得できなければ "unknown"）
fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// 自動化ワークフロー
///
/// サブコマンドごとに依存を組み立ててユースケースを実行する
pub struct AutomationWorkflow;

impl AutomationWorkflow {
    /// ワークフローを実行する
    pub async fn execute(args: Args) -> Result<()> {
        // 認証情報は .env.local から（無ければシステム環境変数）
        load_env_file(&args.env_file);

        match args.command {
            Command::UploadPhotos {
                dir,
                mapping,
                dry_run,
            } => Self::upload_photos(&dir, mapping.as_deref(), dry_run).await,
            Command::CatalogSchemas { output_dir } => Self::catalog_schemas(&output_dir).await,
            Command::GenerateInserts {
                output_dir,
                lot_batch_size,
                sheet,
                dry_run,
            } => Self::generate_inserts(&output_dir, lot_batch_size, &sheet, dry_run).await,
            Command::ExploreSheet { sheet } => Self::explore_sheet(&sheet).await,
        }
    }

    /// フォルダ内の写真をLuzSombraへアップロード
    async fn upload_photos(dir: &str, mapping: Option<&str>, dry_run: bool) -> Result<()> {
        let config = DeviceConfig::from_env()?;
        println!("✓ Using device {} against {}", config.device_id, config.base_url);
        info!("Dry run: {}", dry_run);

        let batch_id = uuid::Uuid::new_v4().to_string();
        info!("Upload batch {}", batch_id);

        let source_repo = Arc::new(FilePhotoRepository::new());
        let upload_repo = Arc::new(LuzSombraUploadRepository::new(&config)?);
        let use_case = UploadPhotosUseCase::new(source_repo, upload_repo);

        let dir = shellexpand::tilde(dir).to_string();
        let mapping = mapping.map(|m| shellexpand::tilde(m).to_string());

        let summary = use_case
            .execute(
                Path::new(&dir),
                mapping.as_deref().map(Path::new),
                dry_run,
            )
            .await?;

        println!();
        println!("✓ Upload complete!");
        println!("  Uploaded: {}", summary.uploaded);
        println!("  Failed:   {}", summary.failed);
        println!("  Total:    {}", summary.total);

        if !summary.is_success() {
            anyhow::bail!("{} of {} photos failed", summary.failed, summary.total);
        }
        Ok(())
    }

    /// 既存テーブルのカタログを生成
    async fn catalog_schemas(output_dir: &str) -> Result<()> {
        let config = SqlConfig::from_env()?;

        let client = mssql::client::connect(&config).await?;
        println!("✓ Connected to {}/{}", config.server, config.database);

        let schema_repo = Arc::new(MssqlSchemaRepository::new(client));
        let use_case = CatalogSchemasUseCase::new(schema_repo);

        let entries = use_case.execute().await?;

        let meta = CatalogMeta {
            database: config.database.clone(),
            server: config.server.clone(),
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            generated_on: local_hostname(),
        };

        let out_dir = Path::new(output_dir);
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory {}", output_dir))?;

        let markdown_path = out_dir.join("CATALOGO_SCHEMAS_TABLAS.md");
        fs::write(&markdown_path, catalog_renderer::render_markdown(&entries, &meta))
            .with_context(|| format!("Failed to write {}", markdown_path.display()))?;
        println!("✓ Catalog generated: {}", markdown_path.display());

        let json_path = out_dir.join("CATALOGO_SCHEMAS_TABLAS.json");
        fs::write(&json_path, catalog_renderer::render_json(&entries)?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        println!("✓ JSON mirror generated: {}", json_path.display());

        Ok(())
    }

    /// Data-campoシートからINSERTスクリプトを生成
    async fn generate_inserts(
        output_dir: &str,
        lot_batch_size: usize,
        sheet: &str,
        dry_run: bool,
    ) -> Result<()> {
        let config = SheetsConfig::from_env()?;
        let options = MigrationOptions::new(sheet, lot_batch_size);

        let client = Arc::new(SheetsClient::new(&config.token_path).await?);
        println!("✓ Authenticated with Google Sheets");

        let meta = ScriptMeta {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            generated_on: local_hostname(),
            source_sheet: options.sheet_name.clone(),
        };

        let use_case = GenerateInsertsUseCase::new(client);
        let output = use_case
            .execute(&config.spreadsheet_id, &options, &meta, dry_run)
            .await?;

        Self::print_hierarchy_stats(&output.hierarchy);

        if output.hierarchy.is_empty() {
            println!("⚠ No lots to insert. Nothing to generate.");
            return Ok(());
        }

        let scripts = match output.scripts {
            Some(scripts) => scripts,
            None => {
                println!("✓ Dry-run mode (no files written)");
                return Ok(());
            }
        };

        let out_dir = Path::new(output_dir);
        Self::write_scripts(out_dir, &scripts.files)?;

        println!();
        println!("✓ Generation complete! ({} lot files)", scripts.lot_file_count);
        println!("  Next step: run the master script against SQL Server:");
        println!(
            "  sqlcmd -S <server> -d AgricolaDB -i {}",
            out_dir.join("insert_0_ejecutar_todos.sql").display()
        );

        Ok(())
    }

    /// Data-campoシートの構造を表示
    async fn explore_sheet(sheet: &str) -> Result<()> {
        let config = SheetsConfig::from_env()?;

        let client = Arc::new(SheetsClient::new(&config.token_path).await?);
        println!("✓ Authenticated with Google Sheets");
        println!("✓ Spreadsheet: {}", config.spreadsheet_id);

        let use_case = ExploreSheetUseCase::new(client);
        let report = use_case.execute(&config.spreadsheet_id, sheet).await?;

        Self::print_sheet_report(sheet, &report);
        Ok(())
    }

    fn print_hierarchy_stats(hierarchy: &Hierarchy) {
        let stats = &hierarchy.stats;
        println!();
        println!("✓ Processed hierarchy:");
        println!("  Rows:      {} total, {} processed, {} skipped", stats.total_rows, stats.processed, stats.skipped);
        println!("  Países:    {}", hierarchy.paises.len());
        println!("  Empresas:  {}", hierarchy.empresas.len());
        println!("  Fundos:    {}", hierarchy.fundos.len());
        println!("  Sectores:  {}", hierarchy.sectores.len());
        println!("  Lotes:     {}", hierarchy.lotes.len());
    }

    fn write_scripts(out_dir: &Path, files: &[ScriptFile]) -> Result<()> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

        for file in files {
            let path = out_dir.join(&file.name);
            fs::write(&path, &file.content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Generated: {}", path.display());
        }

        Ok(())
    }

    fn print_sheet_report(sheet: &str, report: &SheetReport) {
        println!();
        println!("=== Sheet: {} ===", sheet);

        println!();
        println!("Headers (row 1):");
        for (idx, header) in report.headers.iter().enumerate() {
            println!("  Column {} ({}): '{}'", column_letter(idx), idx, header);
        }

        println!();
        println!("First {} data rows:", report.sample_rows.len());
        for (row_idx, row) in report.sample_rows.iter().enumerate() {
            println!("  Row {}:", row_idx + 2);
            for (col_idx, cell) in row.iter().enumerate() {
                let header = report
                    .headers
                    .get(col_idx)
                    .map(|h| h.as_str())
                    .unwrap_or("?");
                println!("    {} ({}): '{}'", column_letter(col_idx), header, cell);
            }
        }

        println!();
        println!("Statistics:");
        println!("  Total rows (incl. header): {}", report.total_rows);
        println!("  Data rows:                 {}", report.data_rows);
        println!("  Columns:                   {}", report.column_count);

        if !report.unique_columns.is_empty() {
            println!();
            println!("Unique values in hierarchy columns:");
            for column in &report.unique_columns {
                println!(
                    "  {} - {}: {} unique values",
                    column.letter, column.header, column.unique_count
                );
                for value in &column.sample_values {
                    println!("     - {}", value);
                }
                if column.omitted > 0 {
                    println!("     ... and {} more", column.omitted);
                }
            }
        }
    }
}
