//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::{Parser, Subcommand};

/// LuzSombra向けフィールドデータ自動化ツール
#[derive(Parser, Debug, Clone)]
#[command(name = "agrosync")]
#[command(about = "Field-data automation toolkit for LuzSombra", long_about = None)]
pub struct Args {
    /// Env file with credentials and connection settings
    #[arg(short, long, default_value = "./.env.local")]
    pub env_file: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Upload a folder of plant photos to the LuzSombra backend
    UploadPhotos {
        /// Directory containing the photos (jpg/jpeg/png)
        #[arg(long)]
        dir: String,

        /// Optional JSON file mapping file names to plant ids
        #[arg(long)]
        mapping: Option<String>,

        /// Dry run mode - don't actually upload
        #[arg(long)]
        dry_run: bool,
    },

    /// Catalog existing SQL Server table structures (read-only)
    CatalogSchemas {
        /// Output directory for the Markdown/JSON catalog
        #[arg(long, default_value = ".")]
        output_dir: String,
    },

    /// Generate hierarchy INSERT scripts from the Data-campo sheet
    GenerateInserts {
        /// Output directory for the generated .sql files
        #[arg(long, default_value = "generated")]
        output_dir: String,

        /// Maximum number of lot inserts per file
        #[arg(long, default_value_t = 500)]
        lot_batch_size: usize,

        /// Sheet (tab) to read
        #[arg(long, default_value = "Data-campo")]
        sheet: String,

        /// Dry run mode - build the hierarchy and print stats only
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the structure of the Data-campo sheet
    ExploreSheet {
        /// Sheet (tab) to read
        #[arg(long, default_value = "Data-campo")]
        sheet: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_env_file() {
        let args = Args::parse_from(["agrosync", "explore-sheet"]);
        assert_eq!(args.env_file, "./.env.local");
        assert!(matches!(args.command, Command::ExploreSheet { .. }));
    }

    #[test]
    fn test_args_upload_photos() {
        let args = Args::parse_from(["agrosync", "upload-photos", "--dir", "./fotos", "--dry-run"]);

        match args.command {
            Command::UploadPhotos { dir, mapping, dry_run } => {
                assert_eq!(dir, "./fotos");
                assert!(mapping.is_none());
                assert!(dry_run);
            }
            _ => panic!("expected upload-photos"),
        }
    }

    #[test]
    fn test_args_upload_photos_with_mapping() {
        let args = Args::parse_from([
            "agrosync",
            "upload-photos",
            "--dir",
            "./fotos",
            "--mapping",
            "mapeo.json",
        ]);

        match args.command {
            Command::UploadPhotos { mapping, .. } => {
                assert_eq!(mapping.as_deref(), Some("mapeo.json"));
            }
            _ => panic!("expected upload-photos"),
        }
    }

    #[test]
    fn test_args_generate_inserts_defaults() {
        let args = Args::parse_from(["agrosync", "generate-inserts"]);

        match args.command {
            Command::GenerateInserts {
                output_dir,
                lot_batch_size,
                sheet,
                dry_run,
            } => {
                assert_eq!(output_dir, "generated");
                assert_eq!(lot_batch_size, 500);
                assert_eq!(sheet, "Data-campo");
                assert!(!dry_run);
            }
            _ => panic!("expected generate-inserts"),
        }
    }

    #[test]
    fn test_args_generate_inserts_custom_batch() {
        let args = Args::parse_from(["agrosync", "generate-inserts", "--lot-batch-size", "100"]);

        match args.command {
            Command::GenerateInserts { lot_batch_size, .. } => {
                assert_eq!(lot_batch_size, 100);
            }
            _ => panic!("expected generate-inserts"),
        }
    }

    #[test]
    fn test_args_catalog_schemas_output_dir() {
        let args = Args::parse_from(["agrosync", "catalog-schemas", "--output-dir", "docs"]);

        match args.command {
            Command::CatalogSchemas { output_dir } => {
                assert_eq!(output_dir, "docs");
            }
            _ => panic!("expected catalog-schemas"),
        }
    }

    #[test]
    fn test_args_custom_env_file() {
        let args = Args::parse_from(["agrosync", "-e", "/otro/.env", "explore-sheet"]);
        assert_eq!(args.env_file, "/otro/.env");
    }
}
