//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **UploadPhotosUseCase**: 写真のアップロード
//! - **CatalogSchemasUseCase**: テーブル構造のカタログ化
//! - **GenerateInsertsUseCase**: INSERTスクリプト生成
//! - **ExploreSheetUseCase**: シート構造の調査

pub mod catalog_schemas;
pub mod explore_sheet;
pub mod generate_inserts;
pub mod upload_photos;
