//! # Agrosync
//!
//! LuzSombra（農業向け光/影画像解析Webアプリ）を支える
//! フィールドデータ自動化ツール群
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: ビジネスの核心的なルールとエンティティ（外部依存なし）
//! - **Application層**: アプリケーション固有のビジネスフロー（ユースケース）
//! - **Adapter層**: 外部システムとの統合（LuzSombra API, Google Sheets, SQL Server等）
//! - **Driver層**: CLI、依存性注入
//!
//! ## サブコマンド
//!
//! - `upload-photos`: Burroデバイスの写真をLuzSombraへアップロード
//! - `catalog-schemas`: 既存SQL Serverテーブルの構造をMarkdown/JSONでカタログ化
//! - `generate-inserts`: Data-campoシートから階層INSERTスクリプトを生成
//! - `explore-sheet`: Data-campoシートの構造を調査

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
// カバレッジ計測時に外部サービス依存コードを除外するために使用
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
