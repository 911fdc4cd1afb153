//! Agrosync - LuzSombra Field-Data Automation
//!
//! LuzSombraを支えるフィールドデータ自動化CLI

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// バイナリ側ではライブラリ/テスト経由でのみ使われる公開APIがあるため
#![allow(dead_code)]

use anyhow::Result;
use clap::Parser;

// Clean Architecture layers
mod adapter;
mod application;
mod domain;
mod driver;

use driver::{Args, AutomationWorkflow};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    AutomationWorkflow::execute(args).await
}
