//! # Data Transfer Objects
//!
//! レイヤー間でデータを受け渡すためのDTO

pub mod migration_options;
