//! Google Sheets Adapter

pub mod client;
