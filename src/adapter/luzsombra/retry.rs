//! LuzSombra Retry Logic and Error Classification
//!
//! リトライロジックとエラー分類

pub const MAX_RETRIES: u32 = 3;
pub const INITIAL_RETRY_DELAY_MS: u64 = 1000;
pub const MAX_RETRY_DELAY_MS: u64 = 16000;

/// Calculate retry delay with exponential backoff
pub fn calculate_retry_delay(retry_count: u32) -> u64 {
    std::cmp::min(
        INITIAL_RETRY_DELAY_MS * (1 << (retry_count - 1)),
        MAX_RETRY_DELAY_MS,
    )
}

/// Convert error chain to string including all causes
pub fn error_chain_to_string(e: &anyhow::Error) -> String {
    let mut messages = Vec::new();
    for cause in e.chain() {
        messages.push(cause.to_string());
    }
    messages.join(" | ")
}

/// Check if an error message indicates a retryable error
///
/// Connection problems and server-side transient failures can be retried;
/// auth failures and 4xx rejections cannot.
pub fn is_retryable_error(error_msg: &str) -> bool {
    error_msg.contains("Connection reset")
        || error_msg.contains("connection reset")
        || error_msg.contains("Connection refused")
        || error_msg.contains("connection refused")
        || error_msg.contains("Broken pipe")
        || error_msg.contains("broken pipe")
        || error_msg.contains("timeout")
        || error_msg.contains("Timeout")
        || error_msg.contains("timed out")
        || error_msg.contains("500")
        || error_msg.contains("502")
        || error_msg.contains("503")
        || error_msg.contains("429")
}
