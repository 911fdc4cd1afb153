//! Authentication Adapters
//!
//! 外部API認証

pub mod google_auth;
