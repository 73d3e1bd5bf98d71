// PII Tokenization Service - API Core
//
// Detects email addresses and health terms in free text, swaps them for
// opaque tokens and keeps an audit trail of every substitution.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
