//! Sensitive data detection and tokenization
//!
//! This module finds spans of personal data in free text and replaces them
//! with opaque, unique placeholder tokens.
//!
//! # Detection Methods
//!
//! - **Regex-based**: Deterministic email address detection
//! - **LLM-based**: Health and medical terms named by a chat model, then
//!   located in the text by literal search
//!
//! # Pipeline
//!
//! Detections from both sources are merged by [`aggregate`] (ordered by start
//! offset, emails first on ties) and handed to [`tokenize`], which substitutes
//! emails before health terms and never tokenizes a span twice.
//!
//! # Examples
//!
//! ```rust
//! use server_core::common::pii::{aggregate, find_emails, tokenize};
//!
//! let text = "Contact john@example.com for help.";
//!
//! let detections = aggregate(find_emails(text), Vec::new());
//! let result = tokenize(text, &detections);
//!
//! assert!(result.tokenized_text.contains("{EMAIL_TOKEN_"));
//! assert!(!result.tokenized_text.contains("john@example.com"));
//! ```

pub mod aggregator;
pub mod detector;
pub mod health_detector;
pub mod tokenizer;

// Re-export main types and functions
pub use aggregator::aggregate;
pub use detector::{find_emails, Detection, PiiType, EMAIL_TOOLTIP, HEALTH_TOOLTIP};
pub use health_detector::{detect_health_terms, locate_term, parse_terms, terms_to_detections};
pub use tokenizer::{issue_token, tokenize, NewClassification, Tokenized};
