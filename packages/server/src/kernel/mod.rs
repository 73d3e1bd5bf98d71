//! Kernel module - server infrastructure and dependencies.

pub mod pii;
pub mod pii_service;
pub mod submission_store;
pub mod test_dependencies;
pub mod traits;

pub use pii::{create_health_classifier, AzureHealthClassifier, AzureOpenAICredentials};
pub use pii_service::{PiiService, PiiStats, SubmitOutcome};
pub use submission_store::PostgresSubmissionStore;
pub use test_dependencies::{InMemorySubmissionStore, MockHealthClassifier};
pub use traits::*;
