pub mod models;

pub use models::{Classification, Submission, SubmissionWithClassifications};
