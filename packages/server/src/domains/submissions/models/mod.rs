pub mod classification;
pub mod submission;

pub use classification::Classification;
pub use submission::{Submission, SubmissionWithClassifications};
