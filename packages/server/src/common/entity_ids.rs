//! Typed ID definitions for persisted entities.

pub use super::id::Id;

/// Marker type for Submission rows.
pub struct Submission;

/// Marker type for Classification rows.
pub struct Classification;

pub type SubmissionId = Id<Submission>;
pub type ClassificationId = Id<Classification>;
