// Common types and utilities shared across the application

pub mod entity_ids;
pub mod id;
pub mod pii;

pub use entity_ids::*;
pub use id::Id;
