// HTTP routes
pub mod health;
pub mod pii;
pub mod stats;

pub use health::*;
pub use pii::*;
pub use stats::*;
