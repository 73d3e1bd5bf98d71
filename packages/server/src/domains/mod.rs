// Business domains
pub mod submissions;
