//! State module for per-identifier outcomes
//!
//! # Components
//!
//! - `OutcomeStatus`: The closed set of ways processing one identifier can end
//! - `OutcomeRecord`: The immutable record produced once per processed identifier

mod outcome;

// Re-export main types
pub use outcome::{OutcomeRecord, OutcomeStatus};
