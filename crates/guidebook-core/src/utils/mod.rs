//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{clamp_text, fold_case, digits_only, truncate_string};
