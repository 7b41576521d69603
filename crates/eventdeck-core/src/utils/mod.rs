//! Utility functions for string formatting.

pub mod format;

pub use format::{pad, truncate_string};
