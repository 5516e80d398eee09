//! Utility functions for formatting and display.

pub mod format;

pub use format::{format_timestamp, truncate_string};
