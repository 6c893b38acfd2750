//! Utility functions for string formatting and matching.

pub mod format;

pub use format::{contains_ignore_case, format_date, split_list, truncate_string};
