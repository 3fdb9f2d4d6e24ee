//! Terminal output formatting.

mod tables;

pub use tables::{PROFILE_TABLE_WIDTH, format_profile_header, format_profile_row, print_separator};
