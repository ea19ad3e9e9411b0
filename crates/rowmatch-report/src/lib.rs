#![deny(unsafe_code)]
//! Output writers for result tables.

pub mod common;
pub mod delimited;
pub mod json;

pub use common::{OutputFormat, format_score, format_value, write_table};
pub use delimited::{write_csv, write_csv_file};
pub use json::{write_json, write_json_file};
