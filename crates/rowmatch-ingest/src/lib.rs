#![deny(unsafe_code)]
//! Dataset ingestion.

pub mod csv_table;

pub use csv_table::{read_dataset, read_dataset_from_reader};
