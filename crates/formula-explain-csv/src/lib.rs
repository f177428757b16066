//! # formula-explain-csv
//!
//! CSV reader for formula-explain.
//!
//! A CSV file holds a single sheet. Fields starting with `=` are read as
//! formulas, everything else as cell text.

mod error;
mod options;
mod reader;

pub use error::{CsvError, CsvResult};
pub use options::CsvReadOptions;
pub use reader::CsvReader;
