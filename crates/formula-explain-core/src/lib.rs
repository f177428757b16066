//! # formula-explain-core
//!
//! Core data structures for the formula-explain workspace.
//!
//! This crate provides the fundamental types used throughout formula-explain:
//! - [`CellAddress`] and [`ColumnRange`] - Cell addressing and column spans
//! - [`RawFormula`] and [`HeaderRow`] - The inputs of a formula interpretation pass
//! - [`Workbook`], [`Worksheet`] - Sheets as extracted from a spreadsheet file
//!
//! ## Example
//!
//! ```rust
//! use formula_explain_core::{HeaderRow, RawFormula};
//!
//! let formula: RawFormula = "C2=SUM(A2:B2)".parse().unwrap();
//! assert_eq!(formula.cell.col, 2);
//! assert_eq!(formula.expression, "SUM(A2:B2)");
//!
//! let headers = HeaderRow::from(vec!["Price", "Qty", "Total"]);
//! assert_eq!(headers.label(2), Some("Total"));
//! assert_eq!(headers.label(7), None);
//! ```

pub mod cell;
pub mod error;
pub mod formula;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, ColumnRange};
pub use error::{Error, Result};
pub use formula::{HeaderRow, RawFormula};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
