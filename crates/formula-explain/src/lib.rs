//! # formula-explain
//!
//! Explain the formulas of a spreadsheet in terms of its column headers.
//!
//! A formula such as `C2=SUM(A2:B2)` under the headers `Price, Qty, Total`
//! is reported as `Total = SUM(Price + Qty)`.
//!
//! ## Features
//!
//! - Read XLSX/XLSM workbooks (shared strings, shared formulas)
//! - Read CSV files, where fields starting with `=` are formulas
//! - Interpret `SUM` and `AVERAGE` over column spans
//! - JSON request/response types (`serde` feature, on by default)
//!
//! ## Example
//!
//! ```rust
//! use formula_explain::prelude::*;
//!
//! let mut sheet = Worksheet::new("Sales");
//! sheet.set_value("A1", "Price").unwrap();
//! sheet.set_value("B1", "Qty").unwrap();
//! sheet.set_value("C1", "Total").unwrap();
//! sheet.set_formula("C2", "=SUM(A2:B2)").unwrap();
//!
//! let explanations = sheet.explain(&InterpretOptions::default());
//! assert_eq!(explanations.lines(), vec!["Total = SUM(Price + Qty)"]);
//!
//! // Or from a file
//! // let workbook = Workbook::open("sales.xlsx").unwrap();
//! ```

pub mod explain;
pub mod prelude;

pub use explain::{SheetExplanation, WorkbookExplainExt, WorksheetExplainExt};

// Re-export core types
pub use formula_explain_core::{
    CellAddress, ColumnRange, Error, HeaderRow, RawFormula, Result, Workbook, Worksheet,
    MAX_COLS, MAX_ROWS, MAX_SHEET_NAME_LEN,
};

// Re-export interpreter types
pub use formula_explain_interpret::{
    interpret, interpret_expression, interpret_strings, interpret_with_cache,
    interpret_with_options, CacheStats, DuplicateHeaders, Explanation, Explanations,
    InterpretOptions, Interpretation, InterpretationCache, Operation,
};
#[cfg(feature = "serde")]
pub use formula_explain_interpret::{FormulaRequest, FormulaResponse};

// Re-export I/O types
pub use formula_explain_csv::{CsvError, CsvReadOptions, CsvReader};
pub use formula_explain_xlsx::{XlsxError, XlsxReader};

use std::path::Path;

/// Extension trait for Workbook to add file input
pub trait WorkbookExt {
    /// Open a workbook from a file, choosing the reader by extension
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => {
                XlsxReader::read_file(path).map_err(|e| Error::other(e.to_string()))
            }
            Some("csv") => {
                let worksheet = CsvReader::read_file(path, &CsvReadOptions::default())
                    .map_err(|e| Error::other(e.to_string()))?;

                let mut workbook = Workbook::empty();
                workbook.add_existing_worksheet(worksheet)?;
                Ok(workbook)
            }
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }
}
