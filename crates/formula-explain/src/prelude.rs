//! Prelude module - common imports for formula-explain users
//!
//! ```rust
//! use formula_explain::prelude::*;
//! ```

pub use crate::{
    CellAddress,
    ColumnRange,

    CsvReadOptions,
    CsvReader,

    // Interpretation types
    DuplicateHeaders,
    Error,
    Explanation,
    Explanations,
    HeaderRow,
    InterpretOptions,
    Interpretation,
    RawFormula,
    Result,

    // Main types
    Workbook,
    // Extension traits
    WorkbookExplainExt,
    WorkbookExt,
    Worksheet,
    WorksheetExplainExt,

    XlsxReader,
};
