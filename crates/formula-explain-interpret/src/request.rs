//! JSON request and response shapes
//!
//! A request carries the sheet's formulas as `"<CellRef>=<Expression>"`
//! strings plus its header row; the response lists `{header, formula}`
//! rows in result order.
//!
//! ```
//! use formula_explain_interpret::{FormulaRequest, InterpretOptions};
//!
//! let request: FormulaRequest = serde_json::from_str(
//!     r#"{"formulas": ["C2=SUM(A2:B2)"], "headers": ["Price", "Qty", "Total"]}"#,
//! ).unwrap();
//!
//! let response = request.interpret(&InterpretOptions::default());
//! assert_eq!(
//!     serde_json::to_string(&response).unwrap(),
//!     r#"{"formulas":[{"header":"Total","formula":"SUM(Price + Qty)"}]}"#
//! );
//! ```

use serde::{Deserialize, Serialize};

use formula_explain_core::HeaderRow;

use crate::interpretation::Explanations;
use crate::interpreter::{interpret_strings, InterpretOptions};

/// Formulas and headers of one sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaRequest {
    /// `"<CellRef>=<Expression>"` strings
    #[serde(default)]
    pub formulas: Vec<String>,
    /// Header labels in column order
    #[serde(default)]
    pub headers: Vec<String>,
}

/// Interpretations for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaResponse {
    /// `{header, formula}` rows in result order
    pub formulas: Explanations,
}

impl FormulaRequest {
    /// Interpret the request with a fresh cache
    pub fn interpret(&self, options: &InterpretOptions) -> FormulaResponse {
        let headers: HeaderRow = self.headers.iter().map(String::as_str).collect();
        FormulaResponse {
            formulas: interpret_strings(&self.formulas, &headers, options),
        }
    }
}
