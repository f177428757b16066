//! # formula-explain-interpret
//!
//! Header-aware formula interpreter for formula-explain.
//!
//! Given the formula cells of a sheet and its header row, the interpreter
//! rewrites each recognized formula in terms of column headers:
//! `C2=SUM(A2:B2)` under headers `Price, Qty, Total` becomes
//! `Total = SUM(Price + Qty)`.
//!
//! This crate provides:
//! - [`Operation`] - the recognized set of functions (`SUM`, `AVERAGE`)
//! - [`interpret`] and friends - one pass over a sheet's formulas
//! - [`InterpretationCache`] - per-pass memoization of expression text
//! - [`Explanations`] - the ordered `header = interpretation` rows
//!
//! Nothing is evaluated numerically, and nothing here returns an error:
//! formulas that are not recognized are left out of the result.

pub mod cache;
pub mod interpretation;
pub mod interpreter;
pub mod operation;
#[cfg(feature = "serde")]
pub mod request;

pub use cache::{CacheStats, InterpretationCache};
pub use interpretation::{Explanation, Explanations, Interpretation};
pub use interpreter::{
    interpret, interpret_expression, interpret_strings, interpret_with_cache,
    interpret_with_options, DuplicateHeaders, InterpretOptions,
};
pub use operation::Operation;
#[cfg(feature = "serde")]
pub use request::{FormulaRequest, FormulaResponse};
