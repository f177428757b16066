//! Raw formulas and header rows: the inputs of an interpretation pass

use crate::cell::CellAddress;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A formula-bearing cell, as extracted from a worksheet
///
/// `expression` is everything after the first `=` of the source
/// `"<CellRef>=<ExpressionText>"` string, e.g. `"SUM(A2:B2)"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawFormula {
    /// Target cell carrying the formula
    pub cell: CellAddress,
    /// Expression text, without the leading `=`
    pub expression: String,
}

impl RawFormula {
    /// Create a raw formula for a cell
    ///
    /// A leading `=` on the expression is stripped.
    pub fn new<S: Into<String>>(cell: CellAddress, expression: S) -> Self {
        let expression = expression.into();
        let expression = match expression.strip_prefix('=') {
            Some(stripped) => stripped.to_string(),
            None => expression,
        };
        Self { cell, expression }
    }

    /// Parse the `"<CellRef>=<ExpressionText>"` form, splitting on the first `=`
    ///
    /// # Examples
    /// ```
    /// use formula_explain_core::RawFormula;
    ///
    /// let formula = RawFormula::parse("D2=IF(A2=B2,1,0)").unwrap();
    /// assert_eq!(formula.cell.to_string(), "D2");
    /// assert_eq!(formula.expression, "IF(A2=B2,1,0)");
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (cell, expression) = s
            .split_once('=')
            .ok_or_else(|| Error::InvalidFormula(format!("missing '=' in '{}'", s)))?;

        let cell = CellAddress::parse(cell)?;

        Ok(Self {
            cell,
            expression: expression.to_string(),
        })
    }
}

impl fmt::Display for RawFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.cell, self.expression)
    }
}

impl FromStr for RawFormula {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// The header labels of a sheet, indexed by column
///
/// Column `i`'s label is `labels[i]`; a sheet may have fewer labels than
/// the columns its formulas reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct HeaderRow {
    labels: Vec<String>,
}

impl HeaderRow {
    /// Create an empty header row
    pub fn new() -> Self {
        Self::default()
    }

    /// Label of a column, `None` past the end of the row
    pub fn label(&self, col: u16) -> Option<&str> {
        self.labels.get(col as usize).map(String::as_str)
    }

    /// Label of a column, the empty string past the end of the row
    pub fn label_or_empty(&self, col: u16) -> &str {
        self.label(col).unwrap_or("")
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the row has no labels
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate over labels in column order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: Into<String>> From<Vec<S>> for HeaderRow {
    fn from(labels: Vec<S>) -> Self {
        labels.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for HeaderRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}
