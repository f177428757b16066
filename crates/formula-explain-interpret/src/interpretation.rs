//! Interpretations and the explanations built from them

use std::fmt;
use std::sync::Arc;

use formula_explain_core::{ColumnRange, HeaderRow};

use crate::operation::Operation;

/// Separator between header labels inside an interpretation
pub const LABEL_SEPARATOR: &str = " + ";

/// A formula rewritten with header labels, e.g. `"SUM(Price + Qty)"`
///
/// Cheap to clone: every cell sharing an expression shares one string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interpretation(Arc<str>);

impl Interpretation {
    /// Describe `op` applied to the columns of `range`
    ///
    /// Columns past the end of the header row contribute an empty label.
    pub fn build(op: Operation, range: ColumnRange, headers: &HeaderRow) -> Self {
        let labels: Vec<&str> = range
            .columns()
            .map(|col| headers.label_or_empty(col))
            .collect();
        Self(format!("{}({})", op.name(), labels.join(LABEL_SEPARATOR)).into())
    }

    /// The interpretation text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Interpretation {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for Interpretation {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Interpretation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Interpretation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <String as serde::Deserialize>::deserialize(deserializer).map(Interpretation::from)
    }
}

/// One output row: a column header and the interpretation of its formula
///
/// Displays as `"<header> = <interpretation>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Explanation {
    /// Header label of the formula's column (empty if the column has none)
    pub header: String,
    /// Interpretation of the column's formula
    #[cfg_attr(feature = "serde", serde(rename = "formula"))]
    pub interpretation: Interpretation,
}

impl Explanation {
    /// Create an explanation row
    pub fn new<S: Into<String>>(header: S, interpretation: Interpretation) -> Self {
        Self {
            header: header.into(),
            interpretation,
        }
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.header, self.interpretation)
    }
}

/// The ordered result of one interpretation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Explanations {
    rows: Vec<Explanation>,
}

impl Explanations {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no formula was recognized
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over rows in order
    pub fn iter(&self) -> std::slice::Iter<'_, Explanation> {
        self.rows.iter()
    }

    /// Rows as a slice
    pub fn as_slice(&self) -> &[Explanation] {
        &self.rows
    }

    /// `(header, interpretation)` pairs, in order
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.rows
            .iter()
            .map(|row| (row.header.as_str(), row.interpretation.as_str()))
            .collect()
    }

    /// Rendered `"<header> = <interpretation>"` lines, in order
    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(ToString::to_string).collect()
    }
}

impl From<Vec<Explanation>> for Explanations {
    fn from(rows: Vec<Explanation>) -> Self {
        Self { rows }
    }
}

impl IntoIterator for Explanations {
    type Item = Explanation;
    type IntoIter = std::vec::IntoIter<Explanation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Explanations {
    type Item = &'a Explanation;
    type IntoIter = std::slice::Iter<'a, Explanation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for Explanations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
