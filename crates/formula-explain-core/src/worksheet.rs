//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::CellAddress;
use crate::error::{Error, Result};
use crate::formula::{HeaderRow, RawFormula};
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
///
/// Only what formula interpretation needs is kept: the display text of
/// each non-empty cell and the expression of each formula cell. Both are
/// keyed by `(row, col)` so iteration is row-major.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Display text of non-empty cells
    values: BTreeMap<(u32, u16), String>,
    /// Formula expressions (without the leading '=')
    formulas: BTreeMap<(u32, u16), String>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            formulas: BTreeMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the sheet has no values and no formulas
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.formulas.is_empty()
    }

    // === Cell Access ===

    /// Get the display text of a cell by address string (e.g., "A1")
    pub fn value(&self, address: &str) -> Result<Option<&str>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.value_at(addr.row, addr.col))
    }

    /// Get the display text of a cell by row and column indices
    pub fn value_at(&self, row: u32, col: u16) -> Option<&str> {
        self.values.get(&(row, col)).map(String::as_str)
    }

    /// Set the display text of a cell by address string
    pub fn set_value<S: Into<String>>(&mut self, address: &str, value: S) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_value_at(addr.row, addr.col, value)
    }

    /// Set the display text of a cell; an empty string clears it
    pub fn set_value_at<S: Into<String>>(&mut self, row: u32, col: u16, value: S) -> Result<()> {
        check_bounds(row, col)?;
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&(row, col));
        } else {
            self.values.insert((row, col), value);
        }
        Ok(())
    }

    /// Get the formula expression of a cell, without the leading '='
    pub fn formula_at(&self, row: u32, col: u16) -> Option<&str> {
        self.formulas.get(&(row, col)).map(String::as_str)
    }

    /// Set a cell formula by address string (e.g., "C2", "=SUM(A2:B2)")
    pub fn set_formula<S: Into<String>>(&mut self, address: &str, formula: S) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_formula_at(addr.row, addr.col, formula)
    }

    /// Set a cell formula by row and column indices
    ///
    /// A leading '=' is accepted and stripped.
    pub fn set_formula_at<S: Into<String>>(&mut self, row: u32, col: u16, formula: S) -> Result<()> {
        check_bounds(row, col)?;
        let formula = RawFormula::new(CellAddress::new(row, col), formula);
        self.formulas.insert((row, col), formula.expression);
        Ok(())
    }

    /// Number of formula cells
    pub fn formula_count(&self) -> usize {
        self.formulas.len()
    }

    /// All formula cells in row-major order
    pub fn raw_formulas(&self) -> Vec<RawFormula> {
        self.formulas
            .iter()
            .map(|(&(row, col), expression)| RawFormula {
                cell: CellAddress::new(row, col),
                expression: expression.clone(),
            })
            .collect()
    }

    /// Index of the first row holding any value or formula
    pub fn header_row_index(&self) -> Option<u32> {
        let first_value = self.values.keys().next().map(|&(row, _)| row);
        let first_formula = self.formulas.keys().next().map(|&(row, _)| row);
        match (first_value, first_formula) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The header row: display text of the first non-blank row
    ///
    /// Labels are indexed by absolute column starting at `A`; gaps before
    /// the last filled column are empty strings.
    pub fn header_row(&self) -> HeaderRow {
        let Some(row) = self.header_row_index() else {
            return HeaderRow::new();
        };

        let cells: Vec<(u16, &str)> = self
            .values
            .range((row, 0)..=(row, MAX_COLS - 1))
            .map(|(&(_, col), value)| (col, value.as_str()))
            .collect();

        let width = cells.last().map(|&(col, _)| col as usize + 1).unwrap_or(0);
        let mut labels = vec![""; width];
        for (col, value) in cells {
            labels[col as usize] = value;
        }

        labels.into_iter().collect()
    }
}

fn check_bounds(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get_values() {
        let mut sheet = Worksheet::new("Sales");
        sheet.set_value("A1", "Price").unwrap();
        sheet.set_value_at(0, 1, "Qty").unwrap();

        assert_eq!(sheet.name(), "Sales");
        assert_eq!(sheet.value("A1").unwrap(), Some("Price"));
        assert_eq!(sheet.value_at(0, 1), Some("Qty"));
        assert_eq!(sheet.value_at(5, 5), None);

        sheet.set_value_at(0, 1, "").unwrap();
        assert_eq!(sheet.value_at(0, 1), None);
    }

    #[test]
    fn test_bounds() {
        let mut sheet = Worksheet::new("Sheet1");
        assert!(sheet.set_value_at(MAX_ROWS, 0, "x").is_err());
        assert!(sheet.set_formula_at(0, MAX_COLS, "SUM(A1:B1)").is_err());
        assert!(sheet.set_value("not an address", "x").is_err());
    }

    #[test]
    fn test_raw_formulas_are_row_major() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_formula("D3", "=AVERAGE(A3:B3)").unwrap();
        sheet.set_formula("D2", "=AVERAGE(A2:B2)").unwrap();
        sheet.set_formula("C2", "SUM(A2:B2)").unwrap();

        let formulas: Vec<String> = sheet
            .raw_formulas()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            formulas,
            vec!["C2=SUM(A2:B2)", "D2=AVERAGE(A2:B2)", "D3=AVERAGE(A3:B3)"]
        );
        assert_eq!(sheet.formula_count(), 3);
        assert_eq!(sheet.formula_at(1, 2), Some("SUM(A2:B2)"));
    }

    #[test]
    fn test_header_row_skips_blank_rows_and_fills_gaps() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value("A3", "Price").unwrap();
        sheet.set_value("C3", "Total").unwrap();
        sheet.set_value("A4", "10").unwrap();

        assert_eq!(sheet.header_row_index(), Some(2));
        let headers = sheet.header_row();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Price", "", "Total"]);
    }

    #[test]
    fn test_header_row_of_empty_sheet() {
        let sheet = Worksheet::new("Empty");
        assert!(sheet.is_empty());
        assert_eq!(sheet.header_row_index(), None);
        assert!(sheet.header_row().is_empty());
    }
}
