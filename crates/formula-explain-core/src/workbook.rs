//! Workbook type - an ordered collection of worksheets

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A workbook (spreadsheet document)
///
/// Sheet order is the order in which the source file lists its sheets.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Get the index of a worksheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(Worksheet::name).collect()
    }

    /// Iterate over worksheets in workbook order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Add a new empty worksheet with the given name, returning its index
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Add an already populated worksheet, returning its index
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        validate_sheet_name(worksheet.name())?;

        if self.sheet_index(worksheet.name()).is_some() {
            return Err(Error::DuplicateSheetName(worksheet.name().to_string()));
        }

        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }
}

/// Validate a sheet name
///
/// Sheet names must be non-empty, at most 31 characters, and must not contain
/// any of `\ / ? * [ ] :`.
fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("name is empty".into()));
    }

    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(Error::InvalidSheetName(format!(
            "'{}' is longer than {} characters",
            name, MAX_SHEET_NAME_LEN
        )));
    }

    if let Some(c) = name
        .chars()
        .find(|c| matches!(c, '\\' | '/' | '?' | '*' | '[' | ']' | ':'))
    {
        return Err(Error::InvalidSheetName(format!(
            "'{}' contains invalid character '{}'",
            name, c
        )));
    }

    Ok(())
}
