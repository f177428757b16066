//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use formula_explain_core::{Error, Worksheet, MAX_COLS, MAX_ROWS};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read CSV file into a worksheet
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a worksheet
    ///
    /// Every record is a sheet row, the first one included: whether it holds
    /// the headers is decided later from the worksheet contents.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut worksheet = Worksheet::new(options.sheet_name.as_str());

        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row = u32::try_from(row_idx).unwrap_or(MAX_ROWS);

            for (col_idx, field) in record.iter().enumerate() {
                let col = u16::try_from(col_idx)
                    .map_err(|_| Error::ColumnOutOfBounds(col_idx as u32, MAX_COLS))?;

                match field.strip_prefix('=') {
                    Some(formula) if !formula.trim().is_empty() => {
                        worksheet.set_formula_at(row, col, formula)?;
                    }
                    _ => worksheet.set_value_at(row, col, field)?,
                }
            }
        }

        log::debug!(
            "read CSV sheet '{}' with {} formula(s)",
            worksheet.name(),
            worksheet.formula_count()
        );

        Ok(worksheet)
    }
}
