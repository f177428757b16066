//! Cell address and column range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// A cell address (e.g., "C2", "$B$2")
///
/// Cell addresses use a combination of column letters (A-XFD) and row numbers (1-1048576).
/// The optional `$` prefix makes a reference absolute (doesn't move when a shared
/// formula is copied to another cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub col_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references
    pub fn new(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Create a new cell address with specified absolute/relative flags
    pub fn with_absolute(row: u32, col: u16, row_absolute: bool, col_absolute: bool) -> Self {
        Self {
            row,
            col,
            row_absolute,
            col_absolute,
        }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use formula_explain_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("C2").unwrap();
    /// assert_eq!(addr.row, 1);
    /// assert_eq!(addr.col, 2);
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!(addr.col, 1);
    /// assert!(addr.row_absolute);
    /// assert!(addr.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let (col, col_absolute, rest) = split_column(s)?;

        let (row_absolute, row_str) = match rest.strip_prefix('$') {
            Some(row_str) => (true, row_str),
            None => (false, rest),
        };

        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Rows are 1-based in A1 notation, 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let row = row - 1;

        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self {
            row,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// Decode the column of a range endpoint.
    ///
    /// Accepts a full cell reference (`A2`, `$A$2`) or a bare column (`A`, `$A`),
    /// as found on either side of `A2:B2` or `A:B`.
    pub fn parse_column(s: &str) -> Result<u16> {
        let s = s.trim();
        let (col, _, rest) = split_column(s)?;
        if rest.is_empty() {
            return Ok(col);
        }
        Self::parse(s).map(|addr| addr.col)
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return Err(Error::ColumnOutOfBounds(col - 1, MAX_COLS - 1));
            }
        }

        Ok((col - 1) as u16)
    }

    /// Move this address by a row/column offset, keeping absolute parts fixed.
    ///
    /// Returns `None` when the result would leave the sheet.
    pub fn offset(&self, rows: i64, cols: i64) -> Option<Self> {
        let row = if self.row_absolute {
            self.row as i64
        } else {
            self.row as i64 + rows
        };
        let col = if self.col_absolute {
            self.col as i64
        } else {
            self.col as i64 + cols
        };

        if row < 0 || row >= MAX_ROWS as i64 || col < 0 || col >= MAX_COLS as i64 {
            return None;
        }

        Some(Self::with_absolute(
            row as u32,
            col as u16,
            self.row_absolute,
            self.col_absolute,
        ))
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = String::new();

        if self.col_absolute {
            result.push('$');
        }
        result.push_str(&Self::column_to_letters(self.col));

        if self.row_absolute {
            result.push('$');
        }
        result.push_str(&(self.row + 1).to_string());

        result
    }
}

/// Split the leading `$?LETTERS` part off a reference.
fn split_column(s: &str) -> Result<(u16, bool, &str)> {
    let (col_absolute, body) = match s.strip_prefix('$') {
        Some(body) => (true, body),
        None => (false, s),
    };

    let letters_end = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());

    if letters_end == 0 {
        return Err(Error::InvalidAddress(format!(
            "no column letters in '{}'",
            s
        )));
    }

    let col = CellAddress::letters_to_column(&body[..letters_end])?;
    Ok((col, col_absolute, &body[letters_end..]))
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An inclusive span of columns (e.g., "A2:B2" covers columns 0..=1)
///
/// Unlike a rectangular cell range this is never normalized: a span whose
/// start lies right of its end is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnRange {
    start: u16,
    end: u16,
}

impl ColumnRange {
    /// Create a column range, or `None` if `start > end`
    pub fn new(start: u16, end: u16) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Parse the columns of a `start:end` range expression
    ///
    /// The expression must split on `:` into exactly two endpoints.
    ///
    /// # Examples
    /// ```
    /// use formula_explain_core::ColumnRange;
    ///
    /// let range = ColumnRange::parse("A2:C2").unwrap();
    /// assert_eq!(range.columns().collect::<Vec<_>>(), vec![0, 1, 2]);
    ///
    /// assert!(ColumnRange::parse("A2").is_err());
    /// assert!(ColumnRange::parse("C2:A2").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let [start, end] = parts.as_slice() else {
            return Err(Error::InvalidRange(format!(
                "expected two endpoints in '{}'",
                s
            )));
        };

        let start = CellAddress::parse_column(start)?;
        let end = CellAddress::parse_column(end)?;

        Self::new(start, end).ok_or_else(|| {
            Error::InvalidRange(format!("start column is after end column in '{}'", s))
        })
    }

    /// First column (inclusive)
    pub fn start(&self) -> u16 {
        self.start
    }

    /// Last column (inclusive)
    pub fn end(&self) -> u16 {
        self.end
    }

    /// Number of columns covered
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// A column range always covers at least one column
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over the column indices in ascending order
    pub fn columns(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            CellAddress::column_to_letters(self.start),
            CellAddress::column_to_letters(self.end)
        )
    }
}

impl FromStr for ColumnRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
