//! Recognized operations
//!
//! An expression is recognized when it contains a call `<NAME>(<range>)`
//! whose `<NAME>` is the canonical name of one of the [`Operation`]
//! variants. The call may sit inside a larger formula, as in
//! `ROUND(SUM(A2:B2),2)`; the first such call wins.
//! Adding an operation means adding a variant and its entry in
//! [`Operation::ALL`]; nothing else matches on the set.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `NAME(args)` starting at a word boundary, with no nested parentheses in `args`
static CALL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][A-Z0-9.]*)\(([^()]*)\)").expect("call shape regex"));

/// A spreadsheet function the interpreter knows how to describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `SUM(range)`
    Sum,
    /// `AVERAGE(range)`
    Average,
}

impl Operation {
    /// Every recognized operation
    pub const ALL: [Operation; 2] = [Operation::Sum, Operation::Average];

    /// Canonical name, used verbatim in interpretations
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Sum => "SUM",
            Operation::Average => "AVERAGE",
        }
    }

    /// Look up an operation by its canonical (upper-case) name
    pub fn from_name(name: &str) -> Option<Operation> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Find the first `<OPERATION>(<args>)` call in an expression
    ///
    /// Returns the operation and the raw argument text. Calls of other
    /// functions are passed over, so `MEDIAN(A2:B2)` alone is unrecognized
    /// while `ROUND(SUM(A2:B2),2)` yields the inner `SUM`.
    ///
    /// ```
    /// use formula_explain_interpret::Operation;
    ///
    /// assert_eq!(Operation::recognize("SUM(A2:B2)"), Some((Operation::Sum, "A2:B2")));
    /// assert_eq!(Operation::recognize("SUM(A2:B2)*1.1"), Some((Operation::Sum, "A2:B2")));
    /// assert_eq!(Operation::recognize("MEDIAN(A2:B2)"), None);
    /// ```
    pub fn recognize(expression: &str) -> Option<(Operation, &str)> {
        CALL_SHAPE.captures_iter(expression).find_map(|captures| {
            let op = Self::from_name(captures.get(1)?.as_str())?;
            Some((op, captures.get(2)?.as_str()))
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_table() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("sum"), None);
        assert_eq!(Operation::from_name("MEDIAN"), None);
    }

    #[test]
    fn test_recognize() {
        assert_eq!(
            Operation::recognize("AVERAGE(B2:D2)"),
            Some((Operation::Average, "B2:D2"))
        );
        assert_eq!(
            Operation::recognize("  SUM($A$2:$B$2) "),
            Some((Operation::Sum, "$A$2:$B$2"))
        );
        assert_eq!(Operation::recognize("SUM(A2)"), Some((Operation::Sum, "A2")));
    }

    #[test]
    fn test_recognize_embedded_calls() {
        assert_eq!(
            Operation::recognize("ROUND(SUM(A2:B2),2)"),
            Some((Operation::Sum, "A2:B2"))
        );
        assert_eq!(
            Operation::recognize("SUM(A2:B2)*1.1"),
            Some((Operation::Sum, "A2:B2"))
        );
        assert_eq!(
            Operation::recognize("1+AVERAGE(C2:D2)"),
            Some((Operation::Average, "C2:D2"))
        );
        // First recognized call wins, unknown ones before it are passed over
        assert_eq!(
            Operation::recognize("MAX(A2:A9)+AVERAGE(B2:C2)+SUM(D2:E2)"),
            Some((Operation::Average, "B2:C2"))
        );
    }

    #[test]
    fn test_recognize_rejects_other_functions() {
        assert_eq!(Operation::recognize("MEDIAN(A2:B2)"), None);
        assert_eq!(Operation::recognize("sum(A2:B2)"), None);
        assert_eq!(Operation::recognize("SUMIF(A2:A9,\"x\",B2:B9)"), None);
        assert_eq!(Operation::recognize("XSUM(A2:B2)"), None);
        assert_eq!(Operation::recognize("A2+B2"), None);
        assert_eq!(Operation::recognize(""), None);
    }
}
