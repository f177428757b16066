//! The formula interpreter
//!
//! Turns the formula cells of one sheet into `header = interpretation` rows:
//!
//! 1. resolve the header label of the formula's column (empty when the
//!    header row is shorter than the sheet);
//! 2. reuse the cached interpretation if the same expression text was seen
//!    earlier in the pass;
//! 3. otherwise find the first `<OPERATION>(<start>:<end>)` call, decode
//!    the column span and join the labels of every column in it;
//! 4. cache and emit.
//!
//! Unrecognized expressions are skipped, never reported as errors.

use indexmap::IndexMap;

use formula_explain_core::{ColumnRange, HeaderRow, RawFormula};

use crate::cache::InterpretationCache;
use crate::interpretation::{Explanation, Explanations, Interpretation};
use crate::operation::Operation;

/// What to do when two formula columns share a header label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateHeaders {
    /// The later formula replaces the earlier one, keeping the position of
    /// the first occurrence. Two columns labelled alike collapse to one row.
    #[default]
    Overwrite,
    /// Every formula keeps its own row, in input order
    Append,
}

/// Options for an interpretation pass
#[derive(Debug, Clone, Default)]
pub struct InterpretOptions {
    /// Handling of repeated header labels (default: overwrite)
    pub duplicate_headers: DuplicateHeaders,
}

/// Interpret the formulas of one sheet with default options
///
/// # Example
/// ```
/// use formula_explain_core::{HeaderRow, RawFormula};
/// use formula_explain_interpret::interpret;
///
/// let formulas = vec![
///     RawFormula::parse("C2=SUM(A2:B2)").unwrap(),
///     RawFormula::parse("D2=AVERAGE(A2:B2)").unwrap(),
/// ];
/// let headers = HeaderRow::from(vec!["Price", "Qty", "Total", "Avg"]);
///
/// let explanations = interpret(&formulas, &headers);
/// assert_eq!(
///     explanations.lines(),
///     vec!["Total = SUM(Price + Qty)", "Avg = AVERAGE(Price + Qty)"]
/// );
/// ```
pub fn interpret(raw_formulas: &[RawFormula], headers: &HeaderRow) -> Explanations {
    interpret_with_options(raw_formulas, headers, &InterpretOptions::default())
}

/// Interpret the formulas of one sheet with a fresh cache
pub fn interpret_with_options(
    raw_formulas: &[RawFormula],
    headers: &HeaderRow,
    options: &InterpretOptions,
) -> Explanations {
    let mut cache = InterpretationCache::new();
    interpret_with_cache(raw_formulas, headers, options, &mut cache)
}

/// Interpret `"<CellRef>=<Expression>"` strings
///
/// Each string is split on its first `=`; strings that do not carry a valid
/// cell reference are skipped like unrecognized formulas.
pub fn interpret_strings<S: AsRef<str>>(
    formulas: &[S],
    headers: &HeaderRow,
    options: &InterpretOptions,
) -> Explanations {
    let raw_formulas: Vec<RawFormula> = formulas
        .iter()
        .filter_map(|formula| match RawFormula::parse(formula.as_ref()) {
            Ok(raw) => Some(raw),
            Err(e) => {
                log::debug!("skipping formula '{}': {}", formula.as_ref(), e);
                None
            }
        })
        .collect();

    interpret_with_options(&raw_formulas, headers, options)
}

/// Interpret the formulas of one sheet using a caller-provided cache
///
/// The cache must be fresh for each sheet; passing it in only makes its
/// counters observable.
pub fn interpret_with_cache(
    raw_formulas: &[RawFormula],
    headers: &HeaderRow,
    options: &InterpretOptions,
    cache: &mut InterpretationCache,
) -> Explanations {
    let mut rows = Rows::new(options.duplicate_headers);

    for raw in raw_formulas {
        let header = headers.label_or_empty(raw.cell.col);

        let interpretation = match cache.get(&raw.expression) {
            Some(cached) => {
                log::trace!("{}: reusing interpretation of '{}'", raw.cell, raw.expression);
                cached
            }
            None => match interpret_expression(&raw.expression, headers) {
                Some(interpretation) => {
                    cache.insert(&raw.expression, interpretation.clone());
                    interpretation
                }
                None => {
                    log::debug!("{}: unrecognized formula '{}'", raw.cell, raw.expression);
                    cache.record_skip();
                    continue;
                }
            },
        };

        rows.push(header, interpretation);
    }

    rows.finish()
}

/// Interpret a single expression against a header row
///
/// Returns `None` when the expression holds no `<OPERATION>(<start>:<end>)`
/// call with a known operation, or when the first such call lacks a
/// left-to-right column span.
pub fn interpret_expression(expression: &str, headers: &HeaderRow) -> Option<Interpretation> {
    let (op, args) = Operation::recognize(expression)?;
    let range = ColumnRange::parse(args).ok()?;
    Some(Interpretation::build(op, range, headers))
}

/// Output rows under a duplicate-header policy
enum Rows {
    Overwrite(IndexMap<String, Interpretation>),
    Append(Vec<Explanation>),
}

impl Rows {
    fn new(policy: DuplicateHeaders) -> Self {
        match policy {
            DuplicateHeaders::Overwrite => Rows::Overwrite(IndexMap::new()),
            DuplicateHeaders::Append => Rows::Append(Vec::new()),
        }
    }

    fn push(&mut self, header: &str, interpretation: Interpretation) {
        match self {
            Rows::Overwrite(map) => {
                if let Some(previous) = map.insert(header.to_string(), interpretation) {
                    log::debug!("header '{}' repeated, replacing '{}'", header, previous);
                }
            }
            Rows::Append(rows) => rows.push(Explanation::new(header, interpretation)),
        }
    }

    fn finish(self) -> Explanations {
        match self {
            Rows::Overwrite(map) => map
                .into_iter()
                .map(|(header, interpretation)| Explanation::new(header, interpretation))
                .collect::<Vec<_>>()
                .into(),
            Rows::Append(rows) => rows.into(),
        }
    }
}
