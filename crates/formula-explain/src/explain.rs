//! Worksheet and workbook explanation
//!
//! Glues the readers' output to the interpreter: a worksheet supplies its
//! header row and formula cells, and each sheet gets its own cache.
//!
//! # Example
//!
//! ```rust,ignore
//! use formula_explain::prelude::*;
//!
//! let workbook = Workbook::open("budget.xlsx").unwrap();
//! for sheet in workbook.explain_all(&InterpretOptions::default()) {
//!     println!("[{}]", sheet.name);
//!     print!("{}", sheet.explanations);
//! }
//! ```

use crate::{
    interpret_with_cache, CacheStats, Explanations, InterpretOptions, InterpretationCache,
    Workbook, Worksheet,
};

/// Extension trait for Worksheet to explain its formulas
pub trait WorksheetExplainExt {
    /// Explain every formula of the sheet against its header row
    fn explain(&self, options: &InterpretOptions) -> Explanations;

    /// Like [`explain`](Self::explain), also returning the cache counters
    fn explain_with_stats(&self, options: &InterpretOptions) -> (Explanations, CacheStats);
}

impl WorksheetExplainExt for Worksheet {
    fn explain(&self, options: &InterpretOptions) -> Explanations {
        self.explain_with_stats(options).0
    }

    fn explain_with_stats(&self, options: &InterpretOptions) -> (Explanations, CacheStats) {
        let headers = self.header_row();
        let raw_formulas = self.raw_formulas();

        let mut cache = InterpretationCache::new();
        let explanations = interpret_with_cache(&raw_formulas, &headers, options, &mut cache);
        let stats = cache.stats();

        log::debug!(
            "sheet '{}': {} formula(s), {} explained, {} computed, {} cache hit(s), {} skipped",
            self.name(),
            raw_formulas.len(),
            explanations.len(),
            stats.computed,
            stats.hits,
            stats.skipped
        );

        (explanations, stats)
    }
}

/// Explanations of one sheet of a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetExplanation {
    /// Sheet name
    pub name: String,
    /// Explanations of the sheet's formulas
    pub explanations: Explanations,
}

/// Extension trait for Workbook to explain all of its sheets
pub trait WorkbookExplainExt {
    /// Explain each sheet independently, in workbook order
    fn explain_all(&self, options: &InterpretOptions) -> Vec<SheetExplanation>;
}

impl WorkbookExplainExt for Workbook {
    fn explain_all(&self, options: &InterpretOptions) -> Vec<SheetExplanation> {
        self.worksheets()
            .map(|sheet| SheetExplanation {
                name: sheet.name().to_string(),
                explanations: sheet.explain(options),
            })
            .collect()
    }
}
