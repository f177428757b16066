//! Per-pass interpretation cache

use std::collections::HashMap;

use crate::interpretation::Interpretation;

/// Counters from one interpretation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Formulas answered from the cache
    pub hits: usize,
    /// Interpretations built (operation matched and range decoded)
    pub computed: usize,
    /// Formulas left unrecognized
    pub skipped: usize,
}

/// Maps raw expression text to its interpretation
///
/// A cache belongs to a single pass over a single sheet: the same text can
/// mean different things under another header row, so a cache must never be
/// reused across sheets.
#[derive(Debug, Default)]
pub struct InterpretationCache {
    entries: HashMap<String, Interpretation>,
    stats: CacheStats,
}

impl InterpretationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an expression, counting a hit when found
    pub fn get(&mut self, expression: &str) -> Option<Interpretation> {
        let found = self.entries.get(expression).cloned();
        if found.is_some() {
            self.stats.hits += 1;
        }
        found
    }

    /// Store a freshly built interpretation
    pub fn insert(&mut self, expression: &str, interpretation: Interpretation) {
        self.stats.computed += 1;
        self.entries.insert(expression.to_string(), interpretation);
    }

    /// Count an expression that could not be interpreted
    pub fn record_skip(&mut self) {
        self.stats.skipped += 1;
    }

    /// Whether an expression has been interpreted
    pub fn contains(&self, expression: &str) -> bool {
        self.entries.contains_key(expression)
    }

    /// Number of cached expressions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counters so far
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
