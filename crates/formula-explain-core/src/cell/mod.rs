//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "C2")
//! - [`ColumnRange`] - An inclusive span of columns (e.g., "A2:B2")

mod address;

pub use address::{CellAddress, ColumnRange};
