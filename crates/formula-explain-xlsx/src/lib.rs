//! # formula-explain-xlsx
//!
//! XLSX (Office Open XML) reader for formula-explain.
//!
//! Reads sheet order, cell display text and formula cells: everything the
//! interpreter needs, and nothing about styles or layout.

pub mod error;
pub mod reader;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
