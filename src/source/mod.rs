//! Source module - loading tabular data from spreadsheets.

mod spreadsheet;

pub use spreadsheet::*;
