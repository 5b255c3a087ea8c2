//! Pipeline module - the end-to-end analysis run.

mod analyzer;

pub use analyzer::*;
