//! Core data models for tcompare.
//!
//! Epistemic mapping:
//! - K_i (Knowledge): Concrete types with compile-time guarantees
//! - B_i (Beliefs): Spreadsheet contents, wrapped in Result
//! - I^R (Resolvable): Config parameters with defaults
//! - I^B (Bounded): Error variants, all fatal to the run

mod config;
mod dataset;
mod error;
mod outcome;

pub use config::*;
pub use dataset::*;
pub use error::*;
pub use outcome::*;
