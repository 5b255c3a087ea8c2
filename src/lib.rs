//! tcompare - Two-group comparison of spreadsheet data with an independent t-test.
//!
//! ## Architecture
//!
//! A single linear run, driven by [`Analyzer`]:
//! - **Source**: Read the sheet into a [`Dataset`]
//! - **Stats**: Descriptive statistics and the two-sample t-test
//! - **Report**: Results workbook, comparison chart, console summary
//! - **Artifacts**: Timestamped names and staged writes
//!
//! ## Epistemic Design
//!
//! - K_i (Knowledge): Compile-time enforced invariants (types, enums)
//! - B_i (Beliefs): Spreadsheet contents, checked at load and selection
//! - I^R (Resolvable): User-configurable parameters
//! - I^B (Bounded): Filesystem failures, contained by staging

pub mod artifacts;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod stats;

// Re-exports for convenience
pub use artifacts::{ArtifactNames, Clock, FixedClock, Staging, SystemClock};
pub use models::{
    ALPHA, AnalysisConfig, ConfigError, Dataset, DescriptiveStats, PlotConfig, Result, RunReport,
    Significance, TcompareError, TestKind, TestResult,
};
pub use pipeline::Analyzer;
pub use report::{render_json, render_text};
pub use source::load_dataset;
pub use stats::{compare, t_test};
