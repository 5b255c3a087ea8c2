//! Result types for tcompare.
//!
//! K_i: These types are computed once per run and serialized to the
//! workbook, the console, or JSON. Nothing outlives the run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Fixed significance threshold for the two-tailed test.
pub const ALPHA: f64 = 0.05;

/// Descriptive statistics for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Group label these statistics describe
    pub group: String,

    /// Arithmetic mean
    pub mean: f64,

    /// Sample standard deviation (n-1 denominator)
    pub std_dev: f64,

    /// Number of observations
    pub n: usize,

    /// Standard error of the mean: std_dev / sqrt(n)
    pub sem: f64,
}

/// Which two-sample test was run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Student's t-test with pooled variance
    Student,
    /// Welch's t-test, unequal variances
    Welch,
}

impl TestKind {
    pub fn from_equal_var(equal_var: bool) -> Self {
        if equal_var { Self::Student } else { Self::Welch }
    }

    /// Label written to the "Test Type" cell.
    pub fn label(self) -> &'static str {
        match self {
            Self::Student => "Independent t-test",
            Self::Welch => "Welch's t-test",
        }
    }
}

/// Verdict of the significance check.
///
/// K_i: Binary decision, `p < ALPHA` and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    Yes,
    No,
}

impl Significance {
    pub fn from_p_value(p_value: f64) -> Self {
        if p_value < ALPHA { Self::Yes } else { Self::No }
    }

    pub fn is_significant(self) -> bool {
        self == Self::Yes
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yes => "Yes",
            Self::No => "No",
        })
    }
}

/// Outcome of the two-sample t-test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub kind: TestKind,

    /// Standardized difference (mean1 - mean2) / SE
    pub t_statistic: f64,

    /// Degrees of freedom of the reference t-distribution
    pub df: f64,

    /// Two-tailed p-value
    pub p_value: f64,

    pub significant: Significance,

    pub group1: String,
    pub group2: String,
    pub group1_mean: f64,
    pub group2_mean: f64,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub test: TestResult,

    /// Descriptive statistics, group1 first
    pub descriptive: [DescriptiveStats; 2],

    /// Written results workbook
    pub workbook_path: PathBuf,

    /// Written comparison chart
    pub plot_path: PathBuf,
}
