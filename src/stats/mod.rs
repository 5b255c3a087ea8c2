//! Statistics module - descriptive statistics and two-sample t-tests.
//!
//! Provides:
//! - `describe`: Mean, sample standard deviation, count and SEM per group
//! - `t_test`: Student (pooled) or Welch two-sample t-test, two-tailed

mod descriptive;
mod ttest;

pub use descriptive::*;
pub use ttest::*;
