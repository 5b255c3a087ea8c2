//! Descriptive statistics for one group.

use crate::models::{DescriptiveStats, Result, TcompareError};

/// Smallest group for which a sample variance exists.
pub const MIN_OBSERVATIONS: usize = 2;

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Unbiased sample variance (n-1 denominator)
pub fn variance_sample(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < MIN_OBSERVATIONS {
        return f64::NAN;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / ((n as f64) - 1.0)
}

/// Describe a group, refusing groups too small to have a variance.
///
/// K_i: Returned statistics are always finite for finite input.
pub fn describe(group: &str, xs: &[f64]) -> Result<DescriptiveStats> {
    if xs.len() < MIN_OBSERVATIONS {
        return Err(TcompareError::InsufficientData {
            group: group.to_string(),
            count: xs.len(),
        });
    }

    let n = xs.len();
    let std_dev = variance_sample(xs).sqrt();
    Ok(DescriptiveStats {
        group: group.to_string(),
        mean: mean(xs),
        std_dev,
        n,
        sem: std_dev / (n as f64).sqrt(),
    })
}
