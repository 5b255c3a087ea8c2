//! Independent two-sample t-test.
//!
//! Student (default): pooled variance, df = n1 + n2 - 2.
//! Welch: per-group variances, Welch–Satterthwaite df.
//! The p-value is two-tailed from Student's t-distribution (statrs).

use super::describe;
use crate::models::{DescriptiveStats, Result, Significance, TcompareError, TestKind, TestResult};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Raw test statistic before a p-value is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TStatistic {
    pub t: f64,
    pub df: f64,
    /// Standard error of the mean difference
    pub se: f64,
}

/// Compute t, df and SE from the two groups' descriptive statistics.
///
/// Both groups must hold at least two observations.
pub fn t_statistic(a: &DescriptiveStats, b: &DescriptiveStats, kind: TestKind) -> TStatistic {
    let na = a.n as f64;
    let nb = b.n as f64;
    let va = a.std_dev.powi(2);
    let vb = b.std_dev.powi(2);
    let diff = a.mean - b.mean;

    let (se, df) = match kind {
        TestKind::Student => {
            let df = na + nb - 2.0;
            let pooled = ((na - 1.0) * va + (nb - 1.0) * vb) / df;
            ((pooled * (1.0 / na + 1.0 / nb)).sqrt(), df)
        }
        TestKind::Welch => {
            let qa = va / na;
            let qb = vb / nb;
            let se2 = qa + qb;
            let den = qa.powi(2) / (na - 1.0) + qb.powi(2) / (nb - 1.0);
            let df = if den == 0.0 {
                na + nb - 2.0
            } else {
                se2.powi(2) / den
            };
            (se2.sqrt(), df)
        }
    };

    TStatistic {
        t: diff / se,
        df,
        se,
    }
}

/// Two-tailed p-value for `t` with `df` degrees of freedom.
pub fn p_value_two_tailed(t: f64, df: f64) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| TcompareError::Internal(format!("t-distribution with df={df}: {e}")))?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

/// Describe both groups and test them against each other.
///
/// K_i: The returned statistics are the ones the test was computed from.
pub fn compare(
    (name1, group1): (&str, &[f64]),
    (name2, group2): (&str, &[f64]),
    kind: TestKind,
) -> Result<(TestResult, [DescriptiveStats; 2])> {
    let d1 = describe(name1, group1)?;
    let d2 = describe(name2, group2)?;

    let stat = t_statistic(&d1, &d2, kind);
    let (t, p_value) = if stat.se == 0.0 {
        if d1.mean == d2.mean {
            return Err(TcompareError::DegenerateVariance);
        }
        // Means differ with no spread at all
        ((d1.mean - d2.mean).signum() * f64::INFINITY, 0.0)
    } else {
        (stat.t, p_value_two_tailed(stat.t, stat.df)?)
    };

    let test = TestResult {
        kind,
        t_statistic: t,
        df: stat.df,
        p_value,
        significant: Significance::from_p_value(p_value),
        group1: d1.group.clone(),
        group2: d2.group.clone(),
        group1_mean: d1.mean,
        group2_mean: d2.mean,
    };
    Ok((test, [d1, d2]))
}

/// Run the t-test on two named groups.
///
/// K_i: t changes sign when the groups are swapped; p does not.
pub fn t_test(
    group1: (&str, &[f64]),
    group2: (&str, &[f64]),
    kind: TestKind,
) -> Result<TestResult> {
    compare(group1, group2, kind).map(|(test, _)| test)
}
