//! Console summary of a run.

use crate::models::{DescriptiveStats, RunReport, TcompareError, TestResult};
use std::fmt::Write;

/// Human-readable summary: test outcome followed by the descriptive table.
pub fn render_text(test: &TestResult, descriptive: &[DescriptiveStats; 2]) -> String {
    let mut out = String::new();
    // writes into a String cannot fail
    let _ = writeln!(out, "T-Test Results:");
    let _ = writeln!(out, "--------------");
    let _ = writeln!(out, "t-statistic: {:.4}", test.t_statistic);
    let _ = writeln!(out, "p-value: {:.4}", test.p_value);
    let _ = writeln!(out, "Significant difference: {}", test.significant);
    let _ = writeln!(out);
    let _ = writeln!(out, "Descriptive Statistics:");
    out.push_str(&descriptive_table(descriptive));
    out
}

/// The run report as pretty-printed JSON.
pub fn render_json(report: &RunReport) -> crate::models::Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| TcompareError::Internal(format!("Failed to serialize report: {e}")))
}

fn descriptive_table(descriptive: &[DescriptiveStats; 2]) -> String {
    let rows: Vec<[String; 3]> = vec![
        [
            "Statistic".to_string(),
            descriptive[0].group.clone(),
            descriptive[1].group.clone(),
        ],
        row("Mean", descriptive, |s| format!("{:.6}", s.mean)),
        row("Std Dev", descriptive, |s| format!("{:.6}", s.std_dev)),
        row("N", descriptive, |s| s.n.to_string()),
        row("SEM", descriptive, |s| format!("{:.6}", s.sem)),
    ];

    let widths: [usize; 3] =
        std::array::from_fn(|col| rows.iter().map(|r| r[col].chars().count()).max().unwrap_or(0));

    let mut table = String::new();
    for r in &rows {
        let _ = writeln!(
            table,
            "{:<w0$}  {:>w1$}  {:>w2$}",
            r[0],
            r[1],
            r[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        );
    }
    table
}

fn row(
    label: &str,
    descriptive: &[DescriptiveStats; 2],
    cell: impl Fn(&DescriptiveStats) -> String,
) -> [String; 3] {
    [label.to_string(), cell(&descriptive[0]), cell(&descriptive[1])]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Significance, TestKind};
    use std::path::PathBuf;

    fn stats(group: &str, mean: f64) -> DescriptiveStats {
        DescriptiveStats {
            group: group.to_string(),
            mean,
            std_dev: 1.0,
            n: 3,
            sem: 0.5773502691896258,
        }
    }

    fn test_result() -> TestResult {
        TestResult {
            kind: TestKind::Student,
            t_statistic: -4.898979485566356,
            df: 4.0,
            p_value: 0.008049893,
            significant: Significance::Yes,
            group1: "Control".to_string(),
            group2: "Treatment".to_string(),
            group1_mean: 11.0,
            group2_mean: 15.0,
        }
    }

    #[test]
    fn test_text_summary() {
        let text = render_text(&test_result(), &[stats("Control", 11.0), stats("Treatment", 15.0)]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "T-Test Results:");
        assert_eq!(lines[1], "--------------");
        assert_eq!(lines[2], "t-statistic: -4.8990");
        assert_eq!(lines[3], "p-value: 0.0080");
        assert_eq!(lines[4], "Significant difference: Yes");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Descriptive Statistics:");
        assert_eq!(lines[7], "Statistic    Control  Treatment");
        assert_eq!(lines[8], "Mean       11.000000  15.000000");
        assert_eq!(lines[10], "N                  3          3");
        assert_eq!(lines.len(), 12);
    }

    #[test]
    fn test_json_summary() {
        let report = RunReport {
            test: test_result(),
            descriptive: [stats("Control", 11.0), stats("Treatment", 15.0)],
            workbook_path: PathBuf::from("ttest_results_20240102_030405.xlsx"),
            plot_path: PathBuf::from("ttest_plot_20240102_030405.png"),
        };

        let json = render_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["test"]["kind"], "student");
        assert_eq!(value["test"]["significant"], "Yes");
        assert_eq!(value["descriptive"][1]["group"], "Treatment");
        assert_eq!(value["plot_path"], "ttest_plot_20240102_030405.png");
    }
}
