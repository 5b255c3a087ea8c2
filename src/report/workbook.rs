//! Results workbook.
//!
//! Two sheets: "Test Results" (one row for the test) and
//! "Descriptive Stats" (one column per group).

use crate::models::{DescriptiveStats, Result, TcompareError, TestResult};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::debug;

pub const RESULTS_SHEET: &str = "Test Results";
pub const DESCRIPTIVE_SHEET: &str = "Descriptive Stats";

const RESULT_HEADERS: [&str; 8] = [
    "Test Type",
    "t-statistic",
    "p-value",
    "Significant",
    "Group 1",
    "Group 2",
    "Group 1 Mean",
    "Group 2 Mean",
];

/// Write the results workbook to `path`.
pub fn write_workbook(
    path: &Path,
    test: &TestResult,
    descriptive: &[DescriptiveStats; 2],
) -> Result<()> {
    build(test, descriptive)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|e| TcompareError::output_write(path, e))?;

    debug!(path = %path.display(), "Workbook written");
    Ok(())
}

fn build(
    test: &TestResult,
    descriptive: &[DescriptiveStats; 2],
) -> std::result::Result<Workbook, XlsxError> {
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(RESULTS_SHEET)?;
    for (col, title) in RESULT_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    sheet.write_string(1, 0, test.kind.label())?;
    write_f64(sheet, 1, 1, test.t_statistic)?;
    write_f64(sheet, 1, 2, test.p_value)?;
    sheet.write_string(1, 3, test.significant.to_string())?;
    sheet.write_string(1, 4, &test.group1)?;
    sheet.write_string(1, 5, &test.group2)?;
    write_f64(sheet, 1, 6, test.group1_mean)?;
    write_f64(sheet, 1, 7, test.group2_mean)?;
    sheet.autofit();

    let sheet = workbook.add_worksheet();
    sheet.set_name(DESCRIPTIVE_SHEET)?;
    sheet.write_string_with_format(0, 0, "Statistic", &header)?;
    for (i, stats) in descriptive.iter().enumerate() {
        let col = i as u16 + 1;
        sheet.write_string_with_format(0, col, &stats.group, &header)?;
        write_f64(sheet, 1, col, stats.mean)?;
        write_f64(sheet, 2, col, stats.std_dev)?;
        sheet.write_number(3, col, stats.n as f64)?;
        write_f64(sheet, 4, col, stats.sem)?;
    }
    for (row, label) in ["Mean", "Std Dev", "N", "SEM"].iter().enumerate() {
        sheet.write_string(row as u32 + 1, 0, *label)?;
    }
    sheet.autofit();

    Ok(workbook)
}

/// Excel has no infinity or NaN; those are written as text.
fn write_f64(sheet: &mut Worksheet, row: u32, col: u16, value: f64) -> std::result::Result<(), XlsxError> {
    if value.is_finite() {
        sheet.write_number(row, col, value)?;
    } else {
        sheet.write_string(row, col, value.to_string())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Significance, TestKind};
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use tempfile::TempDir;

    fn sample() -> (TestResult, [DescriptiveStats; 2]) {
        let test = TestResult {
            kind: TestKind::Student,
            t_statistic: -4.898979485566356,
            df: 4.0,
            p_value: 0.008049893,
            significant: Significance::Yes,
            group1: "Control".to_string(),
            group2: "Treatment".to_string(),
            group1_mean: 11.0,
            group2_mean: 15.0,
        };
        let stats = |group: &str, mean: f64| DescriptiveStats {
            group: group.to_string(),
            mean,
            std_dev: 1.0,
            n: 3,
            sem: 1.0 / 3f64.sqrt(),
        };
        (test, [stats("Control", 11.0), stats("Treatment", 15.0)])
    }

    #[test]
    fn test_workbook_layout() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.xlsx");
        let (test, descriptive) = sample();

        write_workbook(&path, &test, &descriptive).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec![RESULTS_SHEET.to_string(), DESCRIPTIVE_SHEET.to_string()]
        );

        let results = workbook.worksheet_range(RESULTS_SHEET).unwrap();
        assert_eq!(results.height(), 2);
        assert_eq!(
            results.get((0, 0)),
            Some(&Data::String("Test Type".to_string()))
        );
        assert_eq!(
            results.get((1, 0)),
            Some(&Data::String("Independent t-test".to_string()))
        );
        assert_eq!(results.get((1, 2)), Some(&Data::Float(0.008049893)));
        assert_eq!(results.get((1, 3)), Some(&Data::String("Yes".to_string())));
        assert_eq!(results.get((1, 5)), Some(&Data::String("Treatment".to_string())));
        assert_eq!(results.get((1, 7)), Some(&Data::Float(15.0)));

        let stats = workbook.worksheet_range(DESCRIPTIVE_SHEET).unwrap();
        assert_eq!(stats.get_size(), (5, 3));
        assert_eq!(stats.get((0, 2)), Some(&Data::String("Treatment".to_string())));
        assert_eq!(stats.get((1, 0)), Some(&Data::String("Mean".to_string())));
        assert_eq!(stats.get((1, 1)), Some(&Data::Float(11.0)));
        assert_eq!(stats.get((3, 0)), Some(&Data::String("N".to_string())));
        assert_eq!(stats.get((3, 2)), Some(&Data::Float(3.0)));
    }

    #[test]
    fn test_infinite_t_written_as_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.xlsx");
        let (mut test, descriptive) = sample();
        test.t_statistic = f64::NEG_INFINITY;
        test.p_value = 0.0;

        write_workbook(&path, &test, &descriptive).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let results = workbook.worksheet_range(RESULTS_SHEET).unwrap();
        assert_eq!(results.get((1, 1)), Some(&Data::String("-inf".to_string())));
        assert_eq!(results.get((1, 2)), Some(&Data::Float(0.0)));
    }

    #[test]
    fn test_unwritable_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("results.xlsx");
        let (test, descriptive) = sample();

        let err = write_workbook(&path, &test, &descriptive).unwrap_err();
        assert!(matches!(err, TcompareError::OutputWrite { .. }));
    }
}
