//! Tabular dataset and typed column access.
//!
//! K_i: A `Schema` only exists for columns the dataset actually has.
//! B_i: Cell contents are whatever the spreadsheet held → checked per row.

use super::{Result, TcompareError};
use std::fmt;
use tracing::warn;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Bool(bool),
    Empty,
}

impl Cell {
    /// Whether this cell is the group label `name`.
    ///
    /// Numeric labels match when `name` parses to the same number, so a
    /// group stored as `1` in the sheet is selected by `"1"` or `"1.0"`.
    pub fn matches_label(&self, name: &str) -> bool {
        match self {
            Self::Text(s) => s == name,
            Self::Number(n) => name.trim().parse::<f64>().is_ok_and(|v| v == *n),
            Self::Bool(b) => name.eq_ignore_ascii_case(if *b { "true" } else { "false" }),
            Self::Empty => false,
        }
    }

    /// Numeric reading of the cell; `Ok(None)` for empty cells.
    fn as_number(&self) -> std::result::Result<Option<f64>, ()> {
        match self {
            Self::Number(n) => Ok(Some(*n)),
            Self::Text(s) if s.trim().is_empty() => Ok(None),
            Self::Text(s) => match s.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(()),
            },
            Self::Empty => Ok(None),
            Self::Bool(_) => Err(()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Empty => Ok(()),
        }
    }
}

/// An ordered collection of rows sharing one header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Resolved positions of the two columns an analysis reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema<'a> {
    group_column: &'a str,
    group_idx: usize,
    value_column: &'a str,
    value_idx: usize,
}

impl Dataset {
    /// Build a dataset; short rows are padded with `Cell::Empty`.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| TcompareError::MissingColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    /// Validate both columns up front.
    ///
    /// B_i(columns exist) → Result, checked once instead of per row.
    pub fn schema<'a>(&self, group_column: &'a str, value_column: &'a str) -> Result<Schema<'a>> {
        Ok(Schema {
            group_column,
            group_idx: self.column_index(group_column)?,
            value_column,
            value_idx: self.column_index(value_column)?,
        })
    }

    /// Values of every row whose group label equals `name`, in row order.
    ///
    /// Empty value cells are skipped; anything non-numeric is an error.
    pub fn select_group(&self, schema: &Schema<'_>, name: &str) -> Result<Vec<f64>> {
        let mut values = Vec::new();
        let mut skipped = 0usize;

        for (i, row) in self.rows.iter().enumerate() {
            if !row[schema.group_idx].matches_label(name) {
                continue;
            }
            let cell = &row[schema.value_idx];
            match cell.as_number() {
                Ok(Some(v)) => values.push(v),
                Ok(None) => skipped += 1,
                Err(()) => {
                    return Err(TcompareError::NonNumericValue {
                        // 1-based, counting the header row
                        row: i + 2,
                        column: schema.value_column.to_string(),
                        value: cell.to_string(),
                    });
                }
            }
        }

        if skipped > 0 {
            warn!(
                group = name,
                group_column = schema.group_column,
                value_column = schema.value_column,
                skipped,
                "Skipped rows with empty values"
            );
        }

        Ok(values)
    }

    /// Values for both groups, in the order the names are given.
    pub fn select_groups(&self, schema: &Schema<'_>, names: [&str; 2]) -> Result<[Vec<f64>; 2]> {
        Ok([
            self.select_group(schema, names[0])?,
            self.select_group(schema, names[1])?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let rows = [
            ("Control", 10.0),
            ("Control", 12.0),
            ("Treatment", 15.0),
            ("Other", 99.0),
            ("Control", 11.0),
        ];
        Dataset::new(
            vec!["Group".to_string(), "Value".to_string()],
            rows.iter()
                .map(|(g, v)| vec![Cell::Text(g.to_string()), Cell::Number(*v)])
                .collect(),
        )
    }

    #[test]
    fn test_select_group_in_row_order() {
        let data = sample();
        let schema = data.schema("Group", "Value").unwrap();
        let [control, treatment] = data.select_groups(&schema, ["Control", "Treatment"]).unwrap();
        assert_eq!(control, vec![10.0, 12.0, 11.0]);
        assert_eq!(treatment, vec![15.0]);
    }

    #[test]
    fn test_unknown_group_is_empty() {
        let data = sample();
        let schema = data.schema("Group", "Value").unwrap();
        assert!(data.select_group(&schema, "control").unwrap().is_empty());
    }

    #[test]
    fn test_missing_column() {
        let data = sample();
        let err = data.schema("Group", "Score").unwrap_err();
        match err {
            TcompareError::MissingColumn { column, available } => {
                assert_eq!(column, "Score");
                assert_eq!(available, vec!["Group", "Value"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_numeric_labels_and_text_values() {
        let data = Dataset::new(
            vec!["Arm".to_string(), "Dose".to_string()],
            vec![
                vec![Cell::Number(1.0), Cell::Text(" 2.5 ".to_string())],
                vec![Cell::Number(2.0), Cell::Number(3.0)],
                vec![Cell::Number(1.0), Cell::Empty],
                vec![Cell::Number(1.0)],
            ],
        );
        let schema = data.schema("Arm", "Dose").unwrap();
        assert_eq!(data.select_group(&schema, "1").unwrap(), vec![2.5]);
        assert_eq!(data.select_group(&schema, "2.0").unwrap(), vec![3.0]);
    }

    #[test]
    fn test_non_numeric_value() {
        let data = Dataset::new(
            vec!["Group".to_string(), "Value".to_string()],
            vec![
                vec![Cell::Text("A".to_string()), Cell::Number(1.0)],
                vec![Cell::Text("A".to_string()), Cell::Text("n/a".to_string())],
            ],
        );
        let schema = data.schema("Group", "Value").unwrap();
        let err = data.select_group(&schema, "A").unwrap_err();
        assert!(matches!(
            err,
            TcompareError::NonNumericValue { row: 3, ref value, .. } if *value == "n/a"
        ));

        // parses as f64 but is not a measurement
        let data = Dataset::new(
            vec!["Group".to_string(), "Value".to_string()],
            vec![vec![Cell::Text("A".to_string()), Cell::Text("NaN".to_string())]],
        );
        let schema = data.schema("Group", "Value").unwrap();
        assert!(data.select_group(&schema, "A").is_err());
    }

    #[test]
    fn test_bool_labels() {
        assert!(Cell::Bool(true).matches_label("TRUE"));
        assert!(!Cell::Bool(false).matches_label("true"));
        assert!(!Cell::Empty.matches_label(""));
    }
}
