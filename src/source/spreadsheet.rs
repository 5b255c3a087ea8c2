//! Spreadsheet loading via calamine.
//!
//! K_i: The first non-empty row of the sheet is the header.
//! B_i: File exists and is a workbook → Result (`DataLoad`)

use crate::models::{Cell, Dataset, Result, TcompareError};
use calamine::{Data, Range, Reader, open_workbook_auto};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Load one sheet of a workbook into a `Dataset`.
///
/// Reads the first sheet unless `sheet` names another one.
pub fn load_dataset(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    if !path.is_file() {
        return Err(TcompareError::data_load(path, "file not found"));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| TcompareError::data_load(path, e))?;

    let range = match sheet {
        Some(name) => workbook.worksheet_range(name).map_err(|e| {
            TcompareError::data_load(
                path,
                format!(
                    "sheet '{name}': {e} (sheets: {})",
                    workbook.sheet_names().join(", ")
                ),
            )
        })?,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TcompareError::data_load(path, "workbook has no sheets"))?
            .map_err(|e| TcompareError::data_load(path, e))?,
    };

    let dataset = dataset_from_range(&range)
        .ok_or_else(|| TcompareError::data_load(path, "sheet is empty"))?;

    info!(
        path = %path.display(),
        rows = dataset.len(),
        columns = dataset.columns().len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Convert a calamine range; `None` when the range holds no header.
fn dataset_from_range(range: &Range<Data>) -> Option<Dataset> {
    let mut rows = range
        .rows()
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)));

    let header = header_names(rows.next()?);
    let body: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(to_cell).collect()).collect();

    debug!(columns = ?header, "Parsed header");
    Some(Dataset::new(header, body))
}

/// Header names; blanks become `Unnamed: i`, repeats get a `.k` suffix.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    row.iter()
        .enumerate()
        .map(|(i, c)| {
            let base = match c {
                Data::Empty => format!("Unnamed: {i}"),
                other => other.to_string().trim().to_string(),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
        Data::Empty => Cell::Empty,
    }
}
