use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use serde_json::Value as JsonValue;

use super::model::{Cell, Column, DType, Table, TIMESTAMP_COLUMN};
use super::timestamp::parse_cell;
use crate::error::{Error, Result};

/// Cell texts read as missing values.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "#N/A",
];

/// How many unparseable raw values the timestamp warning quotes.
const MAX_BAD_SAMPLES: usize = 3;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a telemetry log from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` / no extension – delimited text with a header row
/// * `.json` – `[{ "timestamp": "...", "q": "[...]", ... }, ...]`
///
/// The returned table always has a `timestamp` column and is sorted by it
/// whenever at least one timestamp could be parsed.
pub fn load_file(path: &Path, delimiter: u8) -> Result<Table> {
    load_file_with_report(path, delimiter).map(|(table, _)| table)
}

/// [`load_file`], also returning how the time column was repaired.
pub fn load_file_with_report(path: &Path, delimiter: u8) -> Result<(Table, TimestampReport)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (table, report) = match ext.as_str() {
        "csv" | "txt" | "" => read_csv(File::open(path)?, delimiter)?,
        "json" => read_json(File::open(path)?)?,
        other => return Err(Error::UnsupportedFormat(other.to_string())),
    };

    info!(
        "loaded {} rows x {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    Ok((table, report))
}

/// Parse delimited text held in memory.
pub fn load_csv_str(content: &str, delimiter: u8) -> Result<Table> {
    read_csv(content.as_bytes(), delimiter).map(|(table, _)| table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per sample.
/// Ragged records are a structural error; bad cell contents are not.
pub fn read_csv<R: Read>(source: R, delimiter: u8) -> Result<(Table, TimestampReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(source);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    let mut n_rows = 0usize;

    for result in reader.records() {
        let record = result?;
        for (col_idx, value) in record.iter().enumerate() {
            if let Some(slot) = raw.get_mut(col_idx) {
                slot.push(if is_na(value) {
                    None
                } else {
                    Some(value.to_string())
                });
            }
        }
        n_rows += 1;
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, values)| infer_text_column(name, values))
        .collect();

    Ok(attach_timestamp(columns, n_rows))
}

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s.trim())
}

/// Settle a column of raw strings on a type, the way a CSV reader does.
///
/// Homogeneous integer/float columns become numeric. A column made only of
/// `True`/`False` becomes boolean. Everything else (including booleans with
/// gaps) stays generic text with the original strings intact.
fn infer_text_column(name: String, values: Vec<Option<String>>) -> Column {
    let guessed: Vec<Cell> = values
        .iter()
        .map(|v| v.as_deref().map(guess_cell).unwrap_or(Cell::Null))
        .collect();
    let column = Column::infer(name, guessed);

    let keep_as_text = match column.dtype {
        DType::Text => true,
        DType::Bool => column.null_count() > 0,
        _ => false,
    };
    if !keep_as_text {
        return column;
    }

    let cells = values
        .into_iter()
        .map(|v| v.map(Cell::Text).unwrap_or(Cell::Null))
        .collect();
    Column::new(column.name, DType::Text, cells)
}

fn guess_cell(s: &str) -> Cell {
    let t = s.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Cell::Integer(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        return Cell::Float(f);
    }
    match t {
        "True" | "true" | "TRUE" => Cell::Bool(true),
        "False" | "false" | "FALSE" => Cell::Bool(false),
        _ => Cell::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "timestamp": "2025-04-08 12-27-10-512", "q": "[0.1, 0.2, ...]", "servo_on": true },
///   ...
/// ]
/// ```
///
/// Column order follows first appearance; keys missing from a record are
/// missing values. Nested arrays are kept as their JSON text so the vector
/// expander can pick them up like any other bracketed column.
pub fn read_json<R: Read>(source: R) -> Result<(Table, TimestampReport)> {
    let root: JsonValue = serde_json::from_reader(source)?;
    let records = root
        .as_array()
        .ok_or_else(|| Error::json_layout("expected top-level JSON array"))?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| Error::json_layout(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let cells = records
                .iter()
                .map(|rec| rec.get(&name).map(json_to_cell).unwrap_or(Cell::Null))
                .collect();
            Column::infer(name, cells)
        })
        .collect();

    Ok(attach_timestamp(columns, records.len()))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) if is_na(s) => Cell::Null,
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Timestamp column
// ---------------------------------------------------------------------------

/// Outcome of repairing the time column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimestampReport {
    pub parsed: usize,
    pub failed: usize,
    /// Up to three raw values that failed to parse.
    pub samples: Vec<String>,
    /// The column was generated as a 0-based row index.
    pub synthesized: bool,
}

/// Locate or create the `timestamp` column, parse it and sort rows by it.
///
/// Resolution order: an existing `timestamp` column, else the first column
/// renamed, else a synthetic `0..n` index (which is kept as integers).
pub(crate) fn attach_timestamp(mut columns: Vec<Column>, n_rows: usize) -> (Table, TimestampReport) {
    let pos = match columns.iter().position(|c| c.name == TIMESTAMP_COLUMN) {
        Some(pos) => pos,
        None if !columns.is_empty() => {
            debug!(
                "no '{TIMESTAMP_COLUMN}' column, using '{}' as time axis",
                columns[0].name
            );
            columns[0].name = TIMESTAMP_COLUMN.to_string();
            0
        }
        None => {
            debug!("no columns, synthesizing '{TIMESTAMP_COLUMN}' as a row index");
            let cells = (0..n_rows as i64).map(Cell::Integer).collect();
            let report = TimestampReport {
                synthesized: true,
                ..TimestampReport::default()
            };
            return (
                Table::new(vec![Column::new(TIMESTAMP_COLUMN, DType::Integer, cells)]),
                report,
            );
        }
    };

    let source = &columns[pos];
    let parsed: Vec<Option<NaiveDateTime>> = source.cells.iter().map(parse_cell).collect();

    let mut report = TimestampReport::default();
    for (cell, ts) in source.cells.iter().zip(&parsed) {
        if ts.is_some() {
            report.parsed += 1;
        } else {
            report.failed += 1;
            if report.samples.len() < MAX_BAD_SAMPLES {
                report.samples.push(cell.raw_text().into_owned());
            }
        }
    }
    if report.failed > 0 {
        warn!(
            "{} timestamp(s) could not be parsed. Sample: {:?}",
            report.failed, report.samples
        );
    }

    let cells = parsed
        .iter()
        .map(|ts| ts.map(Cell::Timestamp).unwrap_or(Cell::Null))
        .collect();
    columns[pos] = Column::new(TIMESTAMP_COLUMN, DType::Timestamp, cells);
    let table = Table::new(columns);

    if report.parsed == 0 {
        return (table, report);
    }

    // Stable sort, missing timestamps last.
    let mut order: Vec<usize> = (0..parsed.len()).collect();
    order.sort_by(|&a, &b| match (parsed[a], parsed[b]) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    (table.take_rows(&order), report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn csv_infers_column_types() {
        let csv = "timestamp,a,b,c,d\n\
                   2025-04-08 00:00:01,1,1.5,True,x\n\
                   2025-04-08 00:00:02,2,2,False,7\n";
        let table = load_csv_str(csv, b',').unwrap();
        let dtypes: Vec<DType> = table.columns().iter().map(|c| c.dtype).collect();
        assert_eq!(
            dtypes,
            vec![DType::Timestamp, DType::Integer, DType::Float, DType::Bool, DType::Text]
        );
        // Text columns keep the raw strings, even number-looking ones.
        assert_eq!(table.column("d").unwrap().cells[1], text("7"));
    }

    #[test]
    fn booleans_with_gaps_stay_text() {
        let csv = "timestamp,flag\n0,True\n1,\n2,False\n";
        let table = load_csv_str(csv, b',').unwrap();
        let flag = table.column("flag").unwrap();
        assert_eq!(flag.dtype, DType::Text);
        assert_eq!(flag.cells, vec![text("True"), Cell::Null, text("False")]);
    }

    #[test]
    fn na_tokens_are_missing() {
        let csv = "timestamp,v\n0,1.0\n1,n/a\n2,NaN\n";
        let table = load_csv_str(csv, b',').unwrap();
        let v = table.column("v").unwrap();
        assert_eq!(v.dtype, DType::Float);
        assert_eq!(v.null_count(), 2);
    }

    #[test]
    fn first_column_is_renamed_when_timestamp_missing() {
        let csv = "time,v\n2025-04-08 00:00:02,2\n2025-04-08 00:00:01,1\n";
        let table = load_csv_str(csv, b',').unwrap();
        assert_eq!(table.column_names(), vec!["timestamp", "v"]);
        // Sorted ascending by time.
        assert_eq!(table.column("v").unwrap().cells, vec![Cell::Integer(1), Cell::Integer(2)]);
    }

    #[test]
    fn zero_columns_get_synthetic_index() {
        let (table, report) = attach_timestamp(Vec::new(), 3);
        assert!(report.synthesized);
        let ts = table.column(TIMESTAMP_COLUMN).unwrap();
        assert_eq!(ts.dtype, DType::Integer);
        assert_eq!(ts.cells, vec![Cell::Integer(0), Cell::Integer(1), Cell::Integer(2)]);
    }

    #[test]
    fn unparseable_rows_sort_last_and_are_reported() {
        let columns = vec![
            Column::infer(
                "timestamp",
                vec![
                    text("2025-04-08 12-27-10-900"),
                    text("not-a-date"),
                    text("2025-04-08 12-27-10-100"),
                ],
            ),
            Column::infer("v", vec![Cell::Integer(0), Cell::Integer(1), Cell::Integer(2)]),
        ];
        let (table, report) = attach_timestamp(columns, 3);
        assert_eq!(report.parsed, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.samples, vec!["not-a-date".to_string()]);
        assert_eq!(
            table.column("v").unwrap().cells,
            vec![Cell::Integer(2), Cell::Integer(0), Cell::Integer(1)]
        );
        assert_eq!(table.column(TIMESTAMP_COLUMN).unwrap().cells[2], Cell::Null);
    }

    #[test]
    fn nothing_parses_keeps_source_order() {
        let columns = vec![
            Column::infer("timestamp", vec![text("b"), text("a"), text("c")]),
            Column::infer("v", vec![Cell::Integer(0), Cell::Integer(1), Cell::Integer(2)]),
        ];
        let (table, report) = attach_timestamp(columns, 3);
        assert_eq!(report.parsed, 0);
        assert_eq!(
            table.column("v").unwrap().cells,
            vec![Cell::Integer(0), Cell::Integer(1), Cell::Integer(2)]
        );
    }

    #[test]
    fn sample_list_is_capped() {
        let columns = vec![Column::infer(
            "timestamp",
            (0..5).map(|i| text(&format!("bad{i}"))).collect(),
        )];
        let (_, report) = attach_timestamp(columns, 5);
        assert_eq!(report.failed, 5);
        assert_eq!(report.samples.len(), MAX_BAD_SAMPLES);
    }

    #[test]
    fn ragged_rows_are_a_structural_error() {
        let err = load_csv_str("a,b\n1,2\n3\n", b',').unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn json_records_keep_first_seen_column_order() {
        let json = r#"[
            {"timestamp": "2025-04-08 00:00:02", "q": [1, 2], "on": true},
            {"timestamp": "2025-04-08 00:00:01", "extra": 3.5}
        ]"#;
        let (table, _) = read_json(json.as_bytes()).unwrap();
        assert_eq!(table.column_names(), vec!["timestamp", "q", "on", "extra"]);
        let q = table.column("q").unwrap();
        // Sorted: the second record comes first.
        assert_eq!(q.cells, vec![Cell::Null, text("[1,2]")]);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(matches!(read_json("{}".as_bytes()), Err(Error::JsonLayout(_))));
        assert!(matches!(read_json("[1]".as_bytes()), Err(Error::JsonLayout(_))));
    }
}
