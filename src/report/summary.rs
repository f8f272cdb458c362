//! Schema and descriptive-statistics summary.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use log::debug;
use thiserror::Error;

use crate::data::model::{Cell, Column, DType, Table};

use super::render_grid;

#[derive(Error, Debug, PartialEq)]
pub enum DescribeError {
    #[error("cannot describe a table without columns")]
    NoColumns,
}

/// Statistics for a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnStats {
    Numeric {
        count: usize,
        mean: f64,
        std: f64,
        min: f64,
        q25: f64,
        q50: f64,
        q75: f64,
        max: f64,
    },
    Temporal {
        count: usize,
        min: Option<NaiveDateTime>,
        max: Option<NaiveDateTime>,
    },
    Categorical {
        count: usize,
        unique: usize,
        top: Option<String>,
        freq: usize,
    },
}

impl ColumnStats {
    pub fn of(column: &Column) -> Self {
        match column.dtype {
            DType::Integer | DType::Float => Self::numeric(&column.numeric_values()),
            DType::Timestamp => {
                let stamps: Vec<NaiveDateTime> = column
                    .cells
                    .iter()
                    .filter_map(|c| match c {
                        Cell::Timestamp(t) => Some(*t),
                        _ => None,
                    })
                    .collect();
                ColumnStats::Temporal {
                    count: stamps.len(),
                    min: stamps.iter().min().copied(),
                    max: stamps.iter().max().copied(),
                }
            }
            DType::Bool | DType::Text => Self::categorical(&column.cells),
        }
    }

    /// Count, mean, sample std, min, quartiles and max. Missing-aware:
    /// pass only present values.
    pub fn numeric(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return ColumnStats::Numeric {
                count: 0,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                q50: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = values.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        ColumnStats::Numeric {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: percentile(&sorted, 25.0),
            q50: percentile(&sorted, 50.0),
            q75: percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Count, distinct values, most frequent value and its frequency.
    /// Ties go to the value seen first.
    pub fn categorical(cells: &[Cell]) -> Self {
        let mut counts: BTreeMap<&Cell, (usize, usize)> = BTreeMap::new();
        let mut count = 0usize;
        for (row, cell) in cells.iter().enumerate().filter(|(_, c)| !c.is_null()) {
            count += 1;
            counts.entry(cell).or_insert((0, row)).0 += 1;
        }
        let top = counts
            .iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)));

        ColumnStats::Categorical {
            count,
            unique: counts.len(),
            top: top.map(|(cell, _)| cell.to_string()),
            freq: top.map(|(_, (n, _))| *n).unwrap_or(0),
        }
    }
}

/// Percentile with linear interpolation between closest ranks (NumPy's
/// default). `sorted_values` must be ascending.
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

const STAT_ROWS: &[&str] = &[
    "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

/// Statistics table for every column: one line per statistic, one column per
/// table column, blank where a statistic does not apply.
pub fn describe(table: &Table) -> Result<String, DescribeError> {
    if table.width() == 0 {
        return Err(DescribeError::NoColumns);
    }

    let stats: Vec<ColumnStats> = table.columns().iter().map(ColumnStats::of).collect();

    let mut header = vec![String::new()];
    header.extend(table.column_names().iter().map(|s| s.to_string()));

    let rows = STAT_ROWS
        .iter()
        .map(|&label| {
            let mut row = vec![label.to_string()];
            row.extend(stats.iter().map(|s| stat_cell(s, label)));
            row
        })
        .collect::<Vec<_>>();

    Ok(render_grid(&header, &rows))
}

fn stat_cell(stats: &ColumnStats, label: &str) -> String {
    match (stats, label) {
        (ColumnStats::Numeric { count, .. }, "count")
        | (ColumnStats::Temporal { count, .. }, "count")
        | (ColumnStats::Categorical { count, .. }, "count") => count.to_string(),
        (ColumnStats::Numeric { mean, .. }, "mean") => fmt_stat(*mean),
        (ColumnStats::Numeric { std, .. }, "std") => fmt_stat(*std),
        (ColumnStats::Numeric { min, .. }, "min") => fmt_stat(*min),
        (ColumnStats::Numeric { q25, .. }, "25%") => fmt_stat(*q25),
        (ColumnStats::Numeric { q50, .. }, "50%") => fmt_stat(*q50),
        (ColumnStats::Numeric { q75, .. }, "75%") => fmt_stat(*q75),
        (ColumnStats::Numeric { max, .. }, "max") => fmt_stat(*max),
        (ColumnStats::Temporal { min: Some(t), .. }, "min")
        | (ColumnStats::Temporal { max: Some(t), .. }, "max") => Cell::Timestamp(*t).to_string(),
        (ColumnStats::Categorical { unique, .. }, "unique") => unique.to_string(),
        (ColumnStats::Categorical { top: Some(top), .. }, "top") => top.clone(),
        (ColumnStats::Categorical { freq, count, .. }, "freq") if *count > 0 => freq.to_string(),
        _ => String::new(),
    }
}

fn fmt_stat(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        format!("{v:.6}")
    }
}

/// Column names and dtypes, followed by `describe()` output when it can be
/// computed. A failing statistics pass drops that section only.
pub fn schema_summary(table: &Table) -> String {
    let mut lines: Vec<String> = vec!["Columns & dtypes:".to_string()];
    for column in table.columns() {
        lines.push(format!("- {}: {}", column.name, column.dtype));
    }

    match describe(table) {
        Ok(desc) => {
            lines.push("\nBasic describe():".to_string());
            lines.push(desc);
        }
        Err(e) => debug!("statistics omitted from summary: {e}"),
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn numeric_stats_match_numpy() {
        let ColumnStats::Numeric { count, mean, std, min, q25, q50, q75, max } =
            ColumnStats::numeric(&[4.0, 1.0, 3.0, 2.0])
        else {
            panic!("expected numeric stats");
        };
        assert_eq!(count, 4);
        assert_relative_eq!(mean, 2.5);
        assert_relative_eq!(std, 1.2909944487358056, epsilon = 1e-12);
        assert_relative_eq!(min, 1.0);
        assert_relative_eq!(q25, 1.75);
        assert_relative_eq!(q50, 2.5);
        assert_relative_eq!(q75, 3.25);
        assert_relative_eq!(max, 4.0);
    }

    #[test]
    fn single_value_has_no_std() {
        let ColumnStats::Numeric { std, q50, .. } = ColumnStats::numeric(&[7.0]) else {
            panic!("expected numeric stats");
        };
        assert!(std.is_nan());
        assert_relative_eq!(q50, 7.0);
    }

    #[test]
    fn categorical_top_prefers_first_seen_on_tie() {
        let cells = vec![
            Cell::Text("b".into()),
            Cell::Text("a".into()),
            Cell::Null,
            Cell::Text("a".into()),
            Cell::Text("b".into()),
        ];
        assert_eq!(
            ColumnStats::categorical(&cells),
            ColumnStats::Categorical {
                count: 4,
                unique: 2,
                top: Some("b".into()),
                freq: 2
            }
        );
    }

    #[test]
    fn summary_lists_dtypes_and_stats() {
        let table = Table::new(vec![
            Column::infer("v", vec![Cell::Float(1.0), Cell::Float(3.0)]),
            Column::infer("mode", vec![Cell::Text("idle".into()), Cell::Text("idle".into())]),
        ]);
        let summary = schema_summary(&table);
        assert!(summary.starts_with("Columns & dtypes:\n- v: float64\n- mode: object"));
        assert!(summary.contains("Basic describe():"));
        assert!(summary.contains("2.000000"));
        assert!(summary.contains("idle"));
    }

    #[test]
    fn summary_without_columns_omits_describe() {
        assert_eq!(describe(&Table::default()), Err(DescribeError::NoColumns));
        assert_eq!(schema_summary(&Table::default()), "Columns & dtypes:");
    }
}
