use log::debug;

use super::model::{Cell, Column, DType, Table};

/// Min-max scale every integer/float column not listed in `exclude`.
///
/// A column whose range is undefined (no values) or zero becomes all `0.0`,
/// missing cells included. Otherwise missing cells stay missing. Boolean,
/// text and timestamp columns pass through.
pub fn normalize<S: AsRef<str>>(table: &Table, exclude: &[S]) -> Table {
    let columns = table
        .columns()
        .iter()
        .map(|col| {
            let excluded = exclude.iter().any(|e| e.as_ref() == col.name);
            if excluded || !col.dtype.is_numeric() {
                col.clone()
            } else {
                min_max_scale(col)
            }
        })
        .collect();
    Table::new(columns)
}

/// Scale one numeric column into [0, 1].
pub fn min_max_scale(column: &Column) -> Column {
    let range = column.cells.iter().filter_map(Cell::as_f64).fold(None, |acc, v| {
        Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (f64::min(lo, v), f64::max(hi, v)),
        })
    });

    let cells = match range {
        Some((lo, hi)) if hi > lo => {
            let denom = hi - lo;
            column
                .cells
                .iter()
                .map(|c| match c.as_f64() {
                    Some(v) => Cell::Float((v - lo) / denom),
                    None => Cell::Null,
                })
                .collect()
        }
        _ => {
            debug!("'{}' has no range, set to 0.0", column.name);
            vec![Cell::Float(0.0); column.len()]
        }
    };
    Column::new(column.name.clone(), DType::Float, cells)
}
