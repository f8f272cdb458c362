//! Type coercion for generic text columns.
//!
//! Each text column is judged on its own values by [`infer_target`]:
//!
//! 1. At least 80% of non-null cells read `true`/`false` → 1/0 floats, other
//!    cells missing.
//! 2. Otherwise, if at least half of the cells are scalars (not `[...]`) and
//!    at least 60% of them survive a numeric cast → float column.
//!
//! Anything else, and every column that is not text, is left alone.

use log::debug;

use super::expand::is_bracketed;
use super::model::{Cell, Column, DType, Table};

pub const BOOL_SHARE_THRESHOLD: f64 = 0.8;
pub const SCALAR_SHARE_THRESHOLD: f64 = 0.5;
pub const NUMERIC_SHARE_THRESHOLD: f64 = 0.6;

/// What a text column should become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// `true`/`false` strings mapped to 1/0.
    BoolToNumber,
    /// Numeric cast of every cell.
    Numeric,
}

/// Decide the target type of a text column from its values.
pub fn infer_target(cells: &[Cell]) -> Option<Coercion> {
    if cells.is_empty() {
        return None;
    }

    let mut non_null = 0usize;
    let mut bool_like = 0usize;
    for cell in cells.iter().filter(|c| !c.is_null()) {
        non_null += 1;
        if bool_literal(cell).is_some() {
            bool_like += 1;
        }
    }
    if non_null > 0 && share(bool_like, non_null) >= BOOL_SHARE_THRESHOLD {
        return Some(Coercion::BoolToNumber);
    }

    let scalar = cells
        .iter()
        .filter(|c| c.is_null() || !is_bracketed(&c.raw_text()))
        .count();
    if share(scalar, cells.len()) < SCALAR_SHARE_THRESHOLD {
        return None;
    }

    let numeric = cells.iter().filter(|c| numeric_cast(c).is_some()).count();
    (share(numeric, cells.len()) >= NUMERIC_SHARE_THRESHOLD).then_some(Coercion::Numeric)
}

/// Apply the inferred coercion to one column. Non-text columns and text
/// columns without a target come back unchanged.
pub fn coerce_column(column: &Column) -> Column {
    if column.dtype != DType::Text {
        return column.clone();
    }
    let Some(target) = infer_target(&column.cells) else {
        return column.clone();
    };
    debug!("coercing '{}' with {target:?}", column.name);

    let cells = column
        .cells
        .iter()
        .map(|c| {
            let value = match target {
                Coercion::BoolToNumber => bool_literal(c).map(|b| if b { 1.0 } else { 0.0 }),
                Coercion::Numeric => numeric_cast(c),
            };
            value.map(Cell::Float).unwrap_or(Cell::Null)
        })
        .collect();
    Column::new(column.name.clone(), DType::Float, cells)
}

/// Coerce every column of a table. Applying this twice is the same as once.
pub fn coerce_types(table: &Table) -> Table {
    Table::new(table.columns().iter().map(coerce_column).collect())
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn bool_literal(cell: &Cell) -> Option<bool> {
    match cell {
        Cell::Bool(b) => Some(*b),
        Cell::Text(s) => {
            let t = s.trim();
            if t.eq_ignore_ascii_case("true") {
                Some(true)
            } else if t.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn numeric_cast(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        Cell::Timestamp(_) => None,
        other => other.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::Text(v.to_string())).collect()
    }

    #[test]
    fn bool_strings_take_priority() {
        let mut values = vec!["True"; 10];
        values.extend(vec!["false"; 7]);
        values.extend(vec!["1", "maybe", "2"]);
        // 17 of 20 = 85% boolean-like.
        let col = Column::new("brake", DType::Text, texts(&values));

        assert_eq!(infer_target(&col.cells), Some(Coercion::BoolToNumber));
        let out = coerce_column(&col);
        assert_eq!(out.dtype, DType::Float);
        assert_eq!(out.cells[0], Cell::Float(1.0));
        assert_eq!(out.cells[10], Cell::Float(0.0));
        assert!(out.cells[17..].iter().all(Cell::is_null));
    }

    #[test]
    fn bool_share_ignores_nulls() {
        let cells = vec![
            Cell::Text(" TRUE ".into()),
            Cell::Null,
            Cell::Null,
            Cell::Text("False".into()),
        ];
        assert_eq!(infer_target(&cells), Some(Coercion::BoolToNumber));
    }

    #[test]
    fn numeric_strings_are_cast() {
        let col = Column::new("temp", DType::Text, texts(&["1.5", " 2 ", "x", "4e1"]));
        let out = coerce_column(&col);
        assert_eq!(out.dtype, DType::Float);
        assert_eq!(
            out.cells,
            vec![Cell::Float(1.5), Cell::Float(2.0), Cell::Null, Cell::Float(40.0)]
        );
    }

    #[test]
    fn mostly_non_numeric_is_left_alone() {
        let cells = texts(&["1", "a", "b", "c"]);
        assert_eq!(infer_target(&cells), None);
    }

    #[test]
    fn mostly_bracketed_is_left_alone() {
        let cells = texts(&["[1,2]", "[3,4]", "5"]);
        assert_eq!(infer_target(&cells), None);
    }

    #[test]
    fn non_text_columns_are_untouched() {
        let col = Column::new("flag", DType::Bool, vec![Cell::Bool(true), Cell::Bool(false)]);
        assert_eq!(coerce_column(&col), col);
    }

    #[test]
    fn mixed_cells_from_json_are_cast() {
        let cells = vec![Cell::Integer(3), Cell::Text("4.5".into()), Cell::Bool(true)];
        let col = Column::new("v", DType::Text, cells);
        let out = coerce_column(&col);
        assert_eq!(out.cells, vec![Cell::Float(3.0), Cell::Float(4.5), Cell::Float(1.0)]);
    }

    #[test]
    fn coercion_is_idempotent() {
        let table = Table::new(vec![
            Column::new("a", DType::Text, texts(&["true", "false", "true"])),
            Column::new("b", DType::Text, texts(&["1", "2", "oops"])),
            Column::new("c", DType::Text, texts(&["x", "y", "z"])),
            Column::new("d", DType::Text, texts(&["[1]", "[2]", "[3]"])),
        ]);
        let once = coerce_types(&table);
        let twice = coerce_types(&once);
        assert_eq!(once, twice);
        assert_eq!(once.column("c").unwrap().dtype, DType::Text);
        assert_eq!(once.column("d").unwrap().dtype, DType::Text);
    }
}
