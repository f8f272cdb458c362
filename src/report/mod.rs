//! Text artifacts handed to the analysis layer: a bounded preview of the
//! table and a schema + statistics summary.

pub mod preview;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::data::model::Table;
use crate::error::Result;

pub use preview::{preview, select_preview, PreviewSelection, EMPTY_MARKER};
pub use summary::{describe, schema_summary, ColumnStats};

/// Everything the analysis collaborator embeds in its request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub preview: String,
    pub schema: String,
}

impl AnalysisInput {
    pub fn from_table(table: &Table, preview_rows: usize) -> Self {
        Self {
            preview: preview(table, preview_rows),
            schema: schema_summary(table),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render a right-aligned text grid. Every row must have `header.len()` cells.
pub(crate) fn render_grid(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:>w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    std::iter::once(line(header))
        .chain(rows.iter().map(|r| line(r.as_slice())))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Cell, Column};

    #[test]
    fn grid_aligns_columns() {
        let header = vec!["a".to_string(), "long".to_string()];
        let rows = vec![vec!["123".to_string(), "x".to_string()]];
        assert_eq!(render_grid(&header, &rows), "  a  long\n123     x");
    }

    #[test]
    fn analysis_input_serializes() {
        let table = Table::new(vec![Column::infer("v", vec![Cell::Integer(1)])]);
        let input = AnalysisInput::from_table(&table, 8);
        let json = input.to_json().unwrap();
        let back: AnalysisInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, input);
        assert!(input.schema.contains("- v: int64"));
    }
}
