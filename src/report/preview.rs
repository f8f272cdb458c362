use crate::data::model::Table;

use super::render_grid;

/// Returned in place of a preview when the table has no rows.
pub const EMPTY_MARKER: &str = "[EMPTY TABLE]";

/// Which rows a preview shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewSelection {
    Empty,
    Full(Table),
    /// First `budget / 2` rows and the last `budget - head` rows.
    Split { head: Table, tail: Table },
}

pub fn select_preview(table: &Table, rows: usize) -> PreviewSelection {
    let height = table.height();
    if height == 0 {
        return PreviewSelection::Empty;
    }
    if height <= rows {
        return PreviewSelection::Full(table.clone());
    }
    let head_len = rows / 2;
    let tail_len = rows - head_len;
    PreviewSelection::Split {
        head: table.slice(0, head_len),
        tail: table.slice(height - tail_len, tail_len),
    }
}

/// Bounded text rendering of a table.
pub fn preview(table: &Table, rows: usize) -> String {
    match select_preview(table, rows) {
        PreviewSelection::Empty => EMPTY_MARKER.to_string(),
        PreviewSelection::Full(all) => render_table(&all),
        PreviewSelection::Split { head, tail } => format!(
            "[HEAD]\n{}\n\n[TAIL]\n{}",
            render_table(&head),
            render_table(&tail)
        ),
    }
}

/// Header line plus one line per row, no index.
pub fn render_table(table: &Table) -> String {
    let header: Vec<String> = table.column_names().iter().map(|s| s.to_string()).collect();
    let rows: Vec<Vec<String>> = (0..table.height())
        .map(|i| table.row(i).iter().map(|c| c.to_string()).collect())
        .collect();
    render_grid(&header, &rows)
}
