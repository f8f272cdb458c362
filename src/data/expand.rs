//! Expansion of string-encoded vector columns.
//!
//! Controllers dump per-joint arrays as text, e.g. `q = "[0.1, 0.2, ...]"`.
//! A qualifying column `q` gains `q_0 .. q_{N-1}` scalar siblings.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{Cell, Column, Table};

static BRACKETED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[.*\]\s*$").expect("static bracket pattern"));

/// Minimum share of non-null cells that must look like `[...]`.
pub const VECTOR_SHARE_THRESHOLD: f64 = 0.6;

/// Whether a text has the `[ ... ]` shape of an encoded list.
pub fn is_bracketed(s: &str) -> bool {
    BRACKETED_PATTERN.is_match(s)
}

/// Expand every qualifying candidate column into `<name>_i` scalar columns.
///
/// * Candidates absent from the table are skipped.
/// * A candidate qualifies when at least 60% of its non-null cells are
///   bracketed lists.
/// * The width is the length of the first parsed list (in row order) that
///   matches `expected_len`, or of the first parsed list when no length is
///   expected. No such row means the column is left alone.
/// * Rows whose list is shorter than the width, or that fail to parse, get
///   missing values in every new column. Longer lists are truncated.
///
/// New columns are appended once, grouped per source column, after all
/// existing columns. With `drop_original` the expanded source columns are
/// removed. The input table is not modified.
pub fn expand_vector_columns<S: AsRef<str>>(
    table: &Table,
    candidates: &[S],
    expected_len: Option<usize>,
    drop_original: bool,
) -> Table {
    let mut new_blocks: Vec<Column> = Vec::new();
    let mut expanded: Vec<&str> = Vec::new();

    for candidate in candidates {
        let name = candidate.as_ref();
        if expanded.contains(&name) {
            continue;
        }
        let Some(column) = table.column(name) else {
            continue;
        };
        match expand_column(column, expected_len) {
            Some(block) => {
                debug!("expanded '{name}' into {} columns", block.len());
                new_blocks.extend(block);
                expanded.push(name);
            }
            None => debug!("'{name}' is not a vector column, left as is"),
        }
    }

    if new_blocks.is_empty() {
        return table.clone();
    }

    let mut columns: Vec<Column> = table
        .columns()
        .iter()
        .filter(|c| !(drop_original && expanded.contains(&c.name.as_str())))
        .cloned()
        .collect();

    for block_col in new_blocks {
        match columns.iter().position(|c| c.name == block_col.name) {
            Some(pos) => columns[pos] = block_col,
            None => columns.push(block_col),
        }
    }
    Table::new(columns)
}

/// Build the scalar block for one column, or `None` when it does not qualify.
fn expand_column(column: &Column, expected_len: Option<usize>) -> Option<Vec<Column>> {
    let texts: Vec<Option<String>> = column
        .cells
        .iter()
        .map(|c| (!c.is_null()).then(|| c.raw_text().into_owned()))
        .collect();

    let non_null = texts.iter().flatten().count();
    if non_null == 0 {
        return None;
    }
    let bracketed = texts.iter().flatten().filter(|t| is_bracketed(t)).count();
    if (bracketed as f64) / (non_null as f64) < VECTOR_SHARE_THRESHOLD {
        return None;
    }

    let parsed: Vec<Option<Vec<Literal>>> = texts
        .iter()
        .map(|t| t.as_deref().and_then(parse_list))
        .collect();

    let width = parsed
        .iter()
        .flatten()
        .find(|items| expected_len.map_or(true, |n| items.len() == n))
        .map(Vec::len)?;

    let block = (0..width)
        .map(|i| {
            let cells = parsed
                .iter()
                .map(|row| match row {
                    Some(items) if items.len() >= width => items[i].to_cell(),
                    _ => Cell::Null,
                })
                .collect();
            Column::infer(format!("{}_{i}", column.name), cells)
        })
        .collect();
    Some(block)
}

// ---------------------------------------------------------------------------
// Literal list parsing
// ---------------------------------------------------------------------------

/// A value inside an encoded list.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
    List(Vec<Literal>),
}

impl Literal {
    /// Numeric cell for an expanded column; non-numeric values are missing.
    fn to_cell(&self) -> Cell {
        match self {
            Literal::Int(i) => Cell::Integer(*i),
            Literal::Float(f) if f.is_nan() => Cell::Null,
            Literal::Float(f) => Cell::Float(*f),
            Literal::Bool(b) => Cell::Integer(i64::from(*b)),
            Literal::Str(s) => {
                let t = s.trim();
                if let Ok(i) = t.parse::<i64>() {
                    Cell::Integer(i)
                } else {
                    t.parse::<f64>().map(Cell::Float).unwrap_or(Cell::Null)
                }
            }
            Literal::None | Literal::List(_) => Cell::Null,
        }
    }
}

/// Deepest list nesting accepted inside a cell.
const MAX_LIST_DEPTH: usize = 32;

/// Parse a whole string as a list literal: numbers, quoted strings,
/// `True`/`False`/`None` (any case) and nested lists, with an optional
/// trailing comma. Returns `None` for anything else, including valid
/// literals that are not lists and lists nested deeper than 32 levels.
pub fn parse_list(s: &str) -> Option<Vec<Literal>> {
    let mut parser = LiteralParser { src: s.as_bytes(), pos: 0 };
    let value = parser.value(0)?;
    parser.skip_ws();
    if parser.pos != parser.src.len() {
        return None;
    }
    match value {
        Literal::List(items) => Some(items),
        _ => None,
    }
}

struct LiteralParser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl LiteralParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn value(&mut self, depth: usize) -> Option<Literal> {
        self.skip_ws();
        match self.peek()? {
            b'[' => self.list(depth + 1),
            b'"' | b'\'' => self.string(),
            b'-' | b'+' | b'.' | b'0'..=b'9' => self.number(),
            b if b.is_ascii_alphabetic() => self.word(),
            _ => None,
        }
    }

    fn list(&mut self, depth: usize) -> Option<Literal> {
        if depth > MAX_LIST_DEPTH {
            return None;
        }
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek()? == b']' {
                self.pos += 1;
                return Some(Literal::List(items));
            }
            items.push(self.value(depth)?);
            self.skip_ws();
            match self.peek()? {
                b',' => self.pos += 1,
                b']' => {
                    self.pos += 1;
                    return Some(Literal::List(items));
                }
                _ => return None,
            }
        }
    }

    fn string(&mut self) -> Option<Literal> {
        let quote = self.src[self.pos];
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            let b = self.peek()?;
            self.pos += 1;
            match b {
                b'\\' => {
                    let escaped = self.peek()?;
                    self.pos += 1;
                    out.push(match escaped {
                        b'n' => b'\n',
                        b't' => b'\t',
                        other => other,
                    });
                }
                b if b == quote => break,
                b => out.push(b),
            }
        }
        String::from_utf8(out).ok().map(Literal::Str)
    }

    fn number(&mut self) -> Option<Literal> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E' | b'_'))
        {
            self.pos += 1;
        }
        let text: String = std::str::from_utf8(&self.src[start..self.pos])
            .ok()?
            .replace('_', "");
        if let Ok(i) = text.parse::<i64>() {
            return Some(Literal::Int(i));
        }
        text.parse::<f64>().ok().map(Literal::Float)
    }

    fn word(&mut self) -> Option<Literal> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        match std::str::from_utf8(&self.src[start..self.pos]).ok()? {
            "True" | "true" => Some(Literal::Bool(true)),
            "False" | "false" => Some(Literal::Bool(false)),
            "None" | "null" => Some(Literal::None),
            _ => None,
        }
    }
}
