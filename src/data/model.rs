use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDateTime;

/// Name of the designated time column every loaded table carries.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

// ---------------------------------------------------------------------------
// Cell – a single value in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
///
/// `Text` is the generic variant: columns read from a log start out as text
/// wherever the reader could not settle on a narrower type, and the coercion
/// stages decide what they become.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

// -- Manual Eq/Ord so cells can be counted in a BTreeMap --

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Cell::*;
        fn discriminant(v: &Cell) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Timestamp(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) if v.is_nan() => write!(f, "NaN"),
            Cell::Float(v) => write!(f, "{v:.6}"),
            Cell::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Cell::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.6f")),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

impl Cell {
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Booleans count as 1/0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) if !v.is_nan() => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// The cell as the text a reader would have seen in the source file.
    pub fn raw_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Integer(i) => Cow::Owned(i.to_string()),
            Cell::Float(v) => Cow::Owned(v.to_string()),
            Cell::Bool(b) => Cow::Borrowed(if *b { "True" } else { "False" }),
            Cell::Timestamp(t) => Cow::Owned(t.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Cell::Null => Cow::Borrowed(""),
        }
    }
}

// ---------------------------------------------------------------------------
// DType – declared column type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Integer,
    Float,
    Bool,
    Timestamp,
    /// Generic column; cells may be of any variant.
    Text,
}

impl DType {
    /// Integer or float. Booleans are deliberately not numeric here.
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Integer | DType::Float)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Integer => "int64",
            DType::Float => "float64",
            DType::Bool => "bool",
            DType::Timestamp => "datetime64[us]",
            DType::Text => "object",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DType, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            dtype,
            cells,
        }
    }

    /// Build a column and derive its dtype from the cells.
    ///
    /// Homogeneous integer, float, boolean and timestamp columns get their
    /// own dtype (ints mixed with floats widen to float, nulls are allowed
    /// anywhere). A column with no values at all is an all-missing float
    /// column. Anything mixed stays `Text`.
    pub fn infer(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let mut ints = 0usize;
        let mut floats = 0usize;
        let mut bools = 0usize;
        let mut stamps = 0usize;
        let mut others = 0usize;
        for cell in &cells {
            match cell {
                Cell::Null => {}
                Cell::Float(v) if v.is_nan() => {}
                Cell::Integer(_) => ints += 1,
                Cell::Float(_) => floats += 1,
                Cell::Bool(_) => bools += 1,
                Cell::Timestamp(_) => stamps += 1,
                Cell::Text(_) => others += 1,
            }
        }
        let non_null = ints + floats + bools + stamps + others;

        let dtype = if non_null == 0 {
            DType::Float
        } else if ints == non_null {
            DType::Integer
        } else if ints + floats == non_null {
            DType::Float
        } else if bools == non_null {
            DType::Bool
        } else if stamps == non_null {
            DType::Timestamp
        } else {
            DType::Text
        };

        let cells = if dtype == DType::Float {
            cells
                .into_iter()
                .map(|c| match c {
                    Cell::Integer(i) => Cell::Float(i as f64),
                    Cell::Float(v) if v.is_nan() => Cell::Null,
                    other => other,
                })
                .collect()
        } else {
            cells
        };

        Self::new(name, dtype, cells)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }

    /// Non-missing numeric values, in row order.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.cells.iter().filter_map(Cell::as_f64).collect()
    }

    fn take(&self, indices: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            dtype: self.dtype,
            cells: indices.iter().map(|&i| self.cells[i].clone()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete dataset
// ---------------------------------------------------------------------------

/// Columnar table: an ordered list of equal-length columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns.windows(2).all(|w| w[0].len() == w[1].len()),
            "columns must have equal length"
        );
        Self { columns }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Cells of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[index]).collect()
    }

    /// New table made of the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
        }
    }

    /// New table of `len` rows starting at `start` (clamped to the height).
    pub fn slice(&self, start: usize, len: usize) -> Table {
        let start = start.min(self.height());
        let end = start.saturating_add(len).min(self.height());
        let indices: Vec<usize> = (start..end).collect();
        self.take_rows(&indices)
    }
}
