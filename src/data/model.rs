use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the survey table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what spreadsheet exports contain.
///
/// `Integer` and `Float` are the numeric cases, `Null` is missing, `Text` is
/// free-form answer text, and `Bool` / `Structured` are the "other" cases that
/// never carry a rating.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Nested JSON (arrays, objects) kept in its textual form.
    Structured(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) | CellValue::Structured(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` if it is numeric and not NaN.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Wrap a raw text field (CSV cell) without interpreting it: empty is
    /// missing, anything else stays text so it can be written back verbatim.
    pub fn from_field(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Null
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) | CellValue::Structured(s) => serializer.serialize_str(s),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(v) if v.is_nan() => serializer.serialize_none(),
            CellValue::Float(v) => serializer.serialize_f64(*v),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Null => serializer.serialize_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// SurveyDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// One respondent (one row of the source table). Cells are aligned with
/// [`SurveyDataset::column_names`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub cells: Vec<CellValue>,
}

/// The full parsed table. Column order and row order are those of the source
/// file and survive every transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyDataset {
    pub column_names: Vec<String>,
    pub responses: Vec<Response>,
}

impl SurveyDataset {
    /// Build a dataset from column names and rows of cells. Short rows are
    /// padded with `Null`, long rows are truncated.
    pub fn new(column_names: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = column_names.len();
        let responses = rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, CellValue::Null);
                Response { cells }
            })
            .collect();
        SurveyDataset {
            column_names,
            responses,
        }
    }

    /// Number of responses (rows).
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    /// Iterate over one column's cells in row order.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.responses.iter().map(move |r| &r.cells[idx])
    }

    /// Mutable access to one column's cells in row order.
    pub fn column_mut(&mut self, idx: usize) -> impl Iterator<Item = &mut CellValue> + '_ {
        self.responses.iter_mut().map(move |r| &mut r.cells[idx])
    }
}
