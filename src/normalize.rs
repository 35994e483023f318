//! Rating extraction and range filtering for selected survey columns.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::RatingScale;
use crate::data::model::{CellValue, SurveyDataset};
use crate::data::selection::ColumnSelection;

/// First integer or decimal number embedded in a piece of text, ASCII digits
/// only.
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap());

/// Extract a numeric rating from a raw cell, without range checks.
///
/// Text cells yield their first numeric substring ("High-10" → 10.0), so a
/// leading minus sign is never part of the match.
pub fn extract_rating(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Null => None,
        CellValue::Text(text) => NUMBER_RE
            .find(text)
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        CellValue::Integer(i) => Some(*i as f64),
        CellValue::Float(v) if v.is_nan() => None,
        CellValue::Float(v) => Some(*v),
        CellValue::Bool(_) | CellValue::Structured(_) => None,
    }
}

/// A cell that is a number on its own: numeric variants, or text that parses
/// as `f64` in full (sign, exponent, `inf` and `NaN` included).
fn plain_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Integer(i) => Some(*i as f64),
        CellValue::Float(v) => Some(*v),
        CellValue::Text(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Whether every present cell of a column is a plain number. Such a column is
/// read as numbers (keeping signs); any other column goes through
/// [`extract_rating`].
fn is_numeric_column<'a>(mut cells: impl Iterator<Item = &'a CellValue>) -> bool {
    cells.all(|c| c.is_missing() || plain_number(c).is_some())
}

/// Extract a rating and keep it only if it lies on `scale`.
pub fn normalize_cell(cell: &CellValue, scale: &RatingScale) -> CellValue {
    extract_rating(cell)
        .and_then(|v| scale.clamp(v))
        .map_or(CellValue::Null, CellValue::Float)
}

/// Per-column outcome of normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnCleaning {
    pub column: String,
    /// Cells holding a valid rating after cleaning.
    pub kept: usize,
    /// Cells that were already missing.
    pub was_missing: usize,
    /// Text or other cells with no extractable number.
    pub unparseable: usize,
    /// Numbers dropped for lying outside the scale.
    pub out_of_range: usize,
}

impl ColumnCleaning {
    pub fn missing_after(&self) -> usize {
        self.was_missing + self.unparseable + self.out_of_range
    }
}

/// Normalization counts for every selected column, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub columns: Vec<ColumnCleaning>,
}

/// Rewrite every cell of every selected column in place to `Float` or `Null`.
/// Other columns are left untouched.
///
/// A column whose present cells all parse as plain numbers is taken as
/// numeric ("-3" stays -3 and is range-filtered). Otherwise every cell goes
/// through [`extract_rating`].
pub fn normalize_columns(
    dataset: &mut SurveyDataset,
    selection: &ColumnSelection,
    scale: &RatingScale,
) -> NormalizationReport {
    let mut report = NormalizationReport::default();

    for (name, idx) in selection.iter() {
        let mut stats = ColumnCleaning {
            column: name.to_string(),
            ..Default::default()
        };

        let numeric = is_numeric_column(dataset.column(idx));

        for cell in dataset.column_mut(idx) {
            let parsed = if cell.is_missing() {
                None
            } else if numeric {
                plain_number(cell)
            } else {
                extract_rating(cell)
            };
            *cell = match parsed {
                None if cell.is_missing() => {
                    stats.was_missing += 1;
                    CellValue::Null
                }
                Some(v) if v.is_nan() => {
                    stats.was_missing += 1;
                    CellValue::Null
                }
                None => {
                    stats.unparseable += 1;
                    CellValue::Null
                }
                Some(v) => match scale.clamp(v) {
                    Some(v) => {
                        stats.kept += 1;
                        CellValue::Float(v)
                    }
                    None => {
                        stats.out_of_range += 1;
                        CellValue::Null
                    }
                },
            };
        }

        debug!(
            "Column '{}': {} kept, {} missing, {} unparseable, {} out of range",
            stats.column, stats.kept, stats.was_missing, stats.unparseable, stats.out_of_range
        );
        report.columns.push(stats);
    }

    report
}
