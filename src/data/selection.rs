use log::warn;
use serde::Serialize;

use super::model::SurveyDataset;
use crate::error::SurveyError;

// ---------------------------------------------------------------------------
// Column selection: which survey questions are rating questions
// ---------------------------------------------------------------------------

/// An ordered set of column names validated against a dataset.
///
/// Holds each name together with its position in the dataset so later stages
/// never look columns up by name again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSelection {
    names: Vec<String>,
    #[serde(skip)]
    indices: Vec<usize>,
}

impl ColumnSelection {
    /// Resolve user-supplied column names against `dataset`.
    ///
    /// * Names are matched exactly.
    /// * A repeated name keeps its first position.
    /// * Any unknown name rejects the whole selection, listing every unknown
    ///   name and the available columns.
    pub fn resolve<S: AsRef<str>>(
        dataset: &SurveyDataset,
        names: &[S],
    ) -> Result<Self, SurveyError> {
        let mut selection = ColumnSelection {
            names: Vec::with_capacity(names.len()),
            indices: Vec::with_capacity(names.len()),
        };
        let mut missing = Vec::new();

        for name in names {
            let name: &str = name.as_ref();
            if selection.names.iter().any(|n| n == name) {
                warn!("Column '{name}' selected more than once; keeping first occurrence");
                continue;
            }
            match dataset.column_index(name) {
                Some(idx) => {
                    selection.names.push(name.to_string());
                    selection.indices.push(idx);
                }
                None => missing.push(name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(SurveyError::UnknownColumns {
                missing,
                available: dataset.column_names.clone(),
            });
        }
        Ok(selection)
    }

    /// Selected column names in selection order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// `(name, dataset column index)` pairs in selection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.indices.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
