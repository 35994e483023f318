use serde::Serialize;

/// A square matrix keyed by column names. Entries are `None` where the
/// statistic is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledMatrix {
    columns: Vec<String>,
    /// Row-major, `columns.len()` squared entries.
    values: Vec<Option<f64>>,
}

impl LabeledMatrix {
    /// A matrix over `columns` with every entry missing.
    pub fn empty(columns: Vec<String>) -> Self {
        let n = columns.len();
        LabeledMatrix {
            columns,
            values: vec![None; n * n],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }

    /// Entry at row `i`, column `j`.
    pub fn at(&self, i: usize, j: usize) -> Option<f64> {
        self.values[i * self.size() + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: Option<f64>) {
        let n = self.size();
        self.values[i * n + j] = value;
    }

    /// One row of the matrix, in column order.
    pub fn row(&self, i: usize) -> &[Option<f64>] {
        let n = self.size();
        &self.values[i * n..(i + 1) * n]
    }
}
