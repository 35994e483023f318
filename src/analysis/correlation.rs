//! Pairwise Pearson correlation with two-sided significance tests.

use log::{debug, warn};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use super::matrix::LabeledMatrix;
use crate::config::AnalysisConfig;
use crate::data::model::SurveyDataset;
use crate::data::selection::ColumnSelection;

/// Coefficients, p-values and paired-row counts for every selected pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub coefficients: LabeledMatrix,
    pub p_values: LabeledMatrix,
    /// Rows where both columns hold a rating. Diagonal holds the column's own
    /// count of ratings.
    pub paired_rows: Vec<Vec<usize>>,
}

impl CorrelationResult {
    pub fn columns(&self) -> &[String] {
        self.coefficients.columns()
    }
}

/// Pearson's r for paired samples.
///
/// Returns `None` for fewer than two points or when either side has zero
/// variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    // Exact check first: the mean of identical floats is not always exact.
    if xs.iter().all(|&x| x == xs[0]) || ys.iter().all(|&y| y == ys[0]) {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

/// Two-sided p-value for `r` computed from `n` pairs, from Student's t with
/// `n - 2` degrees of freedom.
pub fn pearson_p_value(r: f64, n: usize) -> Option<f64> {
    if n < 3 || !r.is_finite() {
        return None;
    }
    let df = (n - 2) as f64;
    let one_minus_r2 = 1.0 - r * r;
    if one_minus_r2 <= 0.0 {
        return Some(0.0);
    }
    let t = r * (df / one_minus_r2).sqrt();
    let dist = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => dist,
        Err(e) => {
            warn!("Cannot build t distribution with {df} degrees of freedom: {e}");
            return None;
        }
    };
    Some((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

/// Ratings of two dataset columns on rows where both are present.
fn paired_values(dataset: &SurveyDataset, a: usize, b: usize) -> (Vec<f64>, Vec<f64>) {
    dataset
        .responses
        .iter()
        .filter_map(|r| Some((r.cells[a].as_f64()?, r.cells[b].as_f64()?)))
        .unzip()
}

/// Compute the coefficient and p-value matrices over `selection`.
///
/// The diagonal is fixed at r = 1 and p = 0. Off-diagonal pairs with fewer
/// than `config.min_paired_rows` paired ratings, or a constant side, are left
/// missing.
pub fn correlate(
    dataset: &SurveyDataset,
    selection: &ColumnSelection,
    config: &AnalysisConfig,
) -> CorrelationResult {
    let names = selection.names().to_vec();
    let columns: Vec<(&str, usize)> = selection.iter().collect();
    let n = columns.len();

    let mut coefficients = LabeledMatrix::empty(names.clone());
    let mut p_values = LabeledMatrix::empty(names);
    let mut paired_rows = vec![vec![0usize; n]; n];

    for (i, &(name_i, col_i)) in columns.iter().enumerate() {
        for (j, &(name_j, col_j)) in columns.iter().enumerate() {
            if i == j {
                coefficients.set(i, j, Some(1.0));
                p_values.set(i, j, Some(0.0));
                paired_rows[i][j] = dataset.column(col_i).filter(|c| c.as_f64().is_some()).count();
                continue;
            }

            let (xs, ys) = paired_values(dataset, col_i, col_j);
            let count = xs.len();
            paired_rows[i][j] = count;

            if count < config.min_paired_rows {
                if i < j {
                    warn!(
                        "Only {count} paired responses for '{name_i}' and '{name_j}'; correlation left undefined"
                    );
                }
                continue;
            }

            let r = pearson(&xs, &ys);
            if r.is_none() && i < j {
                debug!("'{name_i}' or '{name_j}' is constant over {count} paired responses");
            }
            coefficients.set(i, j, r);
            p_values.set(i, j, r.and_then(|r| pearson_p_value(r, count)));
        }
    }

    CorrelationResult {
        coefficients,
        p_values,
        paired_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn numeric_dataset(columns: &[(&str, Vec<Option<f64>>)]) -> SurveyDataset {
        let rows = columns[0].1.len();
        let names = columns.iter().map(|(n, _)| n.to_string()).collect();
        let data = (0..rows)
            .map(|r| {
                columns
                    .iter()
                    .map(|(_, vals)| vals[r].map_or(CellValue::Null, CellValue::Float))
                    .collect()
            })
            .collect();
        SurveyDataset::new(names, data)
    }

    #[test]
    fn test_pearson_perfect_linear() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        assert!(close(r, 1.0, 1e-12));
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!(close(r, -1.0, 1e-12));
    }

    #[test]
    fn test_pearson_constant_is_undefined() {
        assert_eq!(pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), None);
        assert_eq!(pearson(&[0.1, 0.1, 0.1, 0.1], &[0.1, 0.1, 0.1, 0.1]), None);
    }

    #[test]
    fn test_p_value_matches_reference() {
        // x = 1..5, y = [2, 1, 4, 3, 5]: r = 0.8, t = 2.3094, df = 3.
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
        assert!(close(r, 0.8, 1e-12));
        let p = pearson_p_value(r, 5).unwrap();
        assert!(close(p, 0.104088, 1e-4), "p = {p}");
    }

    #[test]
    fn test_p_value_edges() {
        assert_eq!(pearson_p_value(1.0, 5), Some(0.0));
        assert_eq!(pearson_p_value(-1.0, 3), Some(0.0));
        assert_eq!(pearson_p_value(0.5, 2), None);
        let p = pearson_p_value(0.0, 10).unwrap();
        assert!(close(p, 1.0, 1e-12));
    }

    #[test]
    fn test_correlate_diagonal_and_symmetry() {
        let dataset = numeric_dataset(&[
            ("A", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(6.0)]),
            ("B", vec![Some(2.0), Some(1.0), Some(4.0), None, Some(5.0), Some(7.0)]),
            ("C", vec![Some(9.0), Some(7.0), Some(8.0), Some(4.0), Some(3.0), Some(1.0)]),
        ]);
        let selection = ColumnSelection::resolve(&dataset, &["A", "B", "C"]).unwrap();
        let result = correlate(&dataset, &selection, &AnalysisConfig::default());

        for i in 0..3 {
            assert_eq!(result.coefficients.at(i, i), Some(1.0));
            assert_eq!(result.p_values.at(i, i), Some(0.0));
            for j in 0..3 {
                let (a, b) = (result.coefficients.at(i, j), result.coefficients.at(j, i));
                assert!(close(a.unwrap(), b.unwrap(), 1e-12));
                let (p, q) = (result.p_values.at(i, j), result.p_values.at(j, i));
                assert!(close(p.unwrap(), q.unwrap(), 1e-12));
            }
        }
        assert_eq!(result.paired_rows[0][1], 5);
        assert_eq!(result.paired_rows[1][1], 5);
        assert_eq!(result.paired_rows[0][2], 6);
    }

    #[test]
    fn test_correlate_insufficient_pairs() {
        let dataset = numeric_dataset(&[
            ("A", vec![Some(1.0), Some(2.0), None, Some(4.0)]),
            ("B", vec![Some(3.0), None, Some(5.0), Some(9.0)]),
        ]);
        let selection = ColumnSelection::resolve(&dataset, &["A", "B"]).unwrap();
        let result = correlate(&dataset, &selection, &AnalysisConfig::default());
        assert_eq!(result.coefficients.at(0, 1), None);
        assert_eq!(result.p_values.at(0, 1), None);
        assert_eq!(result.paired_rows[0][1], 2);
    }

    #[test]
    fn test_correlate_zero_variance() {
        let dataset = numeric_dataset(&[
            ("A", vec![Some(4.0); 5]),
            ("B", vec![Some(4.0); 5]),
        ]);
        let selection = ColumnSelection::resolve(&dataset, &["A", "B"]).unwrap();
        let result = correlate(&dataset, &selection, &AnalysisConfig::default());
        assert_eq!(result.coefficients.at(0, 1), None);
        assert_eq!(result.p_values.at(1, 0), None);
    }
}
