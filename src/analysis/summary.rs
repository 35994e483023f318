//! Plain-language summary of significant correlations.

use std::fmt;

use serde::Serialize;

use super::correlation::CorrelationResult;
use crate::config::AnalysisConfig;

// ---------------------------------------------------------------------------
// Strength / direction labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
    VeryWeak,
}

impl Strength {
    /// Label for |r|; first matching band wins.
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.7 {
            Strength::Strong
        } else if magnitude >= 0.4 {
            Strength::Moderate
        } else if magnitude >= 0.2 {
            Strength::Weak
        } else {
            Strength::VeryWeak
        }
    }

    pub fn adverb(self) -> &'static str {
        match self {
            Strength::Strong => "strongly",
            Strength::Moderate => "moderately",
            Strength::Weak => "weakly",
            Strength::VeryWeak => "very weakly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn from_coefficient(r: f64) -> Self {
        if r > 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    pub fn adverb(self) -> &'static str {
        match self {
            Direction::Positive => "positively",
            Direction::Negative => "negatively",
        }
    }
}

// ---------------------------------------------------------------------------
// Findings and sections
// ---------------------------------------------------------------------------

/// One significant relationship, reported under `column`'s section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub column: String,
    pub other: String,
    pub coefficient: f64,
    pub p_value: f64,
    pub strength: Strength,
    pub direction: Direction,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is {} and {} correlated with {} (r = {:.2}, p = {:.3})",
            self.column,
            self.strength.adverb(),
            self.direction.adverb(),
            self.other,
            self.coefficient,
            self.p_value
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub column: String,
    pub findings: Vec<Finding>,
}

/// Significant findings grouped per column, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub sections: Vec<Section>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All findings across sections, in output order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> + '_ {
        self.sections.iter().flat_map(|s| s.findings.iter())
    }

    /// Markdown-style text: a `### column:` header per section followed by
    /// `- ` bullets. Empty when nothing is significant.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "### {}:", section.column)?;
            for finding in &section.findings {
                writeln!(f, "- {finding}")?;
            }
        }
        Ok(())
    }
}

/// Whether a matrix entry passes the reporting thresholds.
pub fn is_significant(r: Option<f64>, p: Option<f64>, config: &AnalysisConfig) -> bool {
    match (r, p) {
        (Some(r), Some(p)) => {
            r.abs() >= config.min_abs_correlation && p < config.significance_level
        }
        _ => false,
    }
}

/// Build the summary from the matrices alone.
pub fn summarize(result: &CorrelationResult, config: &AnalysisConfig) -> Summary {
    let columns = result.columns();
    let mut summary = Summary::default();

    for (i, column) in columns.iter().enumerate() {
        let findings: Vec<Finding> = columns
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .filter_map(|(j, other)| {
                let r = result.coefficients.at(i, j);
                let p = result.p_values.at(i, j);
                if !is_significant(r, p, config) {
                    return None;
                }
                let (r, p) = (r?, p?);
                Some(Finding {
                    column: column.clone(),
                    other: other.clone(),
                    coefficient: r,
                    p_value: p,
                    strength: Strength::from_coefficient(r),
                    direction: Direction::from_coefficient(r),
                })
            })
            .collect();

        if !findings.is_empty() {
            summary.sections.push(Section {
                column: column.clone(),
                findings,
            });
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::matrix::LabeledMatrix;

    fn result(columns: &[&str], entries: &[(usize, usize, f64, f64)]) -> CorrelationResult {
        let names: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let n = names.len();
        let mut coefficients = LabeledMatrix::empty(names.clone());
        let mut p_values = LabeledMatrix::empty(names);
        for i in 0..n {
            coefficients.set(i, i, Some(1.0));
            p_values.set(i, i, Some(0.0));
        }
        for &(i, j, r, p) in entries {
            for (a, b) in [(i, j), (j, i)] {
                coefficients.set(a, b, Some(r));
                p_values.set(a, b, Some(p));
            }
        }
        CorrelationResult {
            coefficients,
            p_values,
            paired_rows: vec![vec![10; n]; n],
        }
    }

    #[test]
    fn test_strength_bands() {
        assert_eq!(Strength::from_coefficient(0.7), Strength::Strong);
        assert_eq!(Strength::from_coefficient(-0.69), Strength::Moderate);
        assert_eq!(Strength::from_coefficient(0.4), Strength::Moderate);
        assert_eq!(Strength::from_coefficient(0.2), Strength::Weak);
        assert_eq!(Strength::from_coefficient(0.19), Strength::VeryWeak);
        assert_eq!(Direction::from_coefficient(0.0), Direction::Negative);
    }

    #[test]
    fn test_perfect_correlation_sentence() {
        let summary = summarize(&result(&["A", "B"], &[(0, 1, 1.0, 0.0)]), &AnalysisConfig::default());
        assert_eq!(
            summary.render(),
            "### A:\n\
             - A is strongly and positively correlated with B (r = 1.00, p = 0.000)\n\
             \n\
             ### B:\n\
             - B is strongly and positively correlated with A (r = 1.00, p = 0.000)\n"
        );
    }

    #[test]
    fn test_thresholds_filter_findings() {
        let res = result(
            &["A", "B", "C", "D"],
            &[
                (0, 1, -0.45, 0.01),  // reported, moderate negative
                (0, 2, 0.19, 0.001),  // |r| too small
                (0, 3, 0.8, 0.05),    // p not strictly below alpha
                (1, 2, 0.25, 0.049),  // reported, weak positive
            ],
        );
        let summary = summarize(&res, &AnalysisConfig::default());

        let lines: Vec<String> = summary.findings().map(|f| f.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "A is moderately and negatively correlated with B (r = -0.45, p = 0.010)",
                "B is moderately and negatively correlated with A (r = -0.45, p = 0.010)",
                "B is weakly and positively correlated with C (r = 0.25, p = 0.049)",
                "C is weakly and positively correlated with B (r = 0.25, p = 0.049)",
            ]
        );
        // D has nothing significant: no empty header.
        assert!(summary.sections.iter().all(|s| s.column != "D"));
        assert!(!summary.render().contains("### D:"));
    }

    #[test]
    fn test_missing_entries_never_reported() {
        let mut res = result(&["A", "B"], &[]);
        res.p_values.set(0, 1, Some(0.0));
        let summary = summarize(&res, &AnalysisConfig::default());
        assert!(summary.is_empty());
        assert_eq!(summary.render(), "");
    }
}
