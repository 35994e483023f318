use log::info;
use serde::Serialize;

use crate::analysis::{correlate, summarize, CorrelationResult, Summary};
use crate::config::AnalysisConfig;
use crate::data::model::SurveyDataset;
use crate::data::selection::ColumnSelection;
use crate::error::SurveyError;
use crate::normalize::{normalize_columns, NormalizationReport};

// ---------------------------------------------------------------------------
// Analysis run
// ---------------------------------------------------------------------------

/// Everything one run derives from the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub selection: ColumnSelection,
    pub normalization: NormalizationReport,
    pub correlations: CorrelationResult,
    pub summary: Summary,
}

/// Cleans the selected columns and correlates them.
#[derive(Debug, Clone, Default)]
pub struct SurveyAnalysis {
    pub config: AnalysisConfig,
}

impl SurveyAnalysis {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Validate the selection, normalize its columns in place, then compute
    /// the matrices and the summary.
    ///
    /// Fails before touching the dataset if the config is invalid or any
    /// selected column is unknown.
    pub fn run<S: AsRef<str>>(
        &self,
        dataset: &mut SurveyDataset,
        columns: &[S],
    ) -> Result<AnalysisReport, SurveyError> {
        self.config.validate()?;
        let selection = ColumnSelection::resolve(dataset, columns)?;
        info!(
            "Analyzing {} columns over {} responses",
            selection.len(),
            dataset.len()
        );

        let normalization = normalize_columns(dataset, &selection, &self.config.scale);
        let correlations = correlate(dataset, &selection, &self.config);
        let summary = summarize(&correlations, &self.config);
        info!(
            "{} significant correlations found",
            summary.findings().count()
        );

        Ok(AnalysisReport {
            selection,
            normalization,
            correlations,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn scenario_dataset() -> SurveyDataset {
        let a = ["1", "2", "3", "4", "5"];
        let b = ["Low-2", "4", "6", "8", "High-10"];
        SurveyDataset::new(
            vec!["id".into(), "A".into(), "B".into()],
            (0..5)
                .map(|i| {
                    vec![
                        CellValue::Integer(i as i64),
                        CellValue::from_field(a[i]),
                        CellValue::Text(b[i].to_string()),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn test_run_perfect_linear_relation() {
        let mut dataset = scenario_dataset();
        let report = SurveyAnalysis::default()
            .run(&mut dataset, &["A", "B"])
            .unwrap();

        assert_eq!(
            report.summary.render(),
            "### A:\n\
             - A is strongly and positively correlated with B (r = 1.00, p = 0.000)\n\
             \n\
             ### B:\n\
             - B is strongly and positively correlated with A (r = 1.00, p = 0.000)\n"
        );
        assert_eq!(dataset.responses[4].cells[2], CellValue::Float(10.0));
        // The id column is not selected and keeps its integers.
        assert_eq!(dataset.responses[4].cells[0], CellValue::Integer(4));
    }

    #[test]
    fn test_run_rejects_unknown_column_without_mutating() {
        let mut dataset = scenario_dataset();
        let before = dataset.clone();
        let err = SurveyAnalysis::default()
            .run(&mut dataset, &["A", "Nope"])
            .unwrap_err();
        assert!(matches!(err, SurveyError::UnknownColumns { .. }));
        assert_eq!(dataset, before);
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let mut config = AnalysisConfig::default();
        config.significance_level = 0.0;
        let err = SurveyAnalysis::new(config)
            .run(&mut scenario_dataset(), &["A"])
            .unwrap_err();
        assert!(matches!(err, SurveyError::InvalidConfig(_)));
    }
}
