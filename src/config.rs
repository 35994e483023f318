//! Analysis parameters

use crate::error::SurveyError;

/// Inclusive range of valid ratings on the survey scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingScale {
    pub min: f64,
    pub max: f64,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1.0, max: 10.0 }
    }
}

impl RatingScale {
    /// Keep `value` only if it lies inside the scale, bounds included.
    pub fn clamp(&self, value: f64) -> Option<f64> {
        if value >= self.min && value <= self.max {
            Some(value)
        } else {
            None
        }
    }
}

/// Analysis configuration parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Valid rating range; anything outside becomes missing (default: 1..=10)
    pub scale: RatingScale,

    /// Smallest |r| reported in the summary (default: 0.2)
    pub min_abs_correlation: f64,

    /// p-values strictly below this are significant (default: 0.05)
    pub significance_level: f64,

    /// Fewest rows with both answers present needed to compute r (default: 3)
    pub min_paired_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            scale: RatingScale::default(),
            min_abs_correlation: 0.2,
            significance_level: 0.05,
            min_paired_rows: 3,
        }
    }
}

impl AnalysisConfig {
    /// Reject parameter combinations that make the analysis meaningless.
    pub fn validate(&self) -> Result<(), SurveyError> {
        let RatingScale { min, max } = self.scale;
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(SurveyError::InvalidConfig(format!(
                "rating scale [{min}, {max}] is empty or not finite"
            )));
        }
        if !(0.0..=1.0).contains(&self.min_abs_correlation) {
            return Err(SurveyError::InvalidConfig(format!(
                "minimum |r| must be within [0, 1], got {}",
                self.min_abs_correlation
            )));
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(SurveyError::InvalidConfig(format!(
                "significance level must be within (0, 1), got {}",
                self.significance_level
            )));
        }
        // r and its t statistic need n - 2 >= 1.
        if self.min_paired_rows < 3 {
            return Err(SurveyError::InvalidConfig(format!(
                "at least 3 paired rows are required, got {}",
                self.min_paired_rows
            )));
        }
        Ok(())
    }
}
