/// Correlation analysis over normalized survey columns.
///
/// ```text
///   SurveyDataset + ColumnSelection
///        │
///        ▼
///   ┌──────────────┐
///   │ correlation   │  pairwise Pearson r, two-sided p → CorrelationResult
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ summary   │  |r| / p thresholds → Summary sections
///   └──────────┘
/// ```

pub mod correlation;
pub mod matrix;
pub mod summary;

pub use correlation::{correlate, CorrelationResult};
pub use matrix::LabeledMatrix;
pub use summary::{summarize, Summary};
