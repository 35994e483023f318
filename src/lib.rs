//! Survey rating cleaner and pairwise correlation reporter.
//!
//! Extracts numeric ratings from mixed text/number survey answers, clamps
//! them to the rating scale, and reports which questions correlate
//! significantly (Pearson r with a two-sided t test).

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod heatmap;
pub mod normalize;
pub mod pipeline;

pub use analysis::{CorrelationResult, LabeledMatrix, Summary};
pub use config::{AnalysisConfig, RatingScale};
pub use data::model::{CellValue, SurveyDataset};
pub use data::selection::ColumnSelection;
pub use error::SurveyError;
pub use pipeline::{AnalysisReport, SurveyAnalysis};
