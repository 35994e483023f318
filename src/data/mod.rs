/// Data layer: core types, loading, column selection and writing.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SurveyDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SurveyDataset │  ordered columns, Vec<Response> of CellValue
///   └──────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ selection  │  user column names → validated ColumnSelection
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  cleaned table, matrices, summary → files
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod selection;
pub mod writer;
