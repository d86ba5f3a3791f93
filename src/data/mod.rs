/// Data layer: engine results, sample labels and the wide table.
///
/// Architecture:
/// ```text
///  results .csv / .json / .parquet      projections .json / .csv
///        │                                      │
///        ▼                                      ▼
///   ┌──────────┐                         ┌──────────────┐
///   │  loader   │  parse → Vec<ResultRow> │ RtProjection  │
///   └──────────┘                         └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  table    │  labels + basenames → WideTable
///   └──────────┘
/// ```

pub mod labels;
pub mod loader;
pub mod model;
pub mod table;
