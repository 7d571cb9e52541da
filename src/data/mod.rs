/// Data layer: survey schema, loading, filtering, metrics and segmentation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + coerce → SurveyDataset (cached per path)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → FilteredView (row indices)
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │ metrics   │   │ segment   │  rates, means, scores / per-row labels
///   └──────────┘   └──────────┘
///        │              │
///        └──────┬───────┘
///               ▼
///          ┌──────────┐
///          │  report   │  DashboardSummary for the UI / JSON export
///          └──────────┘
/// ```

pub mod cache;
pub mod fields;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod report;
pub mod segment;

#[cfg(test)]
pub(crate) mod test_support;
