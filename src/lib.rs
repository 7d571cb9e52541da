//! Filtering, metrics and customer segmentation over a brand-awareness survey.

pub mod config;
pub mod data;
pub mod error;

pub use config::DashboardConfig;
pub use data::filter::{FilterSelection, FilteredView, apply_filters};
pub use data::model::{FieldValue, SurveyDataset, SurveyRow};
pub use data::report::DashboardSummary;
pub use data::segment::{Segment, classify};
pub use error::SurveyError;
