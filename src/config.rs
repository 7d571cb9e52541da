use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::fields;
use crate::data::metrics::{HEALTH_METRICS, ScoreWeights, ThreatWeights};

/// Env var naming a JSON config file.
pub const CONFIG_ENV: &str = "SURVEY_LENS_CONFIG";
/// Env var overriding the dataset path.
pub const DATA_ENV: &str = "SURVEY_LENS_DATA";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "survey_lens.json";

/// Everything the dashboard reads at startup.
///
/// ```json
/// {
///   "data_path": "data/survey_responses.csv",
///   "brands": ["SYNLAB", "Clinix"],
///   "health_weights": { "awareness": 0.3, "usage": 0.4, "quality": 0.3 },
///   "threat_weights": { "usage": 0.5, "awareness": 0.5 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Tracked brands, home brand first.
    pub brands: Vec<String>,
    pub health_weights: ScoreWeights,
    pub threat_weights: ThreatWeights,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("data/survey_responses.csv"),
            brands: fields::DEFAULT_BRANDS.iter().map(|b| b.to_string()).collect(),
            health_weights: ScoreWeights::default(),
            threat_weights: ThreatWeights::default(),
        }
    }
}

impl DashboardConfig {
    /// Resolve the config: defaults, then the JSON file, then `SURVEY_LENS_DATA`,
    /// then the first command-line argument as the dataset path.
    pub fn resolve(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let file = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            });

        let mut config = match file {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(data) = std::env::var_os(DATA_ENV) {
            config.data_path = PathBuf::from(data);
        }
        if let Some(arg) = args.into_iter().next() {
            config.data_path = PathBuf::from(arg);
        }

        config.validate()?;
        log::info!("Dataset path: {}", config.data_path.display());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject weight sets that do not sum to 1.0 and an empty brand list.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.brands.is_empty(), "config must track at least one brand");
        self.health_weights
            .validate_for(&HEALTH_METRICS)
            .context("invalid health_weights")?;
        self.threat_weights
            .validate()
            .context("invalid threat_weights")?;
        Ok(())
    }

    pub fn home_brand(&self) -> &str {
        self.brands
            .first()
            .map(String::as_str)
            .unwrap_or(fields::DEFAULT_BRANDS[0])
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::metrics::{AWARENESS, QUALITY, USAGE};
    use crate::error::SurveyError;

    #[test]
    fn defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.home_brand(), "SYNLAB");
        assert_eq!(config.brands.len(), 5);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "brands": ["Acme", "Globex"] }}"#).expect("write");
        let config = DashboardConfig::from_file(file.path()).expect("parse");
        assert_eq!(config.brands, vec!["Acme".to_string(), "Globex".to_string()]);
        assert_eq!(config.health_weights, ScoreWeights::default());
        assert_eq!(config.data_path, DashboardConfig::default().data_path);
    }

    #[test]
    fn bad_weights_fail_validation() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{ "threat_weights": {{ "usage": 0.6, "awareness": 0.3 }} }}"#
        )
        .expect("write");
        let config = DashboardConfig::from_file(file.path()).expect("parse");
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("threat_weights"));
    }

    #[test]
    fn misspelled_health_metric_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{ "health_weights": {{ "awarness": 0.3, "usage": 0.4, "quality": 0.3 }} }}"#
        )
        .expect("write");
        let config = DashboardConfig::from_file(file.path()).expect("parse");
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("health_weights"));
        assert_eq!(
            err.downcast_ref::<SurveyError>(),
            Some(&SurveyError::UnknownMetric("awarness".into()))
        );
    }

    #[test]
    fn health_weights_must_cover_every_metric() {
        let config = DashboardConfig {
            health_weights: ScoreWeights::new([(AWARENESS, 0.5), (USAGE, 0.5)]),
            ..DashboardConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.downcast_ref::<SurveyError>(),
            Some(&SurveyError::MissingMetric(QUALITY.into()))
        );
    }
}
