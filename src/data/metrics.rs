//! Summary statistics over a [`FilteredView`].
//!
//! Every aggregate over rows returns `Ok(None)` when it is not computable
//! (an empty view, or no non-missing values) and `Err` only when asked about a
//! column that does not exist or has the wrong kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};

use super::fields;
use super::filter::FilteredView;
use super::model::{FieldKind, FieldValue};

const WEIGHT_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

fn expect_kind(
    view: &FilteredView<'_>,
    field: &str,
    accepts: fn(FieldKind) -> bool,
    expected: &'static str,
) -> Result<()> {
    let kind = view.dataset().schema.kind(field)?;
    if accepts(kind) {
        Ok(())
    } else {
        Err(SurveyError::WrongFieldKind {
            field: field.to_string(),
            expected,
        })
    }
}

fn expect_flag(view: &FilteredView<'_>, field: &str) -> Result<()> {
    expect_kind(view, field, |k| k == FieldKind::Flag, "yes/no")
}

fn expect_numeric(view: &FilteredView<'_>, field: &str) -> Result<()> {
    expect_kind(view, field, FieldKind::is_numeric, "numeric")
}

fn percent(count: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| 100.0 * count as f64 / total as f64)
}

// ---------------------------------------------------------------------------
// Row aggregates
// ---------------------------------------------------------------------------

/// Number of rows where the flag is true.
pub fn count_true(view: &FilteredView<'_>, field: &str) -> Result<usize> {
    expect_flag(view, field)?;
    Ok(view.rows().filter(|row| row.flag(field) == Some(true)).count())
}

/// `100 * count(field == true) / count(rows)`. Missing answers count as not true.
pub fn rate(view: &FilteredView<'_>, field: &str) -> Result<Option<f64>> {
    let hits = count_true(view, field)?;
    Ok(percent(hits, view.len()))
}

/// Arithmetic mean over the non-missing values of a numeric column.
pub fn mean(view: &FilteredView<'_>, field: &str) -> Result<Option<f64>> {
    expect_numeric(view, field)?;
    let (sum, n) = view
        .rows()
        .filter_map(|row| row.number(field))
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    Ok((n > 0).then(|| sum / n as f64))
}

/// Mean of `numeric_field` per distinct value of `group_field`.
/// Groups without a single numeric value are left out.
pub fn group_mean(
    view: &FilteredView<'_>,
    group_field: &str,
    numeric_field: &str,
) -> Result<BTreeMap<FieldValue, f64>> {
    view.dataset().schema.kind(group_field)?;
    expect_numeric(view, numeric_field)?;

    let mut acc: BTreeMap<FieldValue, (f64, usize)> = BTreeMap::new();
    for row in view.rows() {
        if let Some(v) = row.number(numeric_field) {
            let entry = acc.entry(row.get(group_field).clone()).or_default();
            entry.0 += v;
            entry.1 += 1;
        }
    }
    Ok(acc
        .into_iter()
        .map(|(group, (sum, n))| (group, sum / n as f64))
        .collect())
}

/// Occurrences of each distinct value, missing answers included.
pub fn value_counts(view: &FilteredView<'_>, field: &str) -> Result<BTreeMap<FieldValue, usize>> {
    view.dataset().schema.kind(field)?;
    let mut counts = BTreeMap::new();
    for row in view.rows() {
        *counts.entry(row.get(field).clone()).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Percentage of rows whose numeric value is at least `threshold`.
pub fn share_at_least(view: &FilteredView<'_>, field: &str, threshold: f64) -> Result<Option<f64>> {
    expect_numeric(view, field)?;
    let hits = view
        .rows()
        .filter(|row| row.number(field).is_some_and(|v| v >= threshold))
        .count();
    Ok(percent(hits, view.len()))
}

/// Net promoter on the 1–5 scale: % answering 3 or more minus % answering 2 or less.
pub fn net_promoter(view: &FilteredView<'_>, field: &str) -> Result<Option<f64>> {
    expect_kind(view, field, |k| k == FieldKind::Rating, "1-5 rating")?;
    let (mut promoters, mut detractors) = (0, 0);
    for v in view.rows().filter_map(|row| row.number(field)) {
        if v >= 3.0 {
            promoters += 1;
        } else {
            detractors += 1;
        }
    }
    let total = view.len();
    Ok(percent(promoters, total).zip(percent(detractors, total)).map(|(p, d)| p - d))
}

/// Share of non-missing cells across every column, as a percentage.
pub fn completion_rate(view: &FilteredView<'_>) -> Option<f64> {
    let columns = &view.dataset().schema.columns;
    let filled: usize = view
        .rows()
        .map(|row| columns.iter().filter(|c| !row.get(c).is_missing()).count())
        .sum();
    percent(filled, view.len() * columns.len())
}

// ---------------------------------------------------------------------------
// Weighted scores
// ---------------------------------------------------------------------------

/// Named weights for [`composite_score`]; must be non-negative and sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreWeights(pub BTreeMap<String, f64>);

pub const AWARENESS: &str = "awareness";
pub const USAGE: &str = "usage";
pub const QUALITY: &str = "quality";
/// Metrics the brand health score is built from.
pub const HEALTH_METRICS: [&str; 3] = [AWARENESS, USAGE, QUALITY];

impl ScoreWeights {
    pub fn new<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        ScoreWeights(weights.into_iter().map(|(k, w)| (k.into(), w)).collect())
    }

    pub fn validate(&self) -> Result<()> {
        validate_weights(self.0.values().copied())
    }

    /// Valid weights over exactly the metrics in `names`.
    pub fn validate_for(&self, names: &[&str]) -> Result<()> {
        if let Some(unknown) = self.0.keys().find(|k| !names.contains(&k.as_str())) {
            return Err(SurveyError::UnknownMetric(unknown.clone()));
        }
        if let Some(missing) = names.iter().find(|n| !self.0.contains_key(**n)) {
            return Err(SurveyError::MissingMetric(missing.to_string()));
        }
        self.validate()
    }
}

/// Brand health: awareness 30%, usage 40%, perceived quality 30%.
impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights::new([(AWARENESS, 0.3), (USAGE, 0.4), (QUALITY, 0.3)])
    }
}

fn validate_weights(weights: impl IntoIterator<Item = f64>) -> Result<()> {
    let mut sum = 0.0;
    let mut negative = false;
    for w in weights {
        negative |= w < 0.0 || !w.is_finite();
        sum += w;
    }
    if negative || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(SurveyError::InvalidWeights { sum });
    }
    Ok(())
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SurveyError::MetricOutOfRange {
            name: name.to_string(),
            value,
            min,
            max,
        })
    }
}

/// Weighted sum of metrics normalised to [0, 1], scaled to [0, 100].
///
/// Rejects weights that do not sum to 1.0, weights without a matching metric,
/// and metrics outside [0, 1]. Metrics without a weight are ignored.
pub fn composite_score(weights: &ScoreWeights, metrics: &BTreeMap<String, f64>) -> Result<f64> {
    weights.validate()?;
    let mut score = 0.0;
    for (name, weight) in &weights.0 {
        let value = *metrics
            .get(name)
            .ok_or_else(|| SurveyError::MissingMetric(name.clone()))?;
        check_range(name, value, 0.0, 1.0)?;
        score += weight * value;
    }
    Ok(score * 100.0)
}

/// Weights for [`threat_score`]; must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatWeights {
    pub usage: f64,
    pub awareness: f64,
}

impl Default for ThreatWeights {
    fn default() -> Self {
        ThreatWeights {
            usage: 0.5,
            awareness: 0.5,
        }
    }
}

impl ThreatWeights {
    pub fn validate(&self) -> Result<()> {
        validate_weights([self.usage, self.awareness])
    }
}

/// Competitor importance on a 3–10 scale:
/// `3 + 7 * (w_usage * usage + w_awareness * awareness) / 100`.
pub fn threat_score(awareness_pct: f64, usage_pct: f64, weights: &ThreatWeights) -> Result<f64> {
    weights.validate()?;
    check_range(AWARENESS, awareness_pct, 0.0, 100.0)?;
    check_range(USAGE, usage_pct, 0.0, 100.0)?;
    let blended = weights.usage * usage_pct + weights.awareness * awareness_pct;
    Ok(3.0 + 7.0 * blended / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            ThreatLevel::High
        } else if score >= 5.0 {
            ThreatLevel::Medium
        } else {
            ThreatLevel::Low
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ThreatLevel::Low => "Low",
            ThreatLevel::Medium => "Medium",
            ThreatLevel::High => "High",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Brand-level metrics
// ---------------------------------------------------------------------------

/// Awareness and usage of one tracked brand within a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandSnapshot {
    pub brand: String,
    pub aware: usize,
    pub awareness: Option<f64>,
    pub usage: Option<f64>,
}

impl BrandSnapshot {
    /// Average of awareness and usage.
    pub fn market_position(&self) -> Option<f64> {
        self.awareness.zip(self.usage).map(|(a, u)| (a + u) / 2.0)
    }
}

pub fn brand_snapshot(view: &FilteredView<'_>, brand: &str) -> Result<BrandSnapshot> {
    let heard = fields::heard_column(brand);
    let used = fields::used_column(brand);
    Ok(BrandSnapshot {
        brand: brand.to_string(),
        aware: count_true(view, &heard)?,
        awareness: rate(view, &heard)?,
        usage: rate(view, &used)?,
    })
}

/// Health of a brand from its awareness %, usage % and mean 1–5 rating.
pub fn brand_health(
    awareness_pct: f64,
    usage_pct: f64,
    avg_rating: f64,
    weights: &ScoreWeights,
) -> Result<f64> {
    let metrics = BTreeMap::from([
        (AWARENESS.to_string(), awareness_pct / 100.0),
        (USAGE.to_string(), usage_pct / 100.0),
        (QUALITY.to_string(), avg_rating / 5.0),
    ]);
    composite_score(weights, &metrics)
}

/// Headroom weighted by conversion: `(100 - awareness) * usage / 100`.
pub fn growth_potential(awareness_pct: f64, usage_pct: f64) -> f64 {
    (100.0 - awareness_pct) * usage_pct / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterSelection, FilteredView, apply_filters};
    use crate::data::test_support::dataset;

    #[test]
    fn rate_of_all_true_and_all_false() {
        let ds = dataset(&[
            &[("Heard_SYNLAB", "true")],
            &[("Heard_SYNLAB", "true")],
        ]);
        let view = FilteredView::all(&ds);
        assert_eq!(rate(&view, "Heard_SYNLAB").unwrap(), Some(100.0));
        assert_eq!(rate(&view, "Used_SYNLAB").unwrap(), Some(0.0));
    }

    #[test]
    fn empty_view_is_not_computable() {
        let ds = dataset(&[&[]]);
        let selection = FilterSelection::unconstrained()
            .with(fields::GENDER, Vec::new())
            .unwrap();
        let view = apply_filters(&ds, &selection).unwrap();
        assert_eq!(rate(&view, "Heard_SYNLAB").unwrap(), None);
        assert_eq!(mean(&view, fields::RATING).unwrap(), None);
        assert_eq!(net_promoter(&view, fields::RATING).unwrap(), None);
        assert_eq!(completion_rate(&view), None);
        assert!(group_mean(&view, fields::GENDER, fields::RATING).unwrap().is_empty());
    }

    #[test]
    fn unknown_and_mistyped_fields_are_errors() {
        let ds = dataset(&[&[]]);
        let view = FilteredView::all(&ds);
        assert_eq!(
            rate(&view, "Heard_Nobody"),
            Err(SurveyError::UnknownField("Heard_Nobody".into()))
        );
        assert!(matches!(
            rate(&view, fields::GENDER),
            Err(SurveyError::WrongFieldKind { .. })
        ));
        assert!(matches!(
            mean(&view, fields::GENDER),
            Err(SurveyError::WrongFieldKind { .. })
        ));
    }

    #[test]
    fn mean_skips_missing_values() {
        let ds = dataset(&[
            &[(fields::RATING, "5")],
            &[(fields::RATING, "2")],
            &[(fields::RATING, "")],
        ]);
        let view = FilteredView::all(&ds);
        assert_eq!(mean(&view, fields::RATING).unwrap(), Some(3.5));
    }

    #[test]
    fn group_mean_has_only_populated_groups() {
        let ds = dataset(&[
            &[(fields::FAMILIARITY, "High"), (fields::RATING, "5")],
            &[(fields::FAMILIARITY, "High"), (fields::RATING, "4")],
            &[(fields::FAMILIARITY, "Low"), (fields::RATING, "1")],
            &[(fields::FAMILIARITY, "None"), (fields::RATING, "")],
        ]);
        let view = FilteredView::all(&ds);
        let means = group_mean(&view, fields::FAMILIARITY, fields::RATING).unwrap();
        assert_eq!(means.len(), 2);
        assert_eq!(means[&FieldValue::from("High")], 4.5);
        assert_eq!(means[&FieldValue::from("Low")], 1.0);
        assert!(means.values().all(|v| v.is_finite()));
    }

    #[test]
    fn value_counts_and_shares() {
        let ds = dataset(&[
            &[(fields::RATING, "5")],
            &[(fields::RATING, "4")],
            &[(fields::RATING, "2")],
            &[(fields::RATING, "1")],
        ]);
        let view = FilteredView::all(&ds);
        let counts = value_counts(&view, fields::RATING).unwrap();
        assert_eq!(counts[&FieldValue::Integer(5)], 1);
        assert_eq!(share_at_least(&view, fields::RATING, 4.0).unwrap(), Some(50.0));
        assert_eq!(net_promoter(&view, fields::RATING).unwrap(), Some(0.0));
        assert_eq!(completion_rate(&view), Some(100.0));
    }

    #[test]
    fn composite_score_full_marks() {
        let weights = ScoreWeights::new([("a", 0.5), ("b", 0.5)]);
        let metrics = BTreeMap::from([("a".to_string(), 1.0), ("b".to_string(), 1.0)]);
        assert_eq!(composite_score(&weights, &metrics).unwrap(), 100.0);
    }

    #[test]
    fn composite_score_rejects_bad_configuration() {
        let metrics = BTreeMap::from([("a".to_string(), 1.0), ("b".to_string(), 1.0)]);

        let short = ScoreWeights::new([("a", 0.5), ("b", 0.4)]);
        assert!(matches!(
            composite_score(&short, &metrics),
            Err(SurveyError::InvalidWeights { .. })
        ));

        let unmatched = ScoreWeights::new([("a", 0.5), ("c", 0.5)]);
        assert_eq!(
            composite_score(&unmatched, &metrics),
            Err(SurveyError::MissingMetric("c".into()))
        );

        let weights = ScoreWeights::new([("a", 1.0)]);
        let too_big = BTreeMap::from([("a".to_string(), 1.5)]);
        assert!(matches!(
            composite_score(&weights, &too_big),
            Err(SurveyError::MetricOutOfRange { .. })
        ));
    }

    #[test]
    fn default_health_weights_are_valid() {
        assert!(ScoreWeights::default().validate().is_ok());
        let health = brand_health(100.0, 100.0, 5.0, &ScoreWeights::default()).unwrap();
        assert!((health - 100.0).abs() < 1e-9);
        let health = brand_health(50.0, 25.0, 4.0, &ScoreWeights::default()).unwrap();
        assert!((health - 49.0).abs() < 1e-9);
    }

    #[test]
    fn threat_score_bounds() {
        let w = ThreatWeights::default();
        assert_eq!(threat_score(0.0, 0.0, &w).unwrap(), 3.0);
        assert_eq!(threat_score(100.0, 100.0, &w).unwrap(), 10.0);
        assert!((threat_score(40.0, 20.0, &w).unwrap() - 5.1).abs() < 1e-9);
        assert!(threat_score(120.0, 0.0, &w).is_err());

        let skewed = ThreatWeights {
            usage: 0.7,
            awareness: 0.7,
        };
        assert!(matches!(
            threat_score(10.0, 10.0, &skewed),
            Err(SurveyError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn threat_levels() {
        assert_eq!(ThreatLevel::from_score(3.0), ThreatLevel::Low);
        assert_eq!(ThreatLevel::from_score(5.0), ThreatLevel::Medium);
        assert_eq!(ThreatLevel::from_score(9.5), ThreatLevel::High);
    }

    #[test]
    fn brand_snapshot_reads_brand_columns() {
        let ds = dataset(&[
            &[("Heard_Clinix", "true"), ("Used_Clinix", "true")],
            &[("Heard_Clinix", "true")],
            &[],
            &[],
        ]);
        let view = FilteredView::all(&ds);
        let snap = brand_snapshot(&view, "Clinix").unwrap();
        assert_eq!(snap.aware, 2);
        assert_eq!(snap.awareness, Some(50.0));
        assert_eq!(snap.usage, Some(25.0));
        assert_eq!(snap.market_position(), Some(37.5));
        assert_eq!(growth_potential(50.0, 25.0), 12.5);
    }
}
