//! Page-level figures computed in one pass over a filtered view.
//!
//! [`DashboardSummary`] is the only thing the UI draws from, and it is what
//! `File → Export summary…` writes out as JSON.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::error::Result;

use super::fields;
use super::filter::FilteredView;
use super::metrics::{self, BrandSnapshot, ThreatLevel};
use super::model::{FieldValue, SurveyDataset};
use super::segment::{self, Segment, SegmentProfile};

/// How many occupations the segmentation page lists.
const TOP_OCCUPATIONS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

/// Headline KPIs and distributions for the home brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub home_brand: String,
    pub awareness: Option<f64>,
    pub usage: Option<f64>,
    pub avg_rating: Option<f64>,
    pub net_promoter: Option<f64>,
    /// Share of respondents answering 4 or 5 on the recommendation question.
    pub recommendation_rate: Option<f64>,
    pub avg_familiarity: Option<f64>,
    pub rating_distribution: Vec<LabeledCount>,
    pub rating_by_familiarity: Vec<LabeledValue>,
    pub age_groups: Vec<LabeledCount>,
    pub genders: Vec<LabeledCount>,
    pub occupations: Vec<LabeledCount>,
}

/// Quick-read figures for the executive page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub completion_rate: Option<f64>,
    /// Share of ratings at 4 or above.
    pub positive_sentiment: Option<f64>,
    pub recommendation_distribution: Vec<LabeledCount>,
    pub top_strength: Option<LabeledCount>,
    pub top_improvement: Option<LabeledCount>,
    /// Respondents aware of the strongest competitor.
    pub top_competitor: Option<LabeledCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub label: String,
    pub share: f64,
    pub profile: SegmentProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segmentation {
    /// Populated segments in `Segment` order.
    pub segments: Vec<SegmentSummary>,
    pub top_occupations: Vec<LabeledCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threat {
    pub brand: String,
    pub score: f64,
    pub level: ThreatLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Competition {
    /// Every tracked brand, home brand first.
    pub brands: Vec<BrandSnapshot>,
    /// Competitors only, highest score first.
    pub threats: Vec<Threat>,
    pub health_score: Option<f64>,
    /// Home-brand awareness minus the best competitor's awareness.
    pub awareness_gap: Option<f64>,
    pub market_position: Option<f64>,
    pub growth_potential: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strategy {
    /// Belief columns, most common first.
    pub strengths: Vec<LabeledCount>,
    /// Improvement columns, most requested first.
    pub improvements: Vec<LabeledCount>,
    pub satisfaction: Option<f64>,
}

/// Everything the dashboard pages display for one filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub respondents: usize,
    pub total_respondents: usize,
    pub overview: Overview,
    pub executive: ExecutiveSummary,
    pub segmentation: Segmentation,
    pub competition: Competition,
    pub strategy: Strategy,
}

impl DashboardSummary {
    pub fn compute(view: &FilteredView<'_>, config: &DashboardConfig) -> Result<Self> {
        let dataset = view.dataset();
        let overview = overview(view)?;
        let competition = competition(view, config, &overview)?;
        let strategy = strategy(view, &overview)?;
        let executive = executive(view, &competition, &strategy)?;
        let segmentation = segmentation(view)?;

        Ok(DashboardSummary {
            respondents: view.len(),
            total_respondents: dataset.len(),
            overview,
            executive,
            segmentation,
            competition,
            strategy,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json().context("serialising summary")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported summary to {}", path.display());
        Ok(())
    }
}

fn counts(view: &FilteredView<'_>, field: &str) -> Result<Vec<LabeledCount>> {
    Ok(metrics::value_counts(view, field)?
        .into_iter()
        .filter(|(value, _)| !value.is_missing())
        .map(|(value, count)| LabeledCount {
            label: value.to_string(),
            count,
        })
        .collect())
}

fn by_count_desc(mut items: Vec<LabeledCount>) -> Vec<LabeledCount> {
    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    items
}

fn home_brand(dataset: &SurveyDataset) -> &str {
    dataset.home_brand().unwrap_or(fields::DEFAULT_BRANDS[0])
}

fn overview(view: &FilteredView<'_>) -> Result<Overview> {
    let dataset = view.dataset();
    let brand = home_brand(dataset);
    let recommendation = dataset.recommendation_column.as_str();

    let rating_by_familiarity = metrics::group_mean(view, fields::FAMILIARITY, fields::RATING)?
        .into_iter()
        .filter(|(group, _)| !group.is_missing())
        .map(|(group, value)| LabeledValue {
            label: group.to_string(),
            value,
        })
        .collect();

    Ok(Overview {
        home_brand: brand.to_string(),
        awareness: metrics::rate(view, &fields::heard_column(brand))?,
        usage: metrics::rate(view, &fields::used_column(brand))?,
        avg_rating: metrics::mean(view, fields::RATING)?,
        net_promoter: metrics::net_promoter(view, recommendation)?,
        recommendation_rate: metrics::share_at_least(view, recommendation, 4.0)?,
        avg_familiarity: metrics::mean(view, fields::FAMILIARITY_SCORE)?,
        rating_distribution: counts(view, fields::RATING)?,
        rating_by_familiarity,
        age_groups: counts(view, fields::AGE_GROUP)?,
        genders: counts(view, fields::GENDER)?,
        occupations: by_count_desc(counts(view, fields::OCCUPATION)?),
    })
}

fn competition(
    view: &FilteredView<'_>,
    config: &DashboardConfig,
    overview: &Overview,
) -> Result<Competition> {
    let dataset = view.dataset();
    let brands = dataset
        .brands
        .iter()
        .map(|brand| metrics::brand_snapshot(view, brand))
        .collect::<Result<Vec<_>>>()?;

    let mut threats = Vec::new();
    for snap in brands.iter().skip(1) {
        if let (Some(awareness), Some(usage)) = (snap.awareness, snap.usage) {
            let score = metrics::threat_score(awareness, usage, &config.threat_weights)?;
            threats.push(Threat {
                brand: snap.brand.clone(),
                score,
                level: ThreatLevel::from_score(score),
            });
        }
    }
    threats.sort_by(|a, b| b.score.total_cmp(&a.score));

    let home = brands.first();
    let home_rates = home.and_then(|s| s.awareness.zip(s.usage));

    let health_score = match (home_rates, overview.avg_rating) {
        (Some((awareness, usage)), Some(rating)) => Some(metrics::brand_health(
            awareness,
            usage,
            rating,
            &config.health_weights,
        )?),
        _ => None,
    };

    let best_competitor = brands
        .iter()
        .skip(1)
        .filter_map(|s| s.awareness)
        .max_by(f64::total_cmp);
    let awareness_gap = home
        .and_then(|s| s.awareness)
        .zip(best_competitor)
        .map(|(own, theirs)| own - theirs);

    Ok(Competition {
        market_position: home.and_then(BrandSnapshot::market_position),
        growth_potential: home_rates.map(|(a, u)| metrics::growth_potential(a, u)),
        brands,
        threats,
        health_score,
        awareness_gap,
    })
}

fn flag_counts<'a>(
    view: &FilteredView<'_>,
    columns: impl Iterator<Item = &'a str>,
) -> Result<Vec<LabeledCount>> {
    let mut items = Vec::new();
    for column in columns {
        items.push(LabeledCount {
            label: fields::flag_label(column),
            count: metrics::count_true(view, column)?,
        });
    }
    Ok(by_count_desc(items))
}

fn strategy(view: &FilteredView<'_>, overview: &Overview) -> Result<Strategy> {
    let schema = &view.dataset().schema;
    let beliefs = schema
        .with_prefix(fields::BELIEF_PREFIX)
        .filter(|c| !c.contains("Others"));
    let improvements = schema
        .with_prefix(fields::IMPROVE_PREFIX)
        .filter(|c| !c.contains("None") && !c.contains("Others"));

    Ok(Strategy {
        strengths: flag_counts(view, beliefs)?,
        improvements: flag_counts(view, improvements)?,
        satisfaction: overview.avg_rating,
    })
}

fn executive(
    view: &FilteredView<'_>,
    competition: &Competition,
    strategy: &Strategy,
) -> Result<ExecutiveSummary> {
    let dataset = view.dataset();
    let top_competitor = competition
        .brands
        .iter()
        .skip(1)
        .max_by_key(|s| s.aware)
        .filter(|s| s.aware > 0)
        .map(|s| LabeledCount {
            label: s.brand.clone(),
            count: s.aware,
        });

    Ok(ExecutiveSummary {
        completion_rate: metrics::completion_rate(view),
        positive_sentiment: metrics::share_at_least(view, fields::RATING, 4.0)?,
        recommendation_distribution: counts(view, &dataset.recommendation_column)?,
        top_strength: strategy.strengths.first().filter(|c| c.count > 0).cloned(),
        top_improvement: strategy.improvements.first().filter(|c| c.count > 0).cloned(),
        top_competitor,
    })
}

fn segmentation(view: &FilteredView<'_>) -> Result<Segmentation> {
    let total = view.len();
    let segments = segment::segment_profiles(view)?
        .into_iter()
        .map(|(segment, profile)| SegmentSummary {
            segment,
            label: segment.label().to_string(),
            share: 100.0 * profile.count as f64 / total as f64,
            profile,
        })
        .collect();

    let mut top_occupations = by_count_desc(counts(view, fields::OCCUPATION)?);
    top_occupations.truncate(TOP_OCCUPATIONS);

    Ok(Segmentation {
        segments,
        top_occupations,
    })
}

/// Label a filter value for display, hiding the internal missing marker.
pub fn display_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Missing => "(no answer)".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterSelection, apply_filters};
    use crate::data::test_support::dataset;

    fn fixture() -> SurveyDataset {
        dataset(&[
            &[
                (fields::FAMILIARITY_SCORE, "3.0"),
                (fields::RATING, "5"),
                (fields::LIKELIHOOD_TO_RECOMMEND, "5"),
                ("Heard_SYNLAB", "true"),
                ("Used_SYNLAB", "true"),
                ("Heard_Clinix", "true"),
                ("Belief_Quality_Service", "true"),
                ("Improve_Result_Speed", "true"),
                ("Improve_None", "true"),
            ],
            &[
                (fields::GENDER, "Male"),
                (fields::RATING, "2"),
                ("Heard_SYNLAB", "true"),
                ("Heard_Clinix", "true"),
                ("Used_Clinix", "true"),
                ("Improve_Result_Speed", "true"),
            ],
        ])
    }

    #[test]
    fn summary_of_full_view() {
        let ds = fixture();
        let view = FilteredView::all(&ds);
        let summary = DashboardSummary::compute(&view, &DashboardConfig::default()).unwrap();

        assert_eq!(summary.respondents, 2);
        assert_eq!(summary.overview.awareness, Some(100.0));
        assert_eq!(summary.overview.usage, Some(50.0));
        assert_eq!(summary.overview.avg_rating, Some(3.5));
        assert_eq!(summary.overview.recommendation_rate, Some(50.0));

        let competition = &summary.competition;
        assert_eq!(competition.brands.len(), 2);
        assert_eq!(competition.threats.len(), 1);
        assert_eq!(competition.threats[0].brand, "Clinix");
        // awareness 100, usage 50 → 3 + 7 * 75 / 100
        assert!((competition.threats[0].score - 8.25).abs() < 1e-9);
        assert_eq!(competition.threats[0].level, ThreatLevel::High);
        assert_eq!(competition.awareness_gap, Some(0.0));
        // 0.3 * 1.0 + 0.4 * 0.5 + 0.3 * 0.7
        let health = competition.health_score.unwrap();
        assert!((health - 71.0).abs() < 1e-9);

        let improvements: Vec<&str> = summary
            .strategy
            .improvements
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(improvements, vec!["Result Speed"]);
        assert_eq!(
            summary.executive.top_improvement,
            Some(LabeledCount {
                label: "Result Speed".into(),
                count: 2
            })
        );

        let segments: Vec<Segment> = summary
            .segmentation
            .segments
            .iter()
            .map(|s| s.segment)
            .collect();
        assert_eq!(segments, vec![Segment::Champions, Segment::Prospects]);
        assert!(summary.to_json().unwrap().contains("\"Champions\""));
    }

    #[test]
    fn summary_of_empty_view_has_no_figures() {
        let ds = fixture();
        let selection = FilterSelection::unconstrained()
            .with(fields::GENDER, Vec::new())
            .unwrap();
        let view = apply_filters(&ds, &selection).unwrap();
        let summary = DashboardSummary::compute(&view, &DashboardConfig::default()).unwrap();

        assert_eq!(summary.respondents, 0);
        assert_eq!(summary.total_respondents, 2);
        assert_eq!(summary.overview.awareness, None);
        assert_eq!(summary.competition.health_score, None);
        assert!(summary.competition.threats.is_empty());
        assert!(summary.segmentation.segments.is_empty());
        assert_eq!(summary.executive.top_improvement, None);
    }
}
