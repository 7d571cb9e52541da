//! Rule-based customer segmentation of the home brand's respondents.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::Result;

use super::fields;
use super::filter::FilteredView;
use super::model::SurveyRow;

/// Familiarity score at or above which a respondent counts as familiar.
pub const FAMILIAR_THRESHOLD: f64 = 2.5;
/// Rating at or above which a familiar user counts as satisfied.
pub const SATISFIED_RATING: i64 = 4;

/// Mutually exclusive customer segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Segment {
    Champions,
    AtRisk,
    NewUsers,
    Prospects,
    Others,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::Champions,
        Segment::AtRisk,
        Segment::NewUsers,
        Segment::Prospects,
        Segment::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::AtRisk => "At Risk",
            Segment::NewUsers => "New Users",
            Segment::Prospects => "Prospects",
            Segment::Others => "Others",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Segment::Champions => "Familiar, satisfied users",
            Segment::AtRisk => "Familiar users rating below 4",
            Segment::NewUsers => "Users still getting to know the brand",
            Segment::Prospects => "Aware but never used",
            Segment::Others => "Unaware or unclassified",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The four answers the cascade looks at. `None` is a missing answer: it
/// satisfies neither side of any comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentInputs {
    pub familiarity_score: Option<f64>,
    pub rating: Option<i64>,
    pub used: Option<bool>,
    pub heard: Option<bool>,
}

impl SegmentInputs {
    /// Read the inputs for `brand` from a row.
    pub fn from_row(row: &SurveyRow, brand: &str) -> Self {
        SegmentInputs {
            familiarity_score: row.number(fields::FAMILIARITY_SCORE),
            rating: row.get(fields::RATING).as_i64(),
            used: row.flag(&fields::used_column(brand)),
            heard: row.flag(&fields::heard_column(brand)),
        }
    }

    /// First matching rule wins; `Others` when none match.
    pub fn classify(&self) -> Segment {
        let familiar = self.familiarity_score.map(|s| s >= FAMILIAR_THRESHOLD);
        let satisfied = self.rating.map(|r| r >= SATISFIED_RATING);

        match (familiar, satisfied, self.used, self.heard) {
            (Some(true), Some(true), Some(true), _) => Segment::Champions,
            (Some(true), Some(false), Some(true), _) => Segment::AtRisk,
            (Some(false), _, Some(true), _) => Segment::NewUsers,
            (Some(false), _, Some(false), Some(true)) => Segment::Prospects,
            _ => Segment::Others,
        }
    }
}

/// Segment of a single respondent with respect to `brand`.
pub fn classify(row: &SurveyRow, brand: &str) -> Segment {
    SegmentInputs::from_row(row, brand).classify()
}

fn home_brand<'a>(view: &FilteredView<'a>) -> &'a str {
    view.dataset().home_brand().unwrap_or(fields::DEFAULT_BRANDS[0])
}

/// One label per row of the view, in view order.
pub fn segment_view(view: &FilteredView<'_>) -> Vec<Segment> {
    let brand = home_brand(view);
    view.rows().map(|row| classify(row, brand)).collect()
}

/// Number of rows per segment; segments with no rows are absent.
pub fn segment_counts(view: &FilteredView<'_>) -> BTreeMap<Segment, usize> {
    let mut counts = BTreeMap::new();
    for segment in segment_view(view) {
        *counts.entry(segment).or_insert(0) += 1;
    }
    counts
}

/// Average answers of the respondents in one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentProfile {
    pub count: usize,
    pub avg_rating: Option<f64>,
    pub avg_recommendation: Option<f64>,
    pub avg_labs_used: Option<f64>,
    pub avg_familiarity: Option<f64>,
}

#[derive(Default)]
struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.n += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

/// Per-segment averages of rating, recommendation, labs used and familiarity.
/// `Total_Labs_Used` is optional; without it `avg_labs_used` stays `None`.
pub fn segment_profiles(view: &FilteredView<'_>) -> Result<BTreeMap<Segment, SegmentProfile>> {
    let dataset = view.dataset();
    let recommendation = dataset.recommendation_column.as_str();
    dataset.schema.kind(recommendation)?;
    let labs = dataset
        .schema
        .contains(fields::TOTAL_LABS_USED)
        .then_some(fields::TOTAL_LABS_USED);

    let brand = home_brand(view);
    let mut acc: BTreeMap<Segment, (usize, [Mean; 4])> = BTreeMap::new();
    for row in view.rows() {
        let (count, means) = acc.entry(classify(row, brand)).or_default();
        *count += 1;
        means[0].push(row.number(fields::RATING));
        means[1].push(row.number(recommendation));
        means[2].push(labs.and_then(|c| row.number(c)));
        means[3].push(row.number(fields::FAMILIARITY_SCORE));
    }

    Ok(acc
        .into_iter()
        .map(|(segment, (count, means))| {
            let profile = SegmentProfile {
                count,
                avg_rating: means[0].value(),
                avg_recommendation: means[1].value(),
                avg_labs_used: means[2].value(),
                avg_familiarity: means[3].value(),
            };
            (segment, profile)
        })
        .collect())
}
