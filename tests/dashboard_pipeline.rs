use std::collections::BTreeMap;
use std::io::Write;

use survey_lens::data::fields;
use survey_lens::data::filter::{FilterSelection, FilteredView, apply_filters};
use survey_lens::data::loader::load_file;
use survey_lens::data::metrics::{self, ScoreWeights, composite_score};
use survey_lens::data::model::{FieldValue, SurveyDataset};
use survey_lens::data::report::DashboardSummary;
use survey_lens::data::segment::{Segment, SegmentInputs, segment_counts};
use survey_lens::{DashboardConfig, SurveyError};

const FIXTURE: &str = "\
Age_Group,Occupation,Gender,Familiarity_with_SYNLAB,Familiarity_Score,SYNLAB_Rating_1_5,Likelihood_to_Recommend,Heard_SYNLAB,Used_SYNLAB,Heard_Clinix,Used_Clinix
18-24,Student,Female,High,3.0,5,5,True,True,True,False
25-34,Nurse,Male,Low,1.0,2,1,False,False,True,True
25-34,Engineer,Female,Medium,2.0,3,4,False,False,False,False
35-44,Doctor,Female,High,2.5,2,2,True,True,True,False
";

fn brands() -> Vec<String> {
    vec!["SYNLAB".to_string(), "Clinix".to_string()]
}

fn load_fixture() -> SurveyDataset {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp file");
    file.write_all(FIXTURE.as_bytes()).expect("write fixture");
    load_file(file.path(), &brands()).expect("load fixture")
}

#[test]
fn female_filter_and_heard_rate() {
    let dataset = load_fixture();
    let selection = FilterSelection::unconstrained()
        .with(fields::GENDER, [FieldValue::from("Female")])
        .expect("gender is filterable");
    let view = apply_filters(&dataset, &selection).expect("filter");

    assert_eq!(view.indices(), &[0, 2, 3]);
    assert!(
        view.rows()
            .all(|r| r.get(fields::GENDER) == &FieldValue::from("Female"))
    );

    // Two of the three women have heard of SYNLAB.
    let heard = metrics::rate(&view, "Heard_SYNLAB").expect("flag column");
    let expected = 100.0 * 2.0 / 3.0;
    assert!((heard.expect("non-empty view") - expected).abs() < 1e-9);
}

#[test]
fn selecting_everything_keeps_every_row() {
    let dataset = load_fixture();
    let selection = FilterSelection::all_selected(&dataset);
    let view = apply_filters(&dataset, &selection).expect("filter");
    assert_eq!(view, FilteredView::all(&dataset));
    assert_eq!(view.len(), dataset.len());
}

#[test]
fn filters_combine_across_columns() {
    let dataset = load_fixture();
    let selection = FilterSelection::unconstrained()
        .with(fields::GENDER, [FieldValue::from("Female")])
        .and_then(|s| {
            s.with(
                fields::FAMILIARITY,
                [FieldValue::from("High"), FieldValue::from("Low")],
            )
        })
        .expect("filterable columns");
    let view = apply_filters(&dataset, &selection).expect("filter");
    assert_eq!(view.indices(), &[0, 3]);

    let empty = FilterSelection::unconstrained()
        .with(fields::AGE_GROUP, Vec::<FieldValue>::new())
        .expect("age is filterable");
    let view = apply_filters(&dataset, &empty).expect("filter");
    assert!(view.is_empty());
    assert_eq!(metrics::rate(&view, "Heard_SYNLAB"), Ok(None));
}

#[test]
fn segment_boundaries() {
    let never_heard = SegmentInputs {
        familiarity_score: Some(1.0),
        rating: Some(1),
        used: Some(false),
        heard: Some(false),
    };
    assert_eq!(never_heard.classify(), Segment::Others);

    let champion = SegmentInputs {
        familiarity_score: Some(2.5),
        rating: Some(4),
        used: Some(true),
        heard: Some(true),
    };
    assert_eq!(champion.classify(), Segment::Champions);

    let at_risk = SegmentInputs {
        rating: Some(3),
        ..champion
    };
    assert_eq!(at_risk.classify(), Segment::AtRisk);

    // Familiar but never used fits no named rule.
    let familiar_non_user = SegmentInputs {
        used: Some(false),
        ..champion
    };
    assert_eq!(familiar_non_user.classify(), Segment::Others);
}

#[test]
fn fixture_segments_cover_every_row() {
    let dataset = load_fixture();
    let view = FilteredView::all(&dataset);
    let counts = segment_counts(&view);

    assert_eq!(counts.values().sum::<usize>(), dataset.len());
    assert_eq!(counts.get(&Segment::Champions), Some(&1));
    assert_eq!(counts.get(&Segment::AtRisk), Some(&1));
    assert_eq!(counts.get(&Segment::Others), Some(&2));
}

#[test]
fn composite_score_properties() {
    let weights = ScoreWeights::default();
    let metrics_at = |v: f64| -> BTreeMap<String, f64> {
        [metrics::AWARENESS, metrics::USAGE, metrics::QUALITY]
            .iter()
            .map(|k| (k.to_string(), v))
            .collect()
    };

    assert!(composite_score(&weights, &metrics_at(0.0)).expect("valid").abs() < 1e-9);
    assert!((composite_score(&weights, &metrics_at(1.0)).expect("valid") - 100.0).abs() < 1e-9);

    let low = composite_score(&weights, &metrics_at(0.4)).expect("valid");
    let high = composite_score(&weights, &metrics_at(0.6)).expect("valid");
    assert!(low < high);

    let lopsided = ScoreWeights::new([(metrics::AWARENESS, 0.7), (metrics::USAGE, 0.7)]);
    assert!(matches!(
        composite_score(&lopsided, &metrics_at(0.5)),
        Err(SurveyError::InvalidWeights { .. })
    ));
}

#[test]
fn summary_exports_as_json() {
    let dataset = load_fixture();
    let view = FilteredView::all(&dataset);
    let config = DashboardConfig {
        brands: brands(),
        ..DashboardConfig::default()
    };
    let summary = DashboardSummary::compute(&view, &config).expect("summary");
    assert_eq!(summary.respondents, 4);

    let out = tempfile::tempdir().expect("temp dir");
    let path = out.path().join("summary.json");
    summary.write_json(&path).expect("export");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read back")).expect("json");
    assert_eq!(json["respondents"], 4);
}
