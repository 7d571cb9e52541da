//! Fixture builder shared by the unit tests of the data layer.

use std::collections::BTreeMap;

use super::fields;
use super::model::{FieldValue, Schema, SurveyDataset, SurveyRow};

const BASE: [(&str, &str); 11] = [
    (fields::AGE_GROUP, "25-34"),
    (fields::OCCUPATION, "Engineer"),
    (fields::GENDER, "Female"),
    (fields::FAMILIARITY, "Medium"),
    (fields::FAMILIARITY_SCORE, "2.0"),
    (fields::RATING, "3"),
    (fields::LIKELIHOOD_TO_RECOMMEND, "3"),
    ("Heard_SYNLAB", "false"),
    ("Used_SYNLAB", "false"),
    ("Heard_Clinix", "false"),
    ("Used_Clinix", "false"),
];

/// Build a two-brand dataset (SYNLAB, Clinix) where each row overrides the
/// neutral `BASE` answers with its own `(column, raw text)` pairs.
pub(crate) fn dataset(rows: &[&[(&str, &str)]]) -> SurveyDataset {
    let mut columns: Vec<String> = BASE.iter().map(|(c, _)| c.to_string()).collect();
    let rows: Vec<SurveyRow> = rows
        .iter()
        .map(|overrides| {
            let mut values: BTreeMap<String, FieldValue> = BASE
                .iter()
                .map(|(c, v)| (c.to_string(), FieldValue::Text(v.to_string())))
                .collect();
            for (c, v) in overrides.iter() {
                if !columns.iter().any(|existing| existing == c) {
                    columns.push(c.to_string());
                }
                values.insert(c.to_string(), FieldValue::Text(v.to_string()));
            }
            SurveyRow::new(values)
        })
        .collect();
    let brands = vec!["SYNLAB".to_string(), "Clinix".to_string()];
    SurveyDataset::from_rows(Schema::from_columns(columns), rows, &brands).expect("fixture dataset")
}
