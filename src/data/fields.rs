//! Column-name contract shared by the loader and every downstream computation.

use super::model::FieldKind;

pub const AGE_GROUP: &str = "Age_Group";
pub const OCCUPATION: &str = "Occupation";
pub const GENDER: &str = "Gender";
pub const FAMILIARITY: &str = "Familiarity_with_SYNLAB";

pub const FAMILIARITY_SCORE: &str = "Familiarity_Score";
pub const RATING: &str = "SYNLAB_Rating_1_5";
pub const LIKELIHOOD_TO_RECOMMEND: &str = "Likelihood_to_Recommend";
pub const RECOMMENDATION_SCORE: &str = "Recommendation_Score";
pub const TOTAL_LABS_USED: &str = "Total_Labs_Used";

pub const HEARD_PREFIX: &str = "Heard_";
pub const USED_PREFIX: &str = "Used_";
pub const BELIEF_PREFIX: &str = "Belief_";
pub const IMPROVE_PREFIX: &str = "Improve_";

/// The four demographic columns exposed as dashboard filters.
pub const FILTERABLE: [&str; 4] = [AGE_GROUP, OCCUPATION, GENDER, FAMILIARITY];

/// Columns that must exist regardless of which brands are tracked.
pub const REQUIRED: [&str; 6] = [
    AGE_GROUP,
    OCCUPATION,
    GENDER,
    FAMILIARITY,
    FAMILIARITY_SCORE,
    RATING,
];

/// Recommendation columns in order of preference.
pub const RECOMMENDATION_COLUMNS: [&str; 2] = [LIKELIHOOD_TO_RECOMMEND, RECOMMENDATION_SCORE];

pub const DEFAULT_BRANDS: [&str; 5] = ["SYNLAB", "Clinix", "Mecure", "Clina Lancet", "Afriglobal"];

pub fn is_filterable(field: &str) -> bool {
    FILTERABLE.contains(&field)
}

/// `Heard_<Brand>` with spaces turned into underscores.
pub fn heard_column(brand: &str) -> String {
    format!("{HEARD_PREFIX}{}", brand.replace(' ', "_"))
}

/// `Used_<Brand>` with spaces turned into underscores.
pub fn used_column(brand: &str) -> String {
    format!("{USED_PREFIX}{}", brand.replace(' ', "_"))
}

/// Kind a column is coerced to at load time, decided purely from its name.
pub fn kind_of(column: &str) -> FieldKind {
    if FILTERABLE.contains(&column) {
        FieldKind::Categorical
    } else if column == FAMILIARITY_SCORE {
        FieldKind::Score
    } else if column == RATING || RECOMMENDATION_COLUMNS.contains(&column) {
        FieldKind::Rating
    } else if [HEARD_PREFIX, USED_PREFIX, BELIEF_PREFIX, IMPROVE_PREFIX]
        .iter()
        .any(|p| column.starts_with(p))
    {
        FieldKind::Flag
    } else {
        FieldKind::Inferred
    }
}

/// Human label for a belief/improvement column: `Improve_Result_Speed` → `Result Speed`.
pub fn flag_label(column: &str) -> String {
    column
        .strip_prefix(BELIEF_PREFIX)
        .or_else(|| column.strip_prefix(IMPROVE_PREFIX))
        .unwrap_or(column)
        .replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_columns_replace_spaces() {
        assert_eq!(heard_column("Clina Lancet"), "Heard_Clina_Lancet");
        assert_eq!(used_column("SYNLAB"), "Used_SYNLAB");
    }

    #[test]
    fn kinds_follow_column_names() {
        assert_eq!(kind_of(GENDER), FieldKind::Categorical);
        assert_eq!(kind_of("Heard_Mecure"), FieldKind::Flag);
        assert_eq!(kind_of("Belief_Technology"), FieldKind::Flag);
        assert_eq!(kind_of(RATING), FieldKind::Rating);
        assert_eq!(kind_of(RECOMMENDATION_SCORE), FieldKind::Rating);
        assert_eq!(kind_of(FAMILIARITY_SCORE), FieldKind::Score);
        assert_eq!(kind_of(TOTAL_LABS_USED), FieldKind::Inferred);
    }

    #[test]
    fn flag_labels_drop_prefix() {
        assert_eq!(flag_label("Improve_Result_Speed"), "Result Speed");
        assert_eq!(flag_label("Belief_Quality_Service"), "Quality Service");
    }
}
