use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Result, SurveyError};

use super::fields;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of the survey table
// ---------------------------------------------------------------------------

/// A dynamically-typed survey cell.
///
/// Cells key the filter allow-lists (`BTreeSet<FieldValue>`), so equality,
/// ordering and hashing all follow one total order: floats compare by
/// `f64::total_cmp`, which keeps `NaN` equal to itself and `-0.0` apart from `0.0`.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Missing,
}

impl FieldValue {
    /// Sort position of the variant: missing first, text last.
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Missing => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Integer(_) => 2,
            FieldValue::Float(_) => 3,
            FieldValue::Text(_) => 4,
        }
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.total_cmp(b),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            FieldValue::Text(s) => s.hash(state),
            FieldValue::Integer(i) => i.hash(state),
            // total_cmp equality is bit equality
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Missing => {}
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.2}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Missing => write!(f, "<missing>"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl FieldValue {
    /// Interpret the value as an `f64` for numeric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Best-effort typing of a raw text cell (CSV input).
    pub fn infer(s: &str) -> FieldValue {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("nan") {
            return FieldValue::Missing;
        }
        if let Ok(i) = s.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return FieldValue::Float(f);
        }
        if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
            return FieldValue::Bool(s.eq_ignore_ascii_case("true"));
        }
        FieldValue::Text(s.to_string())
    }

    /// Coerce a raw value into the shape required by `kind`.
    ///
    /// `row` and `column` only feed the error message.
    pub fn coerce(self, kind: FieldKind, row: usize, column: &str) -> Result<FieldValue> {
        let invalid = |value: &FieldValue, reason: &str| SurveyError::InvalidValue {
            row,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        // Text cells are only interpreted once the column kind is known, so a
        // categorical answer such as "1.5" or "True" survives verbatim.
        let value = match (kind, self) {
            (FieldKind::Categorical, FieldValue::Text(s)) if s.trim().is_empty() => {
                FieldValue::Missing
            }
            (FieldKind::Categorical, FieldValue::Text(s)) => FieldValue::Text(s.trim().to_string()),
            (_, FieldValue::Text(s)) => FieldValue::infer(&s),
            (_, other) => other,
        };

        if value.is_missing() {
            return Ok(value);
        }

        match kind {
            FieldKind::Inferred => Ok(value),
            FieldKind::Categorical => Ok(match value {
                FieldValue::Text(s) => FieldValue::Text(s),
                other => FieldValue::Text(other.to_string()),
            }),
            FieldKind::Flag => match value {
                FieldValue::Bool(b) => Ok(FieldValue::Bool(b)),
                FieldValue::Integer(0) => Ok(FieldValue::Bool(false)),
                FieldValue::Integer(1) => Ok(FieldValue::Bool(true)),
                FieldValue::Text(ref s) => match s.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "y" => Ok(FieldValue::Bool(true)),
                    "false" | "no" | "n" => Ok(FieldValue::Bool(false)),
                    _ => Err(invalid(&value, "is not a boolean")),
                },
                ref other => Err(invalid(other, "is not a boolean")),
            },
            FieldKind::Rating => {
                let rating = match &value {
                    FieldValue::Integer(i) => Some(*i),
                    FieldValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
                    _ => None,
                };
                match rating {
                    Some(r) if (RATING_MIN..=RATING_MAX).contains(&r) => {
                        Ok(FieldValue::Integer(r))
                    }
                    Some(_) => Err(invalid(&value, "is outside the 1-5 rating scale")),
                    None => Err(invalid(&value, "is not an integer rating")),
                }
            }
            FieldKind::Score => match value.as_f64() {
                Some(v) if (SCORE_MIN..=SCORE_MAX).contains(&v) => Ok(FieldValue::Float(v)),
                Some(_) => Err(invalid(&value, "is outside the 1.0-3.0 score range")),
                None => Err(invalid(&value, "is not a number")),
            },
        }
    }
}

pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;
pub const SCORE_MIN: f64 = 1.0;
pub const SCORE_MAX: f64 = 3.0;

// ---------------------------------------------------------------------------
// FieldKind / Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text used for grouping and filtering.
    Categorical,
    /// Yes/no answer.
    Flag,
    /// Integer on the 1–5 scale.
    Rating,
    /// Float in 1.0–3.0.
    Score,
    /// Any other column, typed per cell.
    Inferred,
}

impl FieldKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Rating | FieldKind::Score | FieldKind::Inferred)
    }
}

/// Column names in file order plus the kind each was coerced to.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub columns: Vec<String>,
    kinds: BTreeMap<String, FieldKind>,
}

impl Schema {
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let kinds = columns
            .iter()
            .map(|c| (c.clone(), fields::kind_of(c)))
            .collect();
        Schema { columns, kinds }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.kinds.contains_key(field)
    }

    /// Kind of `field`, or `UnknownField` when the column does not exist.
    pub fn kind(&self, field: &str) -> Result<FieldKind> {
        self.kinds
            .get(field)
            .copied()
            .ok_or_else(|| SurveyError::UnknownField(field.to_string()))
    }

    /// Columns whose name starts with `prefix`, in file order.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .filter(move |c| c.starts_with(prefix))
    }
}

// ---------------------------------------------------------------------------
// SurveyRow – one respondent
// ---------------------------------------------------------------------------

/// A single survey response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyRow {
    /// column_name → value.
    pub values: BTreeMap<String, FieldValue>,
}

impl SurveyRow {
    pub fn new(values: BTreeMap<String, FieldValue>) -> Self {
        SurveyRow { values }
    }

    /// Value of `field`; an absent cell reads as `Missing`.
    pub fn get(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&FieldValue::Missing)
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.get(field).as_bool()
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).as_f64()
    }
}

// ---------------------------------------------------------------------------
// SurveyDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed survey with pre-computed column indices.
#[derive(Debug, Clone)]
pub struct SurveyDataset {
    /// All responses in file order.
    pub rows: Vec<SurveyRow>,
    pub schema: Schema,
    /// For each filterable column the sorted set of observed values.
    pub unique_values: BTreeMap<String, BTreeSet<FieldValue>>,
    /// Tracked brands; the first one is the home brand.
    pub brands: Vec<String>,
    /// Column holding the 1–5 recommendation answer.
    pub recommendation_column: String,
}

impl SurveyDataset {
    /// Validate the column contract, coerce every cell and build the indices.
    pub fn from_rows(schema: Schema, raw_rows: Vec<SurveyRow>, brands: &[String]) -> Result<Self> {
        for column in fields::REQUIRED {
            if !schema.contains(column) {
                return Err(SurveyError::MissingColumn(column.to_string()));
            }
        }
        for brand in brands {
            for column in [fields::heard_column(brand), fields::used_column(brand)] {
                if !schema.contains(&column) {
                    return Err(SurveyError::MissingColumn(column));
                }
            }
        }
        let recommendation_column = fields::RECOMMENDATION_COLUMNS
            .iter()
            .find(|c| schema.contains(c))
            .map(|c| c.to_string())
            .ok_or_else(|| SurveyError::MissingColumn(fields::LIKELIHOOD_TO_RECOMMEND.to_string()))?;

        let mut rows = Vec::with_capacity(raw_rows.len());
        for (row_no, raw) in raw_rows.into_iter().enumerate() {
            let mut values = BTreeMap::new();
            for (column, value) in raw.values {
                let kind = schema.kind(&column)?;
                values.insert(column.clone(), value.coerce(kind, row_no, &column)?);
            }
            rows.push(SurveyRow { values });
        }

        let mut unique_values: BTreeMap<String, BTreeSet<FieldValue>> = BTreeMap::new();
        for row in &rows {
            for column in fields::FILTERABLE {
                unique_values
                    .entry(column.to_string())
                    .or_default()
                    .insert(row.get(column).clone());
            }
        }

        Ok(SurveyDataset {
            rows,
            schema,
            unique_values,
            brands: brands.to_vec(),
            recommendation_column,
        })
    }

    /// Number of responses.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn home_brand(&self) -> Option<&str> {
        self.brands.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_types_text_cells() {
        assert_eq!(FieldValue::infer("4"), FieldValue::Integer(4));
        assert_eq!(FieldValue::infer("2.75"), FieldValue::Float(2.75));
        assert_eq!(FieldValue::infer("True"), FieldValue::Bool(true));
        assert_eq!(FieldValue::infer(""), FieldValue::Missing);
        assert_eq!(FieldValue::infer("18-24"), FieldValue::Text("18-24".into()));
    }

    #[test]
    fn equality_agrees_with_set_membership() {
        let nan = FieldValue::Float(f64::NAN);
        assert_eq!(nan, nan.clone());

        let zero = FieldValue::Float(0.0);
        let neg_zero = FieldValue::Float(-0.0);
        assert_ne!(zero, neg_zero);

        let set: BTreeSet<FieldValue> = [nan.clone(), zero.clone(), neg_zero.clone(), nan.clone()]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&FieldValue::Float(f64::NAN)));
        assert!(FieldValue::Missing < FieldValue::Bool(false));
        assert!(FieldValue::Integer(9) < FieldValue::from("a"));
    }

    #[test]
    fn coerce_flag_accepts_common_spellings() {
        let c = |v: FieldValue| v.coerce(FieldKind::Flag, 0, "Heard_SYNLAB");
        assert_eq!(c(FieldValue::Integer(1)), Ok(FieldValue::Bool(true)));
        assert_eq!(c(FieldValue::Text("No".into())), Ok(FieldValue::Bool(false)));
        assert!(c(FieldValue::Integer(2)).is_err());
    }

    #[test]
    fn coerce_rating_enforces_scale() {
        let c = |v: FieldValue| v.coerce(FieldKind::Rating, 3, fields::RATING);
        assert_eq!(c(FieldValue::Float(4.0)), Ok(FieldValue::Integer(4)));
        assert!(matches!(
            c(FieldValue::Integer(6)),
            Err(SurveyError::InvalidValue { row: 3, .. })
        ));
        assert!(c(FieldValue::Float(3.5)).is_err());
    }

    #[test]
    fn coerce_score_enforces_range() {
        let c = |v: FieldValue| v.coerce(FieldKind::Score, 0, fields::FAMILIARITY_SCORE);
        assert_eq!(c(FieldValue::Integer(3)), Ok(FieldValue::Float(3.0)));
        assert!(c(FieldValue::Float(0.5)).is_err());
    }

    #[test]
    fn text_cells_are_typed_by_kind() {
        let text = |s: &str| FieldValue::Text(s.to_string());
        assert_eq!(
            text("True").coerce(FieldKind::Categorical, 0, fields::FAMILIARITY),
            Ok(text("True"))
        );
        assert_eq!(
            text("4").coerce(FieldKind::Rating, 0, fields::RATING),
            Ok(FieldValue::Integer(4))
        );
        assert_eq!(
            text(" ").coerce(FieldKind::Categorical, 0, fields::GENDER),
            Ok(FieldValue::Missing)
        );
    }

    #[test]
    fn categorical_numbers_become_text() {
        let v = FieldValue::Integer(25).coerce(FieldKind::Categorical, 0, fields::AGE_GROUP);
        assert_eq!(v, Ok(FieldValue::Text("25".into())));
    }

    #[test]
    fn missing_recommendation_column_is_rejected() {
        let schema = Schema::from_columns(fields::REQUIRED);
        let err = SurveyDataset::from_rows(schema, Vec::new(), &[]).unwrap_err();
        assert_eq!(
            err,
            SurveyError::MissingColumn(fields::LIKELIHOOD_TO_RECOMMEND.to_string())
        );
    }

    #[test]
    fn missing_brand_column_is_rejected() {
        let mut columns: Vec<&str> = fields::REQUIRED.to_vec();
        columns.push(fields::RECOMMENDATION_SCORE);
        columns.push("Heard_Clinix");
        let schema = Schema::from_columns(columns);
        let err = SurveyDataset::from_rows(schema, Vec::new(), &["Clinix".to_string()]).unwrap_err();
        assert_eq!(err, SurveyError::MissingColumn("Used_Clinix".to_string()));
    }
}
