use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use crate::error::SurveyError;

use super::model::{FieldValue, Schema, SurveyDataset, SurveyRow};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a survey table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – one header row, one respondent per line (the survey export)
/// * `.json`    – `[{ "Age_Group": "18-24", "Heard_SYNLAB": true, ... }, ...]`
/// * `.parquet` – flat columns, one per survey field
///
/// `brands` lists the tracked brands whose `Heard_*` / `Used_*` columns must exist.
pub fn load_file(path: &Path, brands: &[String]) -> Result<SurveyDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (schema, rows) = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(SurveyError::UnsupportedFormat(other.to_string()).into()),
    };

    let dataset = SurveyDataset::from_rows(schema, rows, brands)
        .with_context(|| format!("validating {}", path.display()))?;

    log::info!(
        "Loaded {} responses with {} columns from {}",
        dataset.len(),
        dataset.schema.columns.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the exact survey column names, then one
/// response per record. Cells stay raw text until coerced to their column kind.
fn read_csv(path: &Path) -> Result<(Schema, Vec<SurveyRow>)> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, found {}",
                headers.len(),
                record.len()
            );
        }

        let values: BTreeMap<String, FieldValue> = headers
            .iter()
            .zip(record.iter())
            .map(|(col, cell)| (col.clone(), FieldValue::Text(cell.to_string())))
            .collect();

        rows.push(SurveyRow::new(values));
    }

    Ok((Schema::from_columns(headers), rows))
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Age_Group": "25-34", "Gender": "Female", "Heard_SYNLAB": true, "SYNLAB_Rating_1_5": 4 },
///   ...
/// ]
/// ```
///
/// Columns are collected in first-seen order; a key absent from a record reads as missing.
fn read_json(path: &Path) -> Result<(Schema, Vec<SurveyRow>)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut values = BTreeMap::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            values.insert(key.clone(), json_to_value(val));
        }

        rows.push(SurveyRow::new(values));
    }

    Ok((Schema::from_columns(columns), rows))
}

fn json_to_value(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Missing,
        other => FieldValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per survey field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), as well as by `generate_sample`.
/// Categorical (dictionary-encoded) and narrow numeric columns are cast to
/// one of `Utf8`, `Int64`, `Float64` or `Boolean` before reading cells.
fn read_parquet(path: &Path) -> Result<(Schema, Vec<SurveyRow>)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let arrays = columns
            .iter()
            .zip(batch.columns())
            .map(|(name, col)| normalize_column(name, col))
            .collect::<Result<Vec<ArrayRef>>>()?;

        for row in 0..batch.num_rows() {
            let mut values = BTreeMap::new();
            for (name, col) in columns.iter().zip(&arrays) {
                let value = extract_value(col, row).with_context(|| {
                    format!("reading parquet column '{name}' at row {}", rows.len())
                })?;
                values.insert(name.clone(), value);
            }
            rows.push(SurveyRow::new(values));
        }
    }

    Ok((Schema::from_columns(columns), rows))
}

/// Arrow type a column is read as, or `None` when it has no cell form.
fn read_type(data_type: &DataType) -> Option<DataType> {
    match data_type {
        DataType::Null => Some(DataType::Null),
        DataType::Boolean => Some(DataType::Boolean),
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(DataType::Utf8),
        DataType::Decimal128(..) | DataType::Decimal256(..) => Some(DataType::Float64),
        DataType::Dictionary(_, values) => read_type(values),
        t if t.is_integer() => Some(DataType::Int64),
        t if t.is_floating() => Some(DataType::Float64),
        _ => None,
    }
}

fn normalize_column(name: &str, col: &ArrayRef) -> Result<ArrayRef> {
    let source = col.data_type();
    let target = read_type(source).ok_or_else(|| SurveyError::UnsupportedColumnType {
        column: name.to_string(),
        data_type: source.to_string(),
    })?;
    if source == &target {
        return Ok(Arc::clone(col));
    }
    cast(col, &target)
        .with_context(|| format!("converting parquet column '{name}' from {source} to {target}"))
}

/// Read one cell of a column already passed through [`normalize_column`].
fn extract_value(col: &ArrayRef, row: usize) -> Option<FieldValue> {
    if col.is_null(row) {
        return Some(FieldValue::Missing);
    }
    let value = match col.data_type() {
        DataType::Null => FieldValue::Missing,
        DataType::Utf8 => FieldValue::Text(col.as_string_opt::<i32>()?.value(row).to_string()),
        DataType::Int64 => FieldValue::Integer(col.as_primitive_opt::<Int64Type>()?.value(row)),
        DataType::Float64 => FieldValue::Float(col.as_primitive_opt::<Float64Type>()?.value(row)),
        DataType::Boolean => FieldValue::Bool(col.as_boolean_opt()?.value(row)),
        _ => return None,
    };
    Some(value)
}
