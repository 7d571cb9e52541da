use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use survey_lens::data::fields;

const RESPONDENTS: usize = 500;
const DEFAULT_OUTPUT: &str = "data/survey_responses.csv";

const AGE_GROUPS: [&str; 5] = ["18-24", "25-34", "35-44", "45-54", "55+"];
const OCCUPATIONS: [&str; 10] = [
    "Student",
    "Engineer",
    "Nurse",
    "Doctor",
    "Lecturer",
    "Trader",
    "Banker",
    "Civil Servant",
    "Self-employed",
    "Unemployed",
];
const GENDERS: [&str; 2] = ["Female", "Male"];
const FAMILIARITY: [(&str, f64); 3] = [("Low", 1.0), ("Medium", 2.0), ("High", 3.0)];
const BELIEFS: [&str; 4] = ["Quality_Service", "Technology", "Accuracy", "Others"];
const IMPROVEMENTS: [&str; 5] = [
    "Result_Speed",
    "Access_Facility",
    "Pricing",
    "None",
    "Others",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }
}

/// Column-oriented survey table, kept in the loader's column order.
struct SurveyTable {
    text: Vec<(String, Vec<String>)>,
    floats: Vec<(String, Vec<f64>)>,
    ints: Vec<(String, Vec<i64>)>,
    flags: Vec<(String, Vec<bool>)>,
}

fn column<T>(columns: &mut Vec<(String, Vec<T>)>, name: &str) -> usize {
    columns.push((name.to_string(), Vec::with_capacity(RESPONDENTS)));
    columns.len() - 1
}

fn generate(rng: &mut SimpleRng) -> SurveyTable {
    let mut t = SurveyTable {
        text: Vec::new(),
        floats: Vec::new(),
        ints: Vec::new(),
        flags: Vec::new(),
    };
    let age = column(&mut t.text, fields::AGE_GROUP);
    let occupation = column(&mut t.text, fields::OCCUPATION);
    let gender = column(&mut t.text, fields::GENDER);
    let familiarity = column(&mut t.text, fields::FAMILIARITY);
    let score = column(&mut t.floats, fields::FAMILIARITY_SCORE);
    let rating = column(&mut t.ints, fields::RATING);
    let recommend = column(&mut t.ints, fields::LIKELIHOOD_TO_RECOMMEND);
    let labs = column(&mut t.ints, fields::TOTAL_LABS_USED);

    let brand_cols: Vec<(usize, usize)> = fields::DEFAULT_BRANDS
        .iter()
        .map(|b| {
            (
                column(&mut t.flags, &fields::heard_column(b)),
                column(&mut t.flags, &fields::used_column(b)),
            )
        })
        .collect();
    let belief_cols: Vec<usize> = BELIEFS
        .iter()
        .map(|b| column(&mut t.flags, &format!("{}{b}", fields::BELIEF_PREFIX)))
        .collect();
    let improve_cols: Vec<usize> = IMPROVEMENTS
        .iter()
        .map(|i| column(&mut t.flags, &format!("{}{i}", fields::IMPROVE_PREFIX)))
        .collect();

    for _ in 0..RESPONDENTS {
        t.text[age].1.push(rng.pick(&AGE_GROUPS).to_string());
        t.text[occupation].1.push(rng.pick(&OCCUPATIONS).to_string());
        t.text[gender].1.push(rng.pick(&GENDERS).to_string());

        let &(level, base) = rng.pick(&FAMILIARITY);
        t.text[familiarity].1.push(level.to_string());
        let jitter = (rng.next_f64() - 0.5) * 0.8;
        let fam_score = ((base + jitter).clamp(1.0, 3.0) * 10.0).round() / 10.0;
        t.floats[score].1.push(fam_score);

        // Familiar respondents rate and recommend a little higher.
        let lift = if fam_score > 2.0 { 1 } else { 0 };
        let r = (rng.range(1, 4) + lift).min(5);
        t.ints[rating].1.push(r);
        t.ints[recommend].1.push((r + rng.range(-1, 1)).clamp(1, 5));

        let mut used_count = 0;
        for (i, &(heard_col, used_col)) in brand_cols.iter().enumerate() {
            let awareness = if i == 0 { 0.85 } else { 0.65 - 0.1 * i as f64 };
            let heard = rng.chance(awareness);
            let used = heard && rng.chance(0.55);
            used_count += i64::from(used);
            t.flags[heard_col].1.push(heard);
            t.flags[used_col].1.push(used);
        }
        t.ints[labs].1.push(used_count);

        for &col in &belief_cols {
            let held = rng.chance(0.35);
            t.flags[col].1.push(held);
        }
        for &col in &improve_cols {
            let wanted = rng.chance(0.3);
            t.flags[col].1.push(wanted);
        }
    }
    t
}

impl SurveyTable {
    fn names(&self) -> Vec<&str> {
        self.text
            .iter()
            .map(|(n, _)| n.as_str())
            .chain(self.floats.iter().map(|(n, _)| n.as_str()))
            .chain(self.ints.iter().map(|(n, _)| n.as_str()))
            .chain(self.flags.iter().map(|(n, _)| n.as_str()))
            .collect()
    }

    fn row(&self, i: usize) -> Vec<String> {
        self.text
            .iter()
            .map(|(_, v)| v[i].clone())
            .chain(self.floats.iter().map(|(_, v)| format!("{:.1}", v[i])))
            .chain(self.ints.iter().map(|(_, v)| v[i].to_string()))
            .chain(
                self.flags
                    .iter()
                    .map(|(_, v)| if v[i] { "True" } else { "False" }.to_string()),
            )
            .collect()
    }

    fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        writer.write_record(self.names())?;
        for i in 0..RESPONDENTS {
            writer.write_record(self.row(i))?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_parquet(&self, path: &Path) -> Result<()> {
        let mut schema_fields = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for (name, values) in &self.text {
            schema_fields.push(Field::new(name, DataType::Utf8, false));
            arrays.push(Arc::new(StringArray::from(values.clone())));
        }
        for (name, values) in &self.floats {
            schema_fields.push(Field::new(name, DataType::Float64, false));
            arrays.push(Arc::new(Float64Array::from(values.clone())));
        }
        for (name, values) in &self.ints {
            schema_fields.push(Field::new(name, DataType::Int64, false));
            arrays.push(Arc::new(Int64Array::from(values.clone())));
        }
        for (name, values) in &self.flags {
            schema_fields.push(Field::new(name, DataType::Boolean, false));
            arrays.push(Arc::new(BooleanArray::from(values.clone())));
        }

        let schema = Arc::new(Schema::new(schema_fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays)
            .context("Failed to create RecordBatch")?;

        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT), PathBuf::from);
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);
    let table = generate(&mut rng);

    let ext = output
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("csv") => table.write_csv(&output)?,
        Some("parquet" | "pq") => table.write_parquet(&output)?,
        other => bail!("unsupported output format: {other:?} (use .csv or .parquet)"),
    }

    println!(
        "Wrote {RESPONDENTS} survey responses ({} columns) to {}",
        table.names().len(),
        output.display()
    );
    Ok(())
}
