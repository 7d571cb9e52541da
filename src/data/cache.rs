use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use super::loader::load_file;
use super::model::SurveyDataset;

/// Datasets kept when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 4;

/// Recently loaded datasets keyed by canonical path, so switching back to a
/// file does not parse it again. Holds at most `capacity` entries and drops
/// the least recently used one first. Datasets are immutable after loading
/// and shared by `Arc`, so an evicted dataset stays alive while still in use.
#[derive(Debug)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<SurveyDataset>>,
    /// Keys from least to most recently used.
    recency: VecDeque<PathBuf>,
    capacity: usize,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` datasets (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        DatasetCache {
            entries: HashMap::new(),
            recency: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Return the cached dataset for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path, brands: &[String]) -> Result<Arc<SurveyDataset>> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(dataset) = self.entries.get(&key).cloned() {
            log::debug!("Dataset cache hit for {}", key.display());
            self.touch(&key);
            return Ok(dataset);
        }

        let dataset = Arc::new(load_file(path, brands)?);
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.recency.pop_front() else {
                break;
            };
            log::debug!("Evicting cached dataset {}", oldest.display());
            self.entries.remove(&oldest);
        }
        self.entries.insert(key.clone(), Arc::clone(&dataset));
        self.recency.push_back(key);
        Ok(dataset)
    }

    fn touch(&mut self, key: &Path) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            if let Some(k) = self.recency.remove(pos) {
                self.recency.push_back(k);
            }
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn survey_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            "Age_Group,Occupation,Gender,Familiarity_with_SYNLAB,Familiarity_Score,\
SYNLAB_Rating_1_5,Likelihood_to_Recommend,Heard_SYNLAB,Used_SYNLAB\n\
35-44,Engineer,Male,Medium,2.0,3,4,true,true"
        )
        .expect("write fixture");
        file
    }

    #[test]
    fn second_load_reuses_the_parsed_dataset() {
        let file = survey_file();
        let brands = vec!["SYNLAB".to_string()];
        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(file.path(), &brands).expect("first load");
        let second = cache.get_or_load(file.path(), &brands).expect("second load");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn least_recently_used_dataset_is_evicted() {
        let (a, b, c) = (survey_file(), survey_file(), survey_file());
        let brands = vec!["SYNLAB".to_string()];
        let mut cache = DatasetCache::with_capacity(2);

        cache.get_or_load(a.path(), &brands).expect("load a");
        cache.get_or_load(b.path(), &brands).expect("load b");
        // Touching `a` leaves `b` as the oldest entry.
        cache.get_or_load(a.path(), &brands).expect("reload a");
        cache.get_or_load(c.path(), &brands).expect("load c");

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(a.path()));
        assert!(!cache.contains(b.path()));
        assert!(cache.contains(c.path()));
    }

    #[test]
    fn failed_load_is_not_cached() {
        let brands = vec!["SYNLAB".to_string()];
        let mut cache = DatasetCache::new();
        assert!(cache.get_or_load(Path::new("does/not/exist.csv"), &brands).is_err());
        assert!(cache.is_empty());
    }
}
