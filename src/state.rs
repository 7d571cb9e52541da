use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use survey_lens::data::cache::DatasetCache;
use survey_lens::data::filter::{FilterSelection, apply_filters};
use survey_lens::data::model::{FieldValue, SurveyDataset};
use survey_lens::data::report::DashboardSummary;
use survey_lens::DashboardConfig;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    Executive,
    Segmentation,
    Competition,
    Strategy,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Overview,
        Page::Executive,
        Page::Segmentation,
        Page::Competition,
        Page::Strategy,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Executive => "Executive Summary",
            Page::Segmentation => "Customer Segmentation",
            Page::Competition => "Competitive Intelligence",
            Page::Strategy => "Strategic Analytics",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    cache: DatasetCache,

    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Arc<SurveyDataset>>,

    /// Per-column filter selections.
    pub selection: FilterSelection,

    /// Indices of responses passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Figures for every page under the current filters.
    pub summary: Option<DashboardSummary>,

    pub page: Page,

    /// One colour per tracked brand.
    pub brand_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pub show_raw_data: bool,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let brand_colors = ColorMap::new(config.brands.iter().cloned());
        Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
            selection: FilterSelection::unconstrained(),
            visible_indices: Vec::new(),
            summary: None,
            page: Page::default(),
            brand_colors,
            status_message: None,
            show_raw_data: false,
        }
    }

    /// Load the configured dataset. Failure here is fatal for the process.
    pub fn load_startup_dataset(&mut self) -> Result<()> {
        let path = self.config.data_path.clone();
        let dataset = self.cache.get_or_load(&path, &self.config.brands)?;
        self.set_dataset(dataset);
        Ok(())
    }

    /// Switch to another file; errors are reported in the status bar and the
    /// current dataset stays active.
    pub fn open_file(&mut self, path: &Path) {
        match self.cache.get_or_load(path, &self.config.brands) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the filters.
    pub fn set_dataset(&mut self, dataset: Arc<SurveyDataset>) {
        self.selection = FilterSelection::all_selected(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the visible rows and every page figure after a filter change.
    /// On failure nothing from the previous selection is left on screen.
    pub fn refilter(&mut self) {
        let Some(dataset) = self.dataset.clone() else {
            return;
        };
        let result = apply_filters(&dataset, &self.selection).and_then(|view| {
            let summary = DashboardSummary::compute(&view, &self.config)?;
            Ok((view.indices().to_vec(), summary))
        });
        match result {
            Ok((indices, summary)) => {
                self.visible_indices = indices;
                self.summary = Some(summary);
            }
            Err(e) => {
                log::error!("Recomputing dashboard failed: {e}");
                self.visible_indices.clear();
                self.summary = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &FieldValue) {
        if let Err(e) = self.selection.toggle(column, value) {
            log::error!("{e}");
            self.status_message = Some(format!("Error: {e}"));
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        let Some(all_vals) = self
            .dataset
            .as_ref()
            .and_then(|ds| ds.unique_values.get(column).cloned())
        else {
            return;
        };
        if let Err(e) = self.selection.restrict(column, all_vals) {
            self.status_message = Some(format!("Error: {e}"));
        }
        self.refilter();
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        if let Err(e) = self.selection.restrict(column, Vec::new()) {
            self.status_message = Some(format!("Error: {e}"));
        }
        self.refilter();
    }

    /// Back to every value selected in every column.
    pub fn reset_filters(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection = FilterSelection::all_selected(ds);
        }
        self.refilter();
    }

    pub fn export_summary(&mut self, path: &Path) {
        let Some(summary) = &self.summary else {
            return;
        };
        match summary.write_json(path) {
            Ok(()) => self.status_message = Some(format!("Exported {}", path.display())),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
