use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::filter::{self, FilterState};
use crate::data::loader::{DataError, DatasetCache};
use crate::data::model::{CoercionPolicy, Dataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which view the main table shows: the fully interactive "ALL" view or a
/// precomputed named view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSelection {
    All,
    Named(String),
}

/// Resolved contents of the currently selected view for one render pass.
pub struct CurrentView {
    pub title: String,
    pub dataset: Arc<Dataset>,
    /// Indices into `dataset.records` passing the active filters.
    pub visible: Vec<usize>,
}

/// The full session state, independent of rendering. Exactly one instance
/// per session; the [`FilterState`] inside it is created with the session
/// and destroyed with it.
pub struct AppState {
    /// Path of the base dataset CSV.
    pub csv_path: PathBuf,
    /// Directory holding the generated named views.
    pub views_dir: PathBuf,

    pub policy: CoercionPolicy,
    pub cache: DatasetCache,

    /// Base dataset; `None` until the first successful load.
    pub base: Option<Arc<Dataset>>,
    /// Named views discovered in `views_dir`, sorted by name.
    pub ready_lists: Vec<String>,
    pub selection: ViewSelection,

    /// Per-column filter choices; survives view switches.
    pub filters: FilterState,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(csv_path: PathBuf, views_dir: PathBuf) -> Self {
        let mut state = AppState {
            csv_path,
            views_dir,
            policy: CoercionPolicy::default(),
            cache: DatasetCache::default(),
            base: None,
            ready_lists: Vec::new(),
            selection: ViewSelection::All,
            filters: FilterState::default(),
            status_message: None,
        };
        state.reload();
        state
    }

    /// (Re)load the base dataset and rescan the named-view directory. A
    /// missing base dataset is a distinct error, not "zero matches".
    pub fn reload(&mut self) {
        match self.cache.load(&self.csv_path, &self.policy) {
            Ok(dataset) => {
                log::info!(
                    "loaded {} players with {} columns",
                    dataset.len(),
                    dataset.column_names.len()
                );
                self.base = Some(dataset);
                self.status_message = None;
            }
            Err(e @ DataError::Missing(_)) => {
                self.base = None;
                self.status_message = Some(format!("Dataset not found: {e}"));
            }
            Err(e) => {
                log::error!("failed to load dataset: {e}");
                self.base = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.ready_lists = list_views(&self.views_dir);
    }

    /// Point the session at a different base dataset file.
    pub fn open_dataset(&mut self, path: PathBuf) {
        self.csv_path = path;
        self.reload();
    }

    /// Switch views. Deliberately leaves `filters` untouched: choices made
    /// on the ALL view persist across switches.
    pub fn select_view(&mut self, selection: ViewSelection) {
        self.selection = selection;
    }

    /// Resolve the selected view against the current filter state.
    ///
    /// "ALL" runs every interactive control over the base dataset. A named
    /// view loads its persisted records and reapplies only the reserved
    /// `overall`/`age` ranges.
    pub fn current_view(&mut self) -> CurrentView {
        match self.selection.clone() {
            ViewSelection::All => {
                let dataset = self
                    .base
                    .clone()
                    .unwrap_or_else(|| Arc::new(Dataset::empty()));
                let visible = filter::apply_controls(&dataset, &mut self.filters);
                CurrentView {
                    title: "ALL Players (Filtered by Custom Controls)".to_string(),
                    dataset,
                    visible,
                }
            }
            ViewSelection::Named(name) => {
                let path = self.views_dir.join(format!("{name}.json"));
                let dataset = self.cache.load_or_empty(&path, &self.policy);
                let visible = filter::apply_reserved_ranges(&dataset, &self.filters);
                CurrentView {
                    title: format!("Ready List: {}", display_name(&name)),
                    dataset,
                    visible,
                }
            }
        }
    }
}

/// Sorted stems of the `*.json` files in the views directory. An unreadable
/// directory is just an empty list.
pub fn list_views(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
                .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// `young_talents` → `Young Talents`, for buttons and headers.
pub fn display_name(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
