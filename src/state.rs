use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use log::{error, info};

use crate::config::ArchiveConfig;
use crate::data::analysis::{self, Platform};
use crate::data::dataset::{
    SpotifyDatasets, STREAMS_COLUMN, TOP_TRACKS_ARTIST_COLUMN, TRACK_COLUMN,
};
use crate::data::error::LoadError;
use crate::data::filter::{FilterState, filtered_indices, init_filter_state};
use crate::data::loader::TableSource;
use crate::data::model::{CellValue, ResultTable};
use crate::data::queries::SqlQuestion;

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Dashboard,
    Eda,
    Sql,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::Eda, Page::Sql];

    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Spotify Dashboard",
            Page::Eda => "Spotify EDA",
            Page::Sql => "Spotify SQL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardView {
    #[default]
    TopArtists,
    TopSongs,
    AudioFeatures,
}

impl DashboardView {
    pub const ALL: [DashboardView; 3] = [
        DashboardView::TopArtists,
        DashboardView::TopSongs,
        DashboardView::AudioFeatures,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DashboardView::TopArtists => "Top 10 Artists",
            DashboardView::TopSongs => "Top 10 Songs",
            DashboardView::AudioFeatures => "Audio Features",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdaView {
    #[default]
    Datasets,
    Statistics,
    Distributions,
}

impl EdaView {
    pub const ALL: [EdaView; 3] = [EdaView::Datasets, EdaView::Statistics, EdaView::Distributions];

    pub fn label(self) -> &'static str {
        match self {
            EdaView::Datasets => "Datasets",
            EdaView::Statistics => "Statistics",
            EdaView::Distributions => "Distributions",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub page: Page,
    pub dashboard_view: DashboardView,
    pub eda_view: EdaView,
    pub sql_question: SqlQuestion,

    /// Loaded tables (None until the first successful acquisition).
    pub datasets: Option<SpotifyDatasets>,

    /// Results of the fixed SQL questions, per question.
    pub sql_results: BTreeMap<SqlQuestion, ResultTable>,

    /// Artist picked on the Dashboard's top-tracks table.
    pub selected_artist: Option<CellValue>,

    /// Artists ticked on the EDA top-tracks table.
    pub eda_filters: FilterState,

    /// Track picked for the audio-feature radar.
    pub selected_track: Option<CellValue>,

    pub platform: Platform,

    /// Optional release-date window for the EDA dataset view.
    pub date_window: Option<(NaiveDate, NaiveDate)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set after a failed acquisition; cleared by [`AppState::request_reload`].
    /// Keeps the UI from re-running a failed load on every frame.
    pub load_failed: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            page: Page::default(),
            dashboard_view: DashboardView::default(),
            eda_view: EdaView::default(),
            sql_question: SqlQuestion::MultiArtistHits,
            datasets: None,
            sql_results: BTreeMap::new(),
            selected_artist: None,
            eda_filters: FilterState::new(),
            selected_track: None,
            platform: Platform::default(),
            date_window: None,
            status_message: None,
            load_failed: false,
        }
    }
}

impl AppState {
    /// Acquire the current page's data unless it is already present.
    ///
    /// `tables` serves the two dashboard tables, `queries` the SQL questions;
    /// they differ only in how empty results are treated.
    pub fn ensure_page_data(
        &mut self,
        tables: &impl TableSource,
        queries: &impl TableSource,
        archives: &ArchiveConfig,
    ) {
        if self.load_failed {
            return;
        }
        match self.page {
            Page::Dashboard | Page::Eda => self.ensure_datasets(tables, archives),
            Page::Sql => {
                let question = self.sql_question;
                self.ensure_sql_result(queries, &archives.spotify_data_url, question);
            }
        }
    }

    pub fn ensure_datasets(&mut self, source: &impl TableSource, archives: &ArchiveConfig) {
        if self.datasets.is_some() {
            return;
        }
        match SpotifyDatasets::load(source, archives) {
            Ok(datasets) => self.set_datasets(datasets),
            Err(err) => self.record_failure(&err),
        }
    }

    pub fn ensure_sql_result(&mut self, source: &impl TableSource, url: &str, question: SqlQuestion) {
        if self.sql_results.contains_key(&question) {
            return;
        }
        match source.load_via_query(url, question.sql()) {
            Ok(table) => {
                info!("{} answered with {} rows", question.label(), table.len());
                self.sql_results.insert(question, table);
                self.status_message = None;
            }
            Err(err) => self.record_failure(&err),
        }
    }

    fn record_failure(&mut self, err: &LoadError) {
        error!("Data acquisition failed: {err}");
        self.status_message = Some(err.user_message());
        self.load_failed = true;
    }

    /// Allow the next frame to attempt acquisition again.
    pub fn request_reload(&mut self) {
        self.load_failed = false;
        self.status_message = None;
    }

    /// Forget every loaded table so the next frame loads afresh.
    pub fn discard_data(&mut self) {
        self.datasets = None;
        self.sql_results.clear();
        self.request_reload();
    }

    /// Ingest newly loaded datasets and initialise selections.
    pub fn set_datasets(&mut self, datasets: SpotifyDatasets) {
        self.eda_filters = init_filter_state(&datasets.top_tracks, &[TOP_TRACKS_ARTIST_COLUMN]);
        self.selected_artist = datasets
            .top_tracks
            .unique_in_order(TOP_TRACKS_ARTIST_COLUMN)
            .into_iter()
            .next();
        self.selected_track = analysis::top_n_by(&datasets.spotify_2023, STREAMS_COLUMN, 10)
            .cell(0, TRACK_COLUMN)
            .cloned();

        self.datasets = Some(datasets);
        self.status_message = None;
        self.load_failed = false;
    }

    /// Top-tracks rows for the artist picked on the Dashboard.
    pub fn top_tracks_for_selected_artist(&self) -> Option<ResultTable> {
        let ds = self.datasets.as_ref()?;
        let artist = self.selected_artist.clone()?;
        let filters = FilterState::from([(
            TOP_TRACKS_ARTIST_COLUMN.to_string(),
            BTreeSet::from([artist]),
        )]);
        Some(ds.top_tracks.select_rows(&filtered_indices(&ds.top_tracks, &filters)))
    }

    /// Top-tracks rows for the artists ticked on the EDA page.
    pub fn top_tracks_for_eda_filters(&self) -> Option<ResultTable> {
        let ds = self.datasets.as_ref()?;
        Some(ds.top_tracks.select_rows(&filtered_indices(&ds.top_tracks, &self.eda_filters)))
    }

    /// Toggle a single artist in the EDA multi-select.
    pub fn toggle_eda_artist(&mut self, value: &CellValue) {
        let selected = self
            .eda_filters
            .entry(TOP_TRACKS_ARTIST_COLUMN.to_string())
            .or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
    }

    /// Select all artists in the EDA multi-select.
    pub fn select_all_artists(&mut self) {
        if let Some(ds) = &self.datasets {
            self.eda_filters.insert(
                TOP_TRACKS_ARTIST_COLUMN.to_string(),
                ds.top_tracks.unique_values(TOP_TRACKS_ARTIST_COLUMN),
            );
        }
    }

    /// Deselect all artists in the EDA multi-select.
    pub fn select_no_artists(&mut self) {
        self.eda_filters
            .insert(TOP_TRACKS_ARTIST_COLUMN.to_string(), BTreeSet::new());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::data::dataset::ARTIST_COLUMN;

    struct Canned {
        calls: Cell<u32>,
        fail: bool,
    }

    fn s(v: &str) -> CellValue {
        CellValue::String(v.into())
    }

    impl TableSource for Canned {
        fn load_named_tables(
            &self,
            _urls: &[String],
            _tables: &[String],
        ) -> Result<Vec<ResultTable>, LoadError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(LoadError::Network {
                    url: "https://example.invalid".into(),
                    reason: "dns".into(),
                });
            }
            let hits = ResultTable::new(
                vec![TRACK_COLUMN.into(), ARTIST_COLUMN.into(), STREAMS_COLUMN.into()],
                vec![
                    vec![s("Flowers"), s("Miley Cyrus"), CellValue::Integer(5)],
                    vec![s("Kill Bill"), s("SZA"), CellValue::Integer(9)],
                ],
            );
            let top = ResultTable::new(
                vec![TOP_TRACKS_ARTIST_COLUMN.into(), "Track Name".into()],
                vec![
                    vec![s("Taylor Swift"), s("Anti-Hero")],
                    vec![s("SZA"), s("Kill Bill")],
                    vec![s("Taylor Swift"), s("Lavender Haze")],
                ],
            );
            Ok(vec![hits, top])
        }

        fn load_via_query(&self, _url: &str, _query: &str) -> Result<ResultTable, LoadError> {
            self.calls.set(self.calls.get() + 1);
            Ok(ResultTable::default())
        }
    }

    #[test]
    fn datasets_initialise_selections() {
        let source = Canned { calls: Cell::new(0), fail: false };
        let mut state = AppState::default();
        state.ensure_page_data(&source, &source, &ArchiveConfig::default());
        state.ensure_page_data(&source, &source, &ArchiveConfig::default());

        assert_eq!(source.calls.get(), 1);
        assert_eq!(state.selected_artist, Some(s("Taylor Swift")));
        assert_eq!(state.selected_track, Some(s("Kill Bill")));
        assert_eq!(state.top_tracks_for_selected_artist().unwrap().len(), 2);
        assert_eq!(state.top_tracks_for_eda_filters().unwrap().len(), 3);

        state.toggle_eda_artist(&s("Taylor Swift"));
        assert_eq!(state.top_tracks_for_eda_filters().unwrap().len(), 1);
        state.select_no_artists();
        assert!(state.top_tracks_for_eda_filters().unwrap().is_empty());
        state.select_all_artists();
        assert_eq!(state.top_tracks_for_eda_filters().unwrap().len(), 3);
    }

    #[test]
    fn failed_load_waits_for_reload_request() {
        let source = Canned { calls: Cell::new(0), fail: true };
        let mut state = AppState::default();
        state.ensure_page_data(&source, &source, &ArchiveConfig::default());
        state.ensure_page_data(&source, &source, &ArchiveConfig::default());

        assert_eq!(source.calls.get(), 1);
        assert!(state.load_failed);
        assert!(state.status_message.as_deref().unwrap().contains("dns"));

        state.request_reload();
        state.ensure_page_data(&source, &source, &ArchiveConfig::default());
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn sql_results_are_kept_per_question() {
        let source = Canned { calls: Cell::new(0), fail: false };
        let mut state = AppState { page: Page::Sql, ..AppState::default() };
        state.ensure_page_data(&source, &source, &ArchiveConfig::default());
        state.ensure_page_data(&source, &source, &ArchiveConfig::default());
        assert_eq!(source.calls.get(), 1);
        assert!(state.sql_results.contains_key(&SqlQuestion::MultiArtistHits));

        state.sql_question = SqlQuestion::LoveSongs;
        state.ensure_page_data(&source, &source, &ArchiveConfig::default());
        assert_eq!(source.calls.get(), 2);
    }
}
