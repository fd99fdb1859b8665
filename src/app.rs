use std::sync::Arc;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::data::cache::QueryCache;
use crate::data::fetch::ArchiveFetcher;
use crate::data::loader::Loader;
use crate::data::retry::{EmptyResultPolicy, Retrying, RetryPolicy};
use crate::state::AppState;
use crate::ui::panels::{self, DataAction};
use crate::ui::pages;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    config: DashboardConfig,
    loader: Loader<ArchiveFetcher>,
    /// The dashboard cannot render without rows, so empty tables are retried.
    tables_policy: RetryPolicy,
    /// A fixed question may legitimately have no answer rows.
    queries_policy: RetryPolicy,
}

impl DashboardApp {
    pub fn new(config: DashboardConfig) -> Self {
        let loader = Loader::new(
            ArchiveFetcher::new(&config.fetch_options()),
            Arc::new(QueryCache::new()),
            config.staging_options(),
        );
        let policy = config.retry_policy();
        Self {
            state: AppState::default(),
            tables_policy: policy.clone().with_empty_policy(EmptyResultPolicy::Retry),
            queries_policy: policy.with_empty_policy(EmptyResultPolicy::Accept),
            loader,
            config,
        }
    }

    /// Both actions drop memoized results so the next attempt fetches again.
    fn apply(&mut self, action: DataAction) {
        self.loader.cache().clear();
        match action {
            DataAction::Reload => self.state.discard_data(),
            DataAction::Retry => self.state.request_reload(),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        {
            let tables = Retrying::new(&self.loader, self.tables_policy.clone());
            let queries = Retrying::new(&self.loader, self.queries_policy.clone());
            self.state
                .ensure_page_data(&tables, &queries, &self.config.archives);
        }

        // ---- Top panel: page switcher + status ----
        let mut action = None;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            action = panels::top_bar(ui, &mut self.state);
        });
        if let Some(action) = action {
            self.apply(action);
        }

        // ---- Left side panel: view + selection widgets ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts and tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            pages::central_panel(ui, &mut self.state);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cache::CacheKey;
    use crate::data::model::{CellValue, ResultTable};

    fn cached_app() -> DashboardApp {
        let app = DashboardApp::new(DashboardConfig::default());
        app.loader.cache().insert(
            CacheKey::Query {
                url: "https://example.invalid/a.sqlite".into(),
                query: "SELECT 1".into(),
            },
            vec![ResultTable::new(vec!["n".into()], vec![vec![CellValue::Integer(1)]])],
        );
        app
    }

    #[test]
    fn retry_clears_cache_and_keeps_loaded_results() {
        let mut app = cached_app();
        app.state.sql_results.insert(
            crate::data::queries::SqlQuestion::LoveSongs,
            ResultTable::default(),
        );
        app.state.load_failed = true;

        app.apply(DataAction::Retry);

        assert!(app.loader.cache().is_empty());
        assert!(!app.state.load_failed);
        assert_eq!(app.state.sql_results.len(), 1);
    }

    #[test]
    fn reload_discards_everything() {
        let mut app = cached_app();
        app.state.sql_results.insert(
            crate::data::queries::SqlQuestion::LoveSongs,
            ResultTable::default(),
        );

        app.apply(DataAction::Reload);

        assert!(app.loader.cache().is_empty());
        assert!(app.state.sql_results.is_empty());
    }
}
