use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::analysis::{self, Platform};
use crate::data::dataset::{
    SpotifyDatasets, RELEASE_DATE_COLUMN, STREAMS_COLUMN, TOP_TRACKS_ARTIST_COLUMN, TRACK_COLUMN,
};
use crate::data::normalize::parse_date;
use crate::data::queries::SqlQuestion;
use crate::state::{AppState, DashboardView, EdaView, Page};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Data action requested from the top bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataAction {
    /// Forget everything loaded and fetch afresh.
    Reload,
    /// Try the failed acquisition again, keeping what already loaded.
    Retry,
}

/// Render the page switcher and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) -> Option<DataAction> {
    let mut action = None;
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Data", |ui: &mut Ui| {
            if ui.button("Reload data").clicked() {
                action = Some(DataAction::Reload);
                ui.close_menu();
            }
        });

        ui.separator();

        for page in Page::ALL {
            ui.selectable_value(&mut state.page, page, page.label());
        }

        ui.separator();

        if let Some(ds) = &state.datasets {
            ui.label(format!(
                "{} hits, {} top tracks loaded",
                ds.spotify_2023.len(),
                ds.top_tracks.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        if state.load_failed && ui.button("Retry").clicked() {
            action = Some(DataAction::Retry);
        }
    });
    action
}

// ---------------------------------------------------------------------------
// Left side panel – view and selection widgets
// ---------------------------------------------------------------------------

/// Render the left panel for the active page.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.page.label());
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.page {
            Page::Dashboard => dashboard_controls(ui, state),
            Page::Eda => eda_controls(ui, state),
            Page::Sql => sql_controls(ui, state),
        });
}

fn dashboard_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("View");
    for view in DashboardView::ALL {
        ui.radio_value(&mut state.dashboard_view, view, view.label());
    }
    ui.separator();

    let Some(ds) = &state.datasets else {
        ui.label("No dataset loaded.");
        return;
    };

    match state.dashboard_view {
        DashboardView::TopArtists => {
            ui.strong("Select an Artist");
            let artists = ds.top_tracks.unique_in_order(TOP_TRACKS_ARTIST_COLUMN);
            let current = state
                .selected_artist
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            egui::ComboBox::from_id_salt("artist_select")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    for artist in artists {
                        let label = artist.to_string();
                        ui.selectable_value(&mut state.selected_artist, Some(artist), label);
                    }
                });
        }
        DashboardView::TopSongs => {
            ui.strong("Platform");
            for platform in Platform::ALL {
                ui.radio_value(&mut state.platform, platform, platform.label());
            }
        }
        DashboardView::AudioFeatures => {
            ui.strong("Select a Song");
            let top = analysis::top_n_by(&ds.spotify_2023, STREAMS_COLUMN, 10);
            let tracks = top.unique_in_order(TRACK_COLUMN);
            let current = state
                .selected_track
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            egui::ComboBox::from_id_salt("track_select")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    for track in tracks {
                        let label = track.to_string();
                        ui.selectable_value(&mut state.selected_track, Some(track), label);
                    }
                });
        }
    }
}

fn eda_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("View");
    for view in EdaView::ALL {
        ui.radio_value(&mut state.eda_view, view, view.label());
    }
    ui.separator();

    let Some(ds) = &state.datasets else {
        ui.label("No dataset loaded.");
        return;
    };
    if state.eda_view != EdaView::Datasets {
        return;
    }

    // ---- Release-date window ----
    let mut enabled = state.date_window.is_some();
    if ui.checkbox(&mut enabled, "Limit release dates").changed() {
        state.date_window = enabled.then(|| release_date_bounds(ds));
    }
    if let Some((from, to)) = &mut state.date_window {
        ui.horizontal(|ui: &mut Ui| {
            ui.label("From");
            ui.add(DatePickerButton::new(from).id_salt("release_from"));
        });
        ui.horizontal(|ui: &mut Ui| {
            ui.label("To");
            ui.add(DatePickerButton::new(to).id_salt("release_to"));
        });
    }
    ui.separator();

    // ---- Artist multi-select (collapsible) ----
    let artists = ds.top_tracks.unique_in_order(TOP_TRACKS_ARTIST_COLUMN);
    let n_total = artists.len();
    let n_selected = state
        .eda_filters
        .get(TOP_TRACKS_ARTIST_COLUMN)
        .map_or(n_total, |s| s.len());
    let header_text = format!("Artist Name  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("eda_artists")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_artists();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_artists();
                }
            });

            for artist in &artists {
                // No entry yet means nothing has been narrowed down.
                let mut checked = state
                    .eda_filters
                    .get(TOP_TRACKS_ARTIST_COLUMN)
                    .map_or(true, |set| set.contains(artist));
                if ui.checkbox(&mut checked, artist.to_string()).changed() {
                    state.toggle_eda_artist(artist);
                }
            }
        });
}

fn sql_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Question");
    for question in SqlQuestion::ALL {
        ui.radio_value(&mut state.sql_question, question, question.label());
    }
}

/// Earliest and latest release dates in the hits table, falling back to 2023.
fn release_date_bounds(ds: &SpotifyDatasets) -> (NaiveDate, NaiveDate) {
    let dates: Vec<NaiveDate> = ds
        .spotify_2023
        .column(RELEASE_DATE_COLUMN)
        .map(|cells| cells.filter_map(|c| c.as_str().and_then(parse_date)).collect())
        .unwrap_or_default();
    let fallback_from = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    let from = dates.iter().min().copied().unwrap_or(fallback_from);
    let to = dates
        .iter()
        .max()
        .copied()
        .unwrap_or_else(|| from.with_year(from.year() + 1).unwrap_or(from));
    (from, to)
}
