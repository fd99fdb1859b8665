use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::data::analysis::{self, Platform};
use crate::data::dataset::{
    ARTIST_COLUMN, AUDIO_FEATURES, COLUMN_DESCRIPTIONS, RELEASE_DATE_COLUMN, STREAMS_COLUMN,
    TRACK_COLUMN,
};
use crate::data::filter::within_dates;
use crate::data::model::{CellValue, ResultTable};
use crate::state::{AppState, DashboardView, EdaView, Page};
use crate::ui::plot;
use crate::ui::table::{TableView, description_list, result_table};

const HISTOGRAM_BINS: usize = 30;

// ---------------------------------------------------------------------------
// Central panel dispatch
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.page {
            Page::Dashboard => dashboard_page(ui, state),
            Page::Eda => eda_page(ui, state),
            Page::Sql => sql_page(ui, state),
        });
}

fn waiting(ui: &mut Ui, state: &AppState) {
    ui.centered_and_justified(|ui: &mut Ui| {
        if state.load_failed {
            ui.heading("Loading failed. Use Retry in the top bar.");
        } else {
            ui.spinner();
        }
    });
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn dashboard_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Spotify Data Visualization");
    let Some(ds) = state.datasets.as_ref() else {
        waiting(ui, state);
        return;
    };

    match state.dashboard_view {
        DashboardView::TopArtists => {
            ui.label(RichText::new("Top 10 Artists Having Most Hits In 2023").strong());
            let counts: Vec<(CellValue, f64)> = analysis::value_counts(&ds.spotify_2023, ARTIST_COLUMN)
                .into_iter()
                .take(10)
                .map(|(artist, n)| (artist, n as f64))
                .collect();
            plot::labelled_bars(ui, "top_artists", &counts, "Number of Hits", false);

            ui.add_space(8.0);
            ui.label(
                RichText::new("Top Tracks of Top 10 Artists Having Most Hits In 2023").strong(),
            );
            if let Some(tracks) = state.top_tracks_for_selected_artist() {
                result_table(ui, &mut state.status_message, &tracks, TableView::new("artist_top_tracks"));
            }
        }
        DashboardView::TopSongs => {
            ui.label(RichText::new("Top 10 Streamed Songs in 2023").strong());
            let top = analysis::top_n_by(&ds.spotify_2023, STREAMS_COLUMN, 10);
            plot::labelled_bars(
                ui,
                "top_songs",
                &series(&top, TRACK_COLUMN, STREAMS_COLUMN),
                "Streams",
                true,
            );

            ui.add_space(8.0);
            let platform = state.platform;
            let title = match platform {
                Platform::Spotify => "Top 10 Songs on Spotify Based on Presence in Playlists/Charts",
                Platform::Apple => {
                    "Top 10 Songs on Apple Music Based on Presence in Playlists/Charts"
                }
            };
            ui.label(RichText::new(title).strong());
            let ranked = analysis::platform_top(&ds.spotify_2023, platform, 10);
            if ranked.is_empty() {
                ui.label(format!("No {} presence columns in this dataset.", platform.label()));
            } else {
                plot::labelled_bars(
                    ui,
                    "platform_top",
                    &series(&ranked, TRACK_COLUMN, &platform.total_column()),
                    "Total Presence",
                    true,
                );
                result_table(ui, &mut state.status_message, &ranked, TableView::new("platform_top").numbered());
            }
        }
        DashboardView::AudioFeatures => {
            ui.label(RichText::new("Relationship Between All Audio Features").strong());
            let matrix = analysis::correlation_matrix(&ds.spotify_2023, &AUDIO_FEATURES);
            plot::heatmap(ui, &matrix);

            ui.add_space(8.0);
            ui.label(
                RichText::new("Audio Feature Radar of Top 10 Streamed Songs in 2023").strong(),
            );
            let Some(track) = state.selected_track.as_ref().map(|t| t.to_string()) else {
                return;
            };
            let top = analysis::top_n_by(&ds.spotify_2023, STREAMS_COLUMN, 10)
                .project(&[TRACK_COLUMN, ARTIST_COLUMN, RELEASE_DATE_COLUMN]);
            let rows: Vec<usize> = (0..top.len())
                .filter(|&i| top.cell(i, TRACK_COLUMN).and_then(CellValue::as_str) == Some(track.as_str()))
                .collect();
            result_table(
                ui,
                &mut state.status_message,
                &top.select_rows(&rows),
                TableView::new("selected_track").max_height(60.0),
            );

            let profile = analysis::feature_profile(&ds.spotify_2023, &track, &AUDIO_FEATURES);
            plot::radar(ui, "feature_radar", &format!("Audio Feature Radar of {track}"), &profile);
        }
    }
}

/// (label, value) pairs for a bar chart.
fn series(table: &ResultTable, label: &str, value: &str) -> Vec<(CellValue, f64)> {
    let (Some(labels), Some(values)) = (table.column(label), table.column(value)) else {
        return Vec::new();
    };
    labels
        .zip(values)
        .map(|(l, v)| (l.clone(), v.as_f64().unwrap_or(0.0)))
        .collect()
}

// ---------------------------------------------------------------------------
// EDA
// ---------------------------------------------------------------------------

fn eda_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Spotify Exploratory Data Analysis");
    let Some(ds) = state.datasets.as_ref() else {
        waiting(ui, state);
        return;
    };

    match state.eda_view {
        EdaView::Datasets => eda_datasets(ui, state),
        EdaView::Statistics => {
            ui.label(RichText::new("Numeric Variable Summary").strong());
            let numeric = analysis::describe_numeric(&ds.spotify_2023);
            result_table(ui, &mut state.status_message, &numeric, TableView::new("numeric_summary"));

            ui.add_space(8.0);
            ui.label(RichText::new("Non-Numeric Variable Summary").strong());
            let other = analysis::describe_non_numeric(&ds.spotify_2023);
            result_table(ui, &mut state.status_message, &other, TableView::new("non_numeric_summary"));
        }
        EdaView::Distributions => {
            ui.label(RichText::new("Distribution of Percentage Features").strong());
            for feature in AUDIO_FEATURES {
                ui.label(format!("Distribution of {feature}"));
                let values = analysis::numeric_values(&ds.spotify_2023, feature);
                let bins = analysis::histogram(&values, HISTOGRAM_BINS);
                plot::histogram(ui, &format!("hist_{feature}"), feature, &bins);
            }
        }
    }
}

fn eda_datasets(ui: &mut Ui, state: &mut AppState) {
    let Some(ds) = state.datasets.as_ref() else {
        return;
    };
    ui.label(RichText::new("Spotify Data for 2023").strong());
    let (from, to) = state.date_window.map_or((None, None), |(f, t)| (Some(f), Some(t)));
    let rows = within_dates(&ds.spotify_2023, RELEASE_DATE_COLUMN, from, to);
    let shown = ds.spotify_2023.select_rows(&rows);
    result_table(ui, &mut state.status_message, &shown, TableView::new("spotify_2023").max_height(400.0));

    ui.add_space(8.0);
    ui.label(RichText::new("Information about Spotify Data for 2023").strong());
    let info = analysis::column_info(&ds.spotify_2023);
    result_table(ui, &mut state.status_message, &info, TableView::new("column_info"));

    ui.add_space(8.0);
    egui::CollapsingHeader::new(RichText::new("Column Descriptions").strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| description_list(ui, COLUMN_DESCRIPTIONS));

    ui.add_space(8.0);
    ui.label(RichText::new("Top Tracks of Top 10 Artists Having Most Hits In 2023").strong());
    if let Some(tracks) = state.top_tracks_for_eda_filters() {
        result_table(ui, &mut state.status_message, &tracks, TableView::new("eda_top_tracks"));
    }
}

// ---------------------------------------------------------------------------
// SQL
// ---------------------------------------------------------------------------

fn sql_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading("SQL Project: Spotify Songs 2023");
    let question = state.sql_question;
    ui.label(RichText::new(question.prompt()).strong());
    ui.add_space(4.0);
    ui.code(question.sql());
    ui.add_space(8.0);

    let Some(result) = state.sql_results.get(&question) else {
        waiting(ui, state);
        return;
    };

    ui.label("Answer:");
    result_table(ui, &mut state.status_message, result, TableView::new(question.label()).numbered());
    if let Some(answer) = question.answer(result) {
        ui.label(RichText::new(format!("Answer: {answer}")).strong());
    }
}
