use log::info;

use super::error::LoadError;
use super::loader::TableSource;
use super::model::ResultTable;
use crate::config::ArchiveConfig;

pub const ARTIST_COLUMN: &str = "artist(s)_name";
pub const TRACK_COLUMN: &str = "track_name";
pub const STREAMS_COLUMN: &str = "streams";
pub const RELEASE_DATE_COLUMN: &str = super::normalize::RELEASE_DATE_COLUMN;

/// Artist column of the top-tracks table.
pub const TOP_TRACKS_ARTIST_COLUMN: &str = "Artist Name";

pub const AUDIO_FEATURES: [&str; 7] = [
    "danceability_%",
    "valence_%",
    "energy_%",
    "acousticness_%",
    "instrumentalness_%",
    "liveness_%",
    "speechiness_%",
];

pub const COLUMN_DESCRIPTIONS: &[(&str, &str)] = &[
    ("track_name", "Name of the song"),
    ("artist(s)_name", "Name of the artist(s) of the song"),
    ("artist_count", "Number of artists contributing to the song"),
    ("in_spotify_playlists", "Number of Spotify playlists the song is included in"),
    ("in_spotify_charts", "Presence and rank of the song on Spotify charts"),
    ("streams", "Total number of streams on Spotify"),
    ("in_apple_playlists", "Number of Apple Music playlists the song is included in"),
    ("in_apple_charts", "Presence and rank of the song on Apple Music charts"),
    ("in_deezer_playlists", "Number of Deezer playlists the song is included in"),
    ("in_deezer_charts", "Presence and rank of the song on Deezer charts"),
    ("danceability_%", "Percentage indicating how suitable the song is for dancing"),
    ("valence_%", "Positivity of the song's musical content"),
    ("energy_%", "Perceived energy level of the song"),
    ("acousticness_%", "Amount of acoustic sound in the song"),
    ("instrumentalness_%", "Amount of instrumental content in the song"),
    ("liveness_%", "Presence of live performance elements"),
    ("speechiness_%", "Amount of spoken words in the song"),
    ("release_date", "Exact date when the song was released"),
];

/// The two tables every dashboard page starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyDatasets {
    /// `spotify_data`: one row per 2023 hit, `release_date` normalized.
    pub spotify_2023: ResultTable,
    /// `spotify_top_tracks_by_artist`.
    pub top_tracks: ResultTable,
}

impl SpotifyDatasets {
    /// Load both tables in one acquisition.
    pub fn load(source: &impl TableSource, archives: &ArchiveConfig) -> Result<Self, LoadError> {
        let urls = [
            archives.spotify_data_url.clone(),
            archives.top_tracks_url.clone(),
        ];
        let tables = [
            archives.spotify_table.clone(),
            archives.top_tracks_table.clone(),
        ];

        let mut loaded = source.load_named_tables(&urls, &tables)?.into_iter();
        match (loaded.next(), loaded.next()) {
            (Some(spotify_2023), Some(top_tracks)) => {
                info!(
                    "Datasets ready: {} hits, {} top tracks",
                    spotify_2023.len(),
                    top_tracks.len()
                );
                Ok(Self {
                    spotify_2023,
                    top_tracks,
                })
            }
            _ => Err(LoadError::InvalidRequest(
                "table source returned fewer tables than requested".to_string(),
            )),
        }
    }
}
