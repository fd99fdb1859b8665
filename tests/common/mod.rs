#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::Path;

use rusqlite::{Connection, params};

use spotify_dashboard::data::error::LoadError;
use spotify_dashboard::data::fetch::Fetcher;

pub const HITS_URL: &str = "https://archives.test/spotify_data.sqlite";
pub const TOP_TRACKS_URL: &str = "https://archives.test/spotify_top_tracks_by_artist.sqlite";

/// Build an SQLite database with `sql` in `dir` and return its bytes.
pub fn sqlite_bytes(dir: &Path, name: &str, sql: &str) -> Vec<u8> {
    let path = dir.join(name);
    let conn = Connection::open(&path).expect("failed opening fixture database");
    conn.execute_batch(sql).expect("failed building fixture database");
    drop(conn);
    std::fs::read(&path).expect("failed reading fixture database")
}

/// 20 hits; rows 0..6 have more than one artist, with streams 600..100.
pub fn hits_archive(dir: &Path) -> Vec<u8> {
    let path = dir.join("hits.sqlite");
    let conn = Connection::open(&path).expect("failed opening fixture database");
    conn.execute_batch(
        r#"CREATE TABLE spotify_data (
            track_name TEXT,
            "artist(s)_name" TEXT,
            artist_count INTEGER,
            streams INTEGER,
            in_spotify_playlists INTEGER,
            in_spotify_charts INTEGER,
            "danceability_%" INTEGER,
            "energy_%" INTEGER,
            release_date TEXT
        );"#,
    )
    .expect("failed creating spotify_data");

    for i in 0..20i64 {
        let (artists, count, streams) = if i < 6 {
            (format!("Duo {i}, Guest {i}"), 2, 600 - i * 100)
        } else {
            (format!("Solo {i}"), 1, 10_000 + i)
        };
        // Alternate the stored date style.
        let release_date = if i % 2 == 0 {
            format!("2023-03-{:02}", i + 1)
        } else {
            format!("2023-03-{:02} 00:00:00", i + 1)
        };
        conn.execute(
            r#"INSERT INTO spotify_data VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                format!("Track {i}"),
                artists,
                count,
                streams,
                100 + i,
                i % 7,
                40 + i,
                60 - i,
                release_date,
            ],
        )
        .expect("failed inserting hit");
    }
    drop(conn);
    std::fs::read(&path).expect("failed reading fixture database")
}

/// `spotify_data` with its columns but no rows.
pub fn empty_hits_archive(dir: &Path) -> Vec<u8> {
    sqlite_bytes(
        dir,
        "empty_hits.sqlite",
        r#"CREATE TABLE spotify_data (track_name TEXT, "artist(s)_name" TEXT, streams INTEGER);"#,
    )
}

pub fn top_tracks_archive(dir: &Path) -> Vec<u8> {
    sqlite_bytes(
        dir,
        "top.sqlite",
        r#"CREATE TABLE spotify_top_tracks_by_artist ("Artist Name" TEXT, "Track Name" TEXT);
           INSERT INTO spotify_top_tracks_by_artist VALUES
             ('Taylor Swift', 'Anti-Hero'),
             ('SZA', 'Kill Bill'),
             ('Taylor Swift', 'Lavender Haze');"#,
    )
}

/// Serves in-memory archives by URL and counts every fetch.
#[derive(Default)]
pub struct CountingFetcher {
    archives: RefCell<HashMap<String, Vec<u8>>>,
    queued: RefCell<HashMap<String, VecDeque<Vec<u8>>>>,
    fetches: RefCell<HashMap<String, usize>>,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, bytes: Vec<u8>) {
        self.archives.borrow_mut().insert(url.to_string(), bytes);
    }

    /// Serve `bytes` once for `url`, ahead of anything passed to `serve`.
    pub fn queue(&self, url: &str, bytes: Vec<u8>) {
        self.queued
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(bytes);
    }

    pub fn fetches_of(&self, url: &str) -> usize {
        self.fetches.borrow().get(url).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.borrow().values().sum()
    }
}

impl Fetcher for CountingFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        *self.fetches.borrow_mut().entry(url.to_string()).or_insert(0) += 1;
        if let Some(bytes) = self
            .queued
            .borrow_mut()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
        {
            return Ok(bytes);
        }
        self.archives
            .borrow()
            .get(url)
            .cloned()
            .ok_or_else(|| LoadError::Network {
                url: url.to_string(),
                reason: "404 Not Found".to_string(),
            })
    }
}

pub fn entries_in(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .expect("failed listing staging dir")
        .count()
}
