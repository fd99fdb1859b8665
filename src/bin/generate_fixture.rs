//! Writes two small SQLite archives shaped like the published ones and
//! prints a matching configuration file.
//!
//! ```text
//! cargo run --bin generate_fixture -- fixtures > fixtures/config.json
//! SPOTIFY_DASHBOARD_CONFIG=fixtures/config.json cargo run
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use spotify_dashboard::config::{ArchiveConfig, DashboardConfig};

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        let span = (hi - lo + 1) as u64;
        lo + (self.next_u64() % span) as i64
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const ARTISTS: &[&str] = &[
    "Taylor Swift",
    "Bad Bunny",
    "The Weeknd",
    "SZA",
    "Harry Styles",
    "Morgan Wallen",
    "Drake, 21 Savage",
    "Peso Pluma, Grupo Frontera",
];

const WORDS: &[&str] = &[
    "Love", "Night", "Flowers", "Heart", "Summer", "Ghost", "Dance", "Fire", "Blue", "Lights",
];

// Written in mixed formats so the loader has something to normalize.
const DATE_STYLES: &[&str] = &["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d"];

fn write_spotify_data(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let conn = Connection::open(path).with_context(|| format!("creating {}", path.display()))?;
    conn.execute_batch(
        r#"CREATE TABLE spotify_data (
            track_name TEXT,
            "artist(s)_name" TEXT,
            artist_count INTEGER,
            released_year INTEGER,
            in_spotify_playlists INTEGER,
            in_spotify_charts INTEGER,
            streams INTEGER,
            in_apple_playlists INTEGER,
            in_apple_charts INTEGER,
            in_deezer_playlists INTEGER,
            in_deezer_charts INTEGER,
            "danceability_%" INTEGER,
            "valence_%" INTEGER,
            "energy_%" INTEGER,
            "acousticness_%" INTEGER,
            "instrumentalness_%" INTEGER,
            "liveness_%" INTEGER,
            "speechiness_%" INTEGER,
            release_date TEXT
        );"#,
    )?;

    let rows = 120;
    for i in 0..rows {
        let artist = rng.pick(ARTISTS);
        let artist_count = artist.matches(',').count() as i64 + 1;
        let title = format!("{} {}", rng.pick(WORDS), rng.pick(WORDS));
        let year = if i % 3 == 0 { 2022 } else { 2023 };
        let date = chrono::NaiveDate::from_ymd_opt(year, rng.range(1, 12) as u32, rng.range(1, 28) as u32)
            .context("generated an invalid date")?;
        let release_date = date.format(rng.pick(DATE_STYLES)).to_string();

        conn.execute(
            "INSERT INTO spotify_data VALUES
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                title,
                artist,
                artist_count,
                year,
                rng.range(100, 50_000),
                rng.range(0, 150),
                rng.range(1_000_000, 3_500_000_000),
                rng.range(0, 600),
                rng.range(0, 300),
                rng.range(0, 900),
                rng.range(0, 50),
                rng.range(20, 95),
                rng.range(5, 95),
                rng.range(15, 95),
                rng.range(0, 90),
                rng.range(0, 40),
                rng.range(3, 60),
                rng.range(2, 45),
                release_date,
            ],
        )?;
    }
    Ok(rows)
}

fn write_top_tracks(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let conn = Connection::open(path).with_context(|| format!("creating {}", path.display()))?;
    conn.execute_batch(
        r#"CREATE TABLE spotify_top_tracks_by_artist (
            "Artist Name" TEXT,
            "Track Name" TEXT,
            "Album Name" TEXT,
            "Popularity" INTEGER
        );"#,
    )?;

    let mut rows = 0;
    for artist in ARTISTS.iter().take(6) {
        for _ in 0..10 {
            conn.execute(
                "INSERT INTO spotify_top_tracks_by_artist VALUES (?1, ?2, ?3, ?4)",
                params![
                    artist,
                    format!("{} {}", rng.pick(WORDS), rng.pick(WORDS)),
                    format!("{} Album", rng.pick(WORDS)),
                    rng.range(40, 100),
                ],
            )?;
            rows += 1;
        }
    }
    Ok(rows)
}

fn file_url(path: &Path) -> Result<String> {
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("resolving {}", path.display()))?;
    Ok(format!("file://{}", absolute.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("fixtures"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let defaults = ArchiveConfig::default();

    let hits_path = out_dir.join("spotify_data.sqlite");
    let top_path = out_dir.join("spotify_top_tracks_by_artist.sqlite");
    // Connection::open appends to an existing file.
    for path in [&hits_path, &top_path] {
        if path.exists() {
            std::fs::remove_file(path).with_context(|| format!("removing {}", path.display()))?;
        }
    }

    let hits = write_spotify_data(&hits_path, &mut rng)?;
    let top = write_top_tracks(&top_path, &mut rng)?;
    eprintln!(
        "Wrote {hits} hits to {} and {top} top tracks to {}",
        hits_path.display(),
        top_path.display()
    );

    let config = DashboardConfig {
        archives: ArchiveConfig {
            spotify_data_url: file_url(&hits_path)?,
            top_tracks_url: file_url(&top_path)?,
            ..defaults
        },
        ..DashboardConfig::default()
    };
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
