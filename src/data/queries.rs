use super::model::{CellValue, ResultTable};

/// One of the fixed analytical questions on the SQL page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SqlQuestion {
    MultiArtistHits,
    LoveSongs,
    ProlificArtists2023,
}

impl SqlQuestion {
    pub const ALL: [SqlQuestion; 3] = [
        SqlQuestion::MultiArtistHits,
        SqlQuestion::LoveSongs,
        SqlQuestion::ProlificArtists2023,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SqlQuestion::MultiArtistHits => "Question 1",
            SqlQuestion::LoveSongs => "Question 2",
            SqlQuestion::ProlificArtists2023 => "Question 3",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            SqlQuestion::MultiArtistHits => "What are all the top 5 songs with multiple artists?",
            SqlQuestion::LoveSongs => {
                "What are the top 5 songs that have the word \"Love\" in the track name?"
            }
            SqlQuestion::ProlificArtists2023 => {
                "Which artist has the most songs released in 2023 that are in the top spotify charts?"
            }
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SqlQuestion::MultiArtistHits => MULTI_ARTIST_HITS,
            SqlQuestion::LoveSongs => LOVE_SONGS,
            SqlQuestion::ProlificArtists2023 => PROLIFIC_ARTISTS_2023,
        }
    }

    /// One-line answer derived from the result, where the question has one.
    pub fn answer(self, result: &ResultTable) -> Option<String> {
        match self {
            SqlQuestion::ProlificArtists2023 => match result.cell(0, "artist(s)_name")? {
                CellValue::Null => None,
                artist => Some(artist.to_string()),
            },
            _ => None,
        }
    }
}

pub const MULTI_ARTIST_HITS: &str = r#"SELECT track_name, "artist(s)_name", artist_count, streams
FROM spotify_data
WHERE artist_count > 1
ORDER BY streams DESC
LIMIT 5;"#;

pub const LOVE_SONGS: &str = r#"SELECT track_name, "artist(s)_name"
FROM spotify_data
WHERE track_name LIKE '%love%'
ORDER BY streams DESC
LIMIT 5;"#;

pub const PROLIFIC_ARTISTS_2023: &str = r#"SELECT "artist(s)_name", COUNT(*) AS song_count
FROM spotify_data
WHERE release_date BETWEEN '2023-01-01' AND '2024-01-01'
GROUP BY "artist(s)_name"
ORDER BY song_count DESC
LIMIT 3;"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_reads_first_artist() {
        let result = ResultTable::new(
            vec!["artist(s)_name".into(), "song_count".into()],
            vec![
                vec![CellValue::String("Morgan Wallen".into()), CellValue::Integer(8)],
                vec![CellValue::String("Taylor Swift".into()), CellValue::Integer(5)],
            ],
        );
        assert_eq!(
            SqlQuestion::ProlificArtists2023.answer(&result).as_deref(),
            Some("Morgan Wallen")
        );
        assert_eq!(SqlQuestion::LoveSongs.answer(&result), None);
        assert_eq!(
            SqlQuestion::ProlificArtists2023.answer(&ResultTable::default()),
            None
        );
    }

    #[test]
    fn every_question_reads_spotify_data() {
        for q in SqlQuestion::ALL {
            assert!(q.sql().contains("FROM spotify_data"));
            assert!(q.sql().trim_end().ends_with(';'));
        }
    }
}
