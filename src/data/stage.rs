use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tempfile::NamedTempFile;

use super::error::LoadError;
use super::model::{CellValue, ResultTable};

/// Where staging files are created.
#[derive(Debug, Clone, Default)]
pub struct StagingOptions {
    /// Directory for staging files; `None` uses the platform temp directory.
    pub dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// StagedArchive – a fetched archive materialized as a local SQLite store
// ---------------------------------------------------------------------------

/// A uniquely named temporary copy of an archive, opened read-only.
///
/// Field order matters: the connection is dropped before the file, and the
/// file is removed from disk when it is dropped, whichever path the caller
/// leaves through.
pub struct StagedArchive {
    conn: Connection,
    file: NamedTempFile,
    url: String,
}

impl StagedArchive {
    /// Write `bytes` verbatim to a fresh staging file and open it as a store.
    pub fn create(url: &str, bytes: &[u8], options: &StagingOptions) -> Result<Self, LoadError> {
        let staging = |reason: String| LoadError::Staging {
            url: url.to_string(),
            reason,
        };

        // A zero-length file would open as an empty database and turn a
        // truncated download into a "no such table" query failure.
        if bytes.is_empty() {
            return Err(staging("archive body is empty".to_string()));
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("spotify-archive-").suffix(".sqlite");
        let mut file = match &options.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|err| staging(format!("creating staging file: {err}")))?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|err| staging(format!("writing staging file: {err}")))?;
        debug!("Staged {url} at {}", file.path().display());

        let conn = Connection::open_with_flags(
            file.path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| staging(format!("opening store: {err}")))?;

        // SQLite opens lazily; touch the schema so a non-database body is a
        // staging failure rather than a query failure later on.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|err| staging(format!("not a readable SQLite database: {err}")))?;

        Ok(Self {
            conn,
            file,
            url: url.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// `SELECT * FROM "<table>"`.
    pub fn read_table(&self, table: &str) -> Result<ResultTable, LoadError> {
        self.query(&format!("SELECT * FROM {}", quote_identifier(table)))
    }

    /// Run an arbitrary query and collect the full result.
    pub fn query(&self, sql: &str) -> Result<ResultTable, LoadError> {
        let failure = |err: rusqlite::Error| LoadError::Query {
            query: sql.trim().to_string(),
            reason: err.to_string(),
        };

        let mut stmt = self.conn.prepare(sql).map_err(failure)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(failure)?;
        while let Some(row) = cursor.next().map_err(failure)? {
            let mut cells = Vec::with_capacity(width);
            for idx in 0..width {
                let value = row.get_ref(idx).map_err(failure)?;
                cells.push(cell_from_sql(value));
            }
            rows.push(cells);
        }

        Ok(ResultTable::new(columns, rows))
    }

    /// Close the connection, then delete the staging file.
    ///
    /// Errors here are logged only: the query results are already complete.
    pub fn close(self) {
        let StagedArchive { conn, file, url } = self;
        if let Err((_, err)) = conn.close() {
            warn!("Closing staged store for {url} failed: {err}");
        }
        let path = file.path().to_path_buf();
        if let Err(err) = file.close() {
            warn!("Removing staging file {} failed: {err}", path.display());
        }
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn cell_from_sql(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Float(f),
        ValueRef::Text(t) => CellValue::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive_bytes(dir: &Path) -> Vec<u8> {
        let path = dir.join("source.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE \"odd\"\"name\" (id INTEGER, label TEXT, score REAL, raw BLOB);
             INSERT INTO \"odd\"\"name\" VALUES (1, 'a', 0.5, x'0102'), (2, NULL, NULL, NULL);",
        )
        .unwrap();
        drop(conn);
        std::fs::read(path).unwrap()
    }

    #[test]
    fn reads_tables_with_quoted_names() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = archive_bytes(dir.path());
        let options = StagingOptions {
            dir: Some(dir.path().join("staging")),
        };
        std::fs::create_dir_all(options.dir.as_ref().unwrap()).unwrap();

        let staged = StagedArchive::create("mem://x", &bytes, &options).unwrap();
        let table = staged.read_table("odd\"name").unwrap();
        assert_eq!(table.columns, vec!["id", "label", "score", "raw"]);
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::Integer(1),
                CellValue::String("a".into()),
                CellValue::Float(0.5),
                CellValue::Blob(vec![1, 2]),
            ]
        );
        assert!(table.rows[1][1..].iter().all(CellValue::is_null));

        let path = staged.path().to_path_buf();
        assert!(path.exists());
        staged.close();
        assert!(!path.exists());
    }

    #[test]
    fn garbage_bytes_are_a_staging_failure() {
        let dir = tempfile::tempdir().unwrap();
        let options = StagingOptions {
            dir: Some(dir.path().to_path_buf()),
        };
        let err = StagedArchive::create("mem://bad", b"<html>404</html>", &options)
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::Staging { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_table_is_a_query_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = archive_bytes(dir.path());
        let staged = StagedArchive::create("mem://x", &bytes, &StagingOptions::default()).unwrap();
        let err = staged.read_table("nope").unwrap_err();
        assert!(matches!(err, LoadError::Query { .. }));
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn quoting_doubles_embedded_quotes() {
        assert_eq!(quote_identifier("spotify_data"), "\"spotify_data\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
