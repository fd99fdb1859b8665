use std::sync::Arc;

use log::{debug, info};

use super::cache::{CacheKey, QueryCache};
use super::error::LoadError;
use super::fetch::Fetcher;
use super::model::ResultTable;
use super::normalize::normalize_release_dates;
use super::retry::Populated;
use super::stage::{StagedArchive, StagingOptions};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// The two acquisition operations the pages are built on.
///
/// Implemented by [`Loader`] and by the retrying decorator
/// [`Retrying`](super::retry::Retrying).
pub trait TableSource {
    /// Load `table_names[i]` from `archive_urls[i]` for every `i`.
    ///
    /// Several pairs may share one archive; each distinct archive is fetched
    /// once per call. Tables come back in request order.
    fn load_named_tables(
        &self,
        archive_urls: &[String],
        table_names: &[String],
    ) -> Result<Vec<ResultTable>, LoadError>;

    /// Run an arbitrary query against one archive.
    fn load_via_query(&self, archive_url: &str, query: &str) -> Result<ResultTable, LoadError>;
}

impl<T: TableSource + ?Sized> TableSource for &T {
    fn load_named_tables(
        &self,
        archive_urls: &[String],
        table_names: &[String],
    ) -> Result<Vec<ResultTable>, LoadError> {
        (**self).load_named_tables(archive_urls, table_names)
    }

    fn load_via_query(&self, archive_url: &str, query: &str) -> Result<ResultTable, LoadError> {
        (**self).load_via_query(archive_url, query)
    }
}

// ---------------------------------------------------------------------------
// Loader – fetch → stage → query → cleanup, memoized
// ---------------------------------------------------------------------------

/// Fetches archives, stages them as temporary SQLite files, extracts tables
/// and removes the staging files again.
///
/// Successful, non-empty results are memoized in the injected [`QueryCache`].
pub struct Loader<F> {
    fetcher: F,
    cache: Arc<QueryCache>,
    staging: StagingOptions,
}

impl<F: Fetcher> Loader<F> {
    pub fn new(fetcher: F, cache: Arc<QueryCache>, staging: StagingOptions) -> Self {
        Self {
            fetcher,
            cache,
            staging,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Results with an empty table are not kept, so a retry fetches again.
    fn memoize(&self, key: CacheKey, tables: &[ResultTable]) {
        if tables.is_populated() {
            self.cache.insert(key, tables.to_vec());
        } else {
            debug!("Not caching empty result for {key:?}");
        }
    }

    fn stage(&self, url: &str) -> Result<StagedArchive, LoadError> {
        let bytes = self.fetcher.fetch(url)?;
        StagedArchive::create(url, &bytes, &self.staging)
    }

    fn fetch_tables(
        &self,
        archive_urls: &[String],
        table_names: &[String],
    ) -> Result<Vec<ResultTable>, LoadError> {
        // Distinct archives in first-appearance order, each with the
        // request positions it serves.
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        for (pos, url) in archive_urls.iter().enumerate() {
            match groups.iter_mut().find(|(u, _)| *u == url.as_str()) {
                Some((_, positions)) => positions.push(pos),
                None => groups.push((url.as_str(), vec![pos])),
            }
        }

        let mut slots: Vec<Option<ResultTable>> = vec![None; table_names.len()];
        for (url, positions) in groups {
            let staged = self.stage(url)?;
            for pos in positions {
                let mut table = staged.read_table(&table_names[pos])?;
                normalize_release_dates(&mut table);
                info!(
                    "Loaded table '{}' from {url}: {} rows × {} columns",
                    table_names[pos],
                    table.len(),
                    table.columns.len()
                );
                slots[pos] = Some(table);
            }
            staged.close();
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

impl<F: Fetcher> TableSource for Loader<F> {
    fn load_named_tables(
        &self,
        archive_urls: &[String],
        table_names: &[String],
    ) -> Result<Vec<ResultTable>, LoadError> {
        if archive_urls.is_empty() {
            return Err(LoadError::InvalidRequest("no tables requested".to_string()));
        }
        if archive_urls.len() != table_names.len() {
            return Err(LoadError::InvalidRequest(format!(
                "{} archive URLs for {} table names",
                archive_urls.len(),
                table_names.len()
            )));
        }

        let key = CacheKey::NamedTables {
            urls: archive_urls.to_vec(),
            tables: table_names.to_vec(),
        };
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let tables = self.fetch_tables(archive_urls, table_names)?;
        self.memoize(key, &tables);
        Ok(tables)
    }

    fn load_via_query(&self, archive_url: &str, query: &str) -> Result<ResultTable, LoadError> {
        let key = CacheKey::Query {
            url: archive_url.to_string(),
            query: query.to_string(),
        };
        if let Some(mut hit) = self.cache.get(&key) {
            if let Some(table) = hit.pop() {
                return Ok(table);
            }
        }

        let staged = self.stage(archive_url)?;
        let mut table = staged.query(query)?;
        staged.close();
        normalize_release_dates(&mut table);
        info!(
            "Query against {archive_url} returned {} rows × {} columns",
            table.len(),
            table.columns.len()
        );

        self.memoize(key, std::slice::from_ref(&table));
        Ok(table)
    }
}
