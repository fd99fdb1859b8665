use std::collections::HashMap;
use std::sync::Mutex;

use log::{debug, info};

use super::model::ResultTable;

/// Identifies one memoized loader call: the operation plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    NamedTables {
        urls: Vec<String>,
        tables: Vec<String>,
    },
    Query {
        url: String,
        query: String,
    },
}

/// Process-lifetime memo of successful loader results.
///
/// Populated on the first successful call for a key and only emptied by
/// [`QueryCache::clear`] or process exit. Failures are never stored.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<CacheKey, Vec<ResultTable>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<ResultTable>> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let hit = entries.get(key).cloned();
        if hit.is_some() {
            debug!("Cache hit for {key:?}");
        }
        hit
    }

    pub fn insert(&self, key: CacheKey, tables: Vec<ResultTable>) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let rows: usize = tables.iter().map(ResultTable::len).sum();
        entries.insert(key, tables);
        info!("Cached {rows} rows; {} entries memoized", entries.len());
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every memoized result; the next call fetches again.
    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    #[test]
    fn keys_distinguish_operation_and_arguments() {
        let cache = QueryCache::new();
        let table = ResultTable::new(vec!["n".into()], vec![vec![CellValue::Integer(1)]]);

        let q1 = CacheKey::Query {
            url: "https://a".into(),
            query: "SELECT 1".into(),
        };
        let q2 = CacheKey::Query {
            url: "https://a".into(),
            query: "SELECT 2".into(),
        };
        let named = CacheKey::NamedTables {
            urls: vec!["https://a".into()],
            tables: vec!["SELECT 1".into()],
        };

        cache.insert(q1.clone(), vec![table.clone()]);
        assert_eq!(cache.get(&q1), Some(vec![table]));
        assert_eq!(cache.get(&q2), None);
        assert_eq!(cache.get(&named), None);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
