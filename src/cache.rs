use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cache entry serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    last_updated: i64,
    hours: u64,
    response: Value,
}

/// Flat-file read-through cache for records-query responses.
///
/// Entries are keyed by a content hash of `(table, select, where)` and stored
/// as `{"last_updated": epoch-seconds, "hours": ttl, "response": ...}`.
/// Expiry is checked on read; there is no background eviction.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    hours: u64,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, hours: u64) -> Self {
        Self {
            dir: dir.into(),
            hours,
        }
    }

    /// Return the cached response for this query if a fresh entry exists.
    /// An unreadable or corrupt entry counts as a miss.
    pub fn fetch(
        &self,
        table: &str,
        select: &[i64],
        where_clause: &str,
    ) -> Result<Option<Value>, CacheError> {
        let path = self.entry_path(table, select, where_clause);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("discarding unreadable cache entry {}: {e}", path.display());
                return Ok(None);
            }
        };

        let age_secs = Utc::now().timestamp() - entry.last_updated;
        if age_secs >= (entry.hours * 3600) as i64 {
            debug!("cache entry {} expired ({age_secs}s old)", path.display());
            return Ok(None);
        }
        Ok(Some(entry.response))
    }

    /// Write (or overwrite) the cache entry for this query.
    pub fn store(
        &self,
        table: &str,
        select: &[i64],
        where_clause: &str,
        response: &Value,
    ) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            last_updated: Utc::now().timestamp(),
            hours: self.hours,
            response: response.clone(),
        };
        let path = self.entry_path(table, select, where_clause);
        fs::write(&path, serde_json::to_string(&entry)?)?;
        debug!("stored cache entry {}", path.display());
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, table: &str, select: &[i64], where_clause: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        table.hash(&mut hasher);
        select.hash(&mut hasher);
        where_clause.hash(&mut hasher);
        self.dir.join(format!("{:016x}.json", hasher.finish()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_then_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 1);
        let response = json!({"data": [], "fields": [], "metadata": {}});

        cache
            .store("bq5x7kzu9", &[6, 7], "{3.EX.1}", &response)
            .unwrap();
        let hit = cache.fetch("bq5x7kzu9", &[6, 7], "{3.EX.1}").unwrap();
        assert_eq!(hit, Some(response));
    }

    #[test]
    fn test_fetch_miss_for_different_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 1);
        cache
            .store("bq5x7kzu9", &[6], "{3.EX.1}", &json!({"ok": true}))
            .unwrap();
        assert_eq!(cache.fetch("bq5x7kzu9", &[6], "{3.EX.2}").unwrap(), None);
        assert_eq!(cache.fetch("bother", &[6], "{3.EX.1}").unwrap(), None);
    }

    #[test]
    fn test_zero_ttl_entry_expires_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 0);
        cache
            .store("bq5x7kzu9", &[6], "{3.EX.1}", &json!({"ok": true}))
            .unwrap();
        assert_eq!(cache.fetch("bq5x7kzu9", &[6], "{3.EX.1}").unwrap(), None);
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 1);
        cache
            .store("bq5x7kzu9", &[6], "{3.EX.1}", &json!({"ok": true}))
            .unwrap();
        // clobber the entry on disk
        for file in fs::read_dir(dir.path()).unwrap() {
            fs::write(file.unwrap().path(), "not json").unwrap();
        }
        assert_eq!(cache.fetch("bq5x7kzu9", &[6], "{3.EX.1}").unwrap(), None);
    }
}
