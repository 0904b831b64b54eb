//! Interchange cache: historical old-number to current-number mappings.
//!
//! The interchange table is read once in bulk and held in memory so that
//! resolution never pays a database round-trip per file. Refreshes build a
//! complete replacement map off to the side and swap it in with a single
//! reference assignment; readers holding the previous snapshot finish
//! against it and never observe a partially rebuilt map.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::oracle::PartsDatabase;

/// One historical interchange record: an old/superseded part number and the
/// current number that replaced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeMapping {
    /// Superseded part number (uppercase, trimmed).
    pub old_part_number: String,
    /// Current replacement part number (uppercase, trimmed).
    pub new_part_number: String,
    /// Source-system interchange code; may be empty.
    pub interchange_code: String,
}

/// Raw interchange row as returned by the parts database, before
/// normalization. Nullable columns stay optional here.
#[derive(Debug, Clone, Default)]
pub struct InterchangeRow {
    pub code: Option<String>,
    pub old_number: Option<String>,
    pub new_number: Option<String>,
}

type Snapshot = Arc<HashMap<String, InterchangeMapping>>;

/// In-memory old-number to current-number lookup table.
///
/// Shared, read-mostly state: many concurrent `lookup` calls, occasional
/// `refresh`. Lookups clone the current snapshot pointer under a momentary
/// read guard and search lock-free; refreshes never mutate a live map.
pub struct InterchangeCache {
    snapshot: RwLock<Snapshot>,
}

impl InterchangeCache {
    /// Create an empty cache. Call [`refresh`](Self::refresh) to populate.
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Look up the interchange mapping for an old part number.
    ///
    /// The key is trimmed and upper-cased before lookup, so resolution is
    /// case-insensitive regardless of how the caller obtained the number.
    pub fn lookup(&self, old_number: &str) -> Option<InterchangeMapping> {
        let key = old_number.trim().to_uppercase();
        let snapshot = self.current();
        snapshot.get(&key).cloned()
    }

    /// Number of mappings in the current snapshot.
    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    /// Rebuild the cache from the parts database and swap the new table in.
    ///
    /// Rows with a null or empty old or new number are skipped. Duplicate
    /// old numbers apply last-write-wins, matching the source system's
    /// export order (new number, then code). Total database unavailability
    /// leaves the cache empty rather than failing: resolution degrades to
    /// extraction and fuzzy matching only.
    ///
    /// Returns the number of mappings now live.
    pub async fn refresh(&self, db: &dyn PartsDatabase) -> usize {
        let rows = match db.interchange_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "interchange load failed; cache left empty");
                self.swap(HashMap::new());
                return 0;
            }
        };

        let total = rows.len();
        let mut map = HashMap::with_capacity(total);
        let mut duplicates = 0usize;

        for row in rows {
            let old = normalize(row.old_number.as_deref());
            let new = normalize(row.new_number.as_deref());
            let (Some(old), Some(new)) = (old, new) else {
                continue;
            };
            let code = row.code.map(|c| c.trim().to_string()).unwrap_or_default();

            let mapping = InterchangeMapping {
                old_part_number: old.clone(),
                new_part_number: new,
                interchange_code: code,
            };
            if map.insert(old, mapping).is_some() {
                duplicates += 1;
            }
        }

        let loaded = map.len();
        self.swap(map);

        if duplicates > 0 {
            debug!(duplicates, "duplicate old numbers in interchange source; kept last");
        }
        info!(loaded, skipped = total - loaded - duplicates, "interchange cache refreshed");

        loaded
    }

    fn current(&self) -> Snapshot {
        Arc::clone(&self.snapshot.read().expect("interchange cache lock poisoned"))
    }

    fn swap(&self, map: HashMap<String, InterchangeMapping>) {
        *self.snapshot.write().expect("interchange cache lock poisoned") = Arc::new(map);
    }
}

impl Default for InterchangeCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim and upper-case a nullable source value; empty becomes `None`.
fn normalize(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::MockPartsDb;

    fn row(code: &str, old: &str, new: &str) -> InterchangeRow {
        InterchangeRow {
            code: Some(code.to_string()),
            old_number: Some(old.to_string()),
            new_number: Some(new.to_string()),
        }
    }

    #[tokio::test]
    async fn test_refresh_normalizes_and_loads() {
        let db = MockPartsDb::new();
        db.add_interchange_row(row("IC", "  old12345 ", "12345"));

        let cache = InterchangeCache::new();
        assert_eq!(cache.refresh(&db).await, 1);

        let mapping = cache.lookup("old12345").expect("mapping present");
        assert_eq!(mapping.old_part_number, "OLD12345");
        assert_eq!(mapping.new_part_number, "12345");
        assert_eq!(mapping.interchange_code, "IC");
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let db = MockPartsDb::new();
        db.add_interchange_row(row("", "OLD12345", "12345"));

        let cache = InterchangeCache::new();
        cache.refresh(&db).await;

        assert!(cache.lookup("Old12345").is_some());
        assert!(cache.lookup(" old12345 ").is_some());
        assert!(cache.lookup("OLD99999").is_none());
    }

    #[tokio::test]
    async fn test_rows_with_missing_numbers_are_skipped() {
        let db = MockPartsDb::new();
        db.add_interchange_row(InterchangeRow {
            code: Some("IC".into()),
            old_number: None,
            new_number: Some("12345".into()),
        });
        db.add_interchange_row(InterchangeRow {
            code: None,
            old_number: Some("OLD1".into()),
            new_number: Some("   ".into()),
        });
        db.add_interchange_row(row("IC", "OLD12345", "12345"));

        let cache = InterchangeCache::new();
        assert_eq!(cache.refresh(&db).await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_old_numbers_keep_last() {
        let db = MockPartsDb::new();
        db.add_interchange_row(row("A", "OLD12345", "11111"));
        db.add_interchange_row(row("B", "OLD12345", "22222"));

        let cache = InterchangeCache::new();
        assert_eq!(cache.refresh(&db).await, 1);
        assert_eq!(
            cache.lookup("OLD12345").unwrap().new_part_number,
            "22222"
        );
    }

    #[tokio::test]
    async fn test_unavailable_database_leaves_cache_empty() {
        let db = MockPartsDb::new();
        db.add_interchange_row(row("IC", "OLD12345", "12345"));
        let cache = InterchangeCache::new();
        cache.refresh(&db).await;
        assert_eq!(cache.len(), 1);

        // A refresh against a dead database empties the cache instead of
        // erroring; resolution falls back to weaker strategies.
        db.set_unavailable(true);
        assert_eq!(cache.refresh(&db).await, 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_swaps_snapshot_atomically() {
        let db = MockPartsDb::new();
        db.add_interchange_row(row("IC", "OLD12345", "12345"));

        let cache = InterchangeCache::new();
        cache.refresh(&db).await;

        // A reader that resolved before the refresh still sees a complete
        // mapping from the old snapshot semantics; after refresh the new
        // snapshot is fully formed.
        db.clear_interchange_rows();
        db.add_interchange_row(row("IC", "OLD67890", "67890"));
        cache.refresh(&db).await;

        assert!(cache.lookup("OLD12345").is_none());
        assert_eq!(cache.lookup("OLD67890").unwrap().new_part_number, "67890");
    }
}
