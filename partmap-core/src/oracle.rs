//! The parts-database seam.
//!
//! Everything the resolution engine needs from the catalog's parts database
//! goes through the [`PartsDatabase`] trait: a bulk interchange read, an
//! exact active-part existence check, a bounded prefix search, and a
//! metadata fetch. The production implementation lives in the server crate;
//! [`MockPartsDb`] backs the tests here and downstream.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};
use crate::interchange::InterchangeRow;

/// Descriptive metadata for one active part, as stored in the catalog
/// master table. Enriches suggestions and the review surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDetails {
    pub part_number: String,
    pub brand: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

impl PartDetails {
    /// A details record carrying only the part number.
    pub fn bare(part_number: impl Into<String>) -> Self {
        Self {
            part_number: part_number.into(),
            brand: None,
            title: None,
            description: None,
            keywords: None,
        }
    }
}

/// Read access to the catalog parts database.
///
/// Implementations must be thread-safe (`Send + Sync`); the resolver is
/// shared across request handlers. All part-number arguments arrive already
/// trimmed and upper-cased. Connection-level failures must surface as
/// [`MappingError::Unavailable`] so callers can degrade instead of failing.
#[async_trait]
pub trait PartsDatabase: Send + Sync {
    /// Is this exact string a currently active part number?
    async fn active_part_exists(&self, part_number: &str) -> Result<bool>;

    /// All interchange rows, ordered by new number then code.
    async fn interchange_rows(&self) -> Result<Vec<InterchangeRow>>;

    /// Active parts whose number starts with `prefix`, ordered, at most
    /// `limit` rows.
    async fn search_active_parts(&self, prefix: &str, limit: usize) -> Result<Vec<PartDetails>>;

    /// Metadata for one active part, when present.
    async fn part_details(&self, part_number: &str) -> Result<Option<PartDetails>>;
}

/// Failure the mock should simulate on its next calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureMode {
    /// Connection-level failure; callers should soft-fail.
    Unavailable,
    /// Query-level failure; callers should treat as unexpected.
    Query,
}

/// In-memory parts database for tests.
///
/// Not a real store: lookups are exact against a `HashSet`, prefix search is
/// a linear scan. Failure modes can be toggled to exercise the degraded
/// paths.
#[derive(Default)]
pub struct MockPartsDb {
    active: RwLock<HashSet<String>>,
    details: RwLock<HashMap<String, PartDetails>>,
    interchange: RwLock<Vec<InterchangeRow>>,
    failure: RwLock<Option<FailureMode>>,
}

impl MockPartsDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor seeding active part numbers.
    pub fn with_active_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let db = Self::new();
        for part in parts {
            db.add_active_part(part);
        }
        db
    }

    pub fn add_active_part(&self, part_number: impl Into<String>) {
        let part_number = part_number.into().trim().to_uppercase();
        self.active.write().expect("mock lock").insert(part_number);
    }

    pub fn add_part_details(&self, details: PartDetails) {
        let key = details.part_number.trim().to_uppercase();
        self.active.write().expect("mock lock").insert(key.clone());
        self.details.write().expect("mock lock").insert(key, details);
    }

    pub fn add_interchange_row(&self, row: InterchangeRow) {
        self.interchange.write().expect("mock lock").push(row);
    }

    /// Seed a normalized interchange mapping in one call.
    pub fn add_interchange(&self, code: &str, old_number: &str, new_number: &str) {
        self.add_interchange_row(InterchangeRow {
            code: Some(code.to_string()),
            old_number: Some(old_number.to_string()),
            new_number: Some(new_number.to_string()),
        });
    }

    pub fn clear_interchange_rows(&self) {
        self.interchange.write().expect("mock lock").clear();
    }

    /// Simulate a connection-level outage on all subsequent calls.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.failure.write().expect("mock lock") = if unavailable {
            Some(FailureMode::Unavailable)
        } else {
            None
        };
    }

    /// Simulate an unexpected query failure on all subsequent calls.
    pub fn set_query_failure(&self, failing: bool) {
        *self.failure.write().expect("mock lock") = if failing {
            Some(FailureMode::Query)
        } else {
            None
        };
    }

    fn check_failure(&self) -> Result<()> {
        match *self.failure.read().expect("mock lock") {
            Some(FailureMode::Unavailable) => {
                Err(MappingError::Unavailable("mock connection down".into()))
            }
            Some(FailureMode::Query) => Err(MappingError::Query("mock query failure".into())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PartsDatabase for MockPartsDb {
    async fn active_part_exists(&self, part_number: &str) -> Result<bool> {
        self.check_failure()?;
        let key = part_number.trim().to_uppercase();
        Ok(self.active.read().expect("mock lock").contains(&key))
    }

    async fn interchange_rows(&self) -> Result<Vec<InterchangeRow>> {
        self.check_failure()?;
        Ok(self.interchange.read().expect("mock lock").clone())
    }

    async fn search_active_parts(&self, prefix: &str, limit: usize) -> Result<Vec<PartDetails>> {
        self.check_failure()?;
        let prefix = prefix.trim().to_uppercase();
        let active = self.active.read().expect("mock lock");
        let details = self.details.read().expect("mock lock");

        let mut matches: Vec<String> = active
            .iter()
            .filter(|p| p.starts_with(&prefix))
            .cloned()
            .collect();
        matches.sort();
        matches.truncate(limit);

        Ok(matches
            .into_iter()
            .map(|p| details.get(&p).cloned().unwrap_or_else(|| PartDetails::bare(p)))
            .collect())
    }

    async fn part_details(&self, part_number: &str) -> Result<Option<PartDetails>> {
        self.check_failure()?;
        let key = part_number.trim().to_uppercase();
        if !self.active.read().expect("mock lock").contains(&key) {
            return Ok(None);
        }
        let details = self.details.read().expect("mock lock");
        Ok(Some(
            details.get(&key).cloned().unwrap_or_else(|| PartDetails::bare(key)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_existence_is_case_insensitive() {
        let db = MockPartsDb::with_active_parts(["J1234567"]);
        assert!(db.active_part_exists("j1234567").await.unwrap());
        assert!(db.active_part_exists(" J1234567 ").await.unwrap());
        assert!(!db.active_part_exists("J7654321").await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_prefix_search_is_ordered_and_bounded() {
        let db = MockPartsDb::with_active_parts(["J1203", "J1201", "J1202", "A1200"]);
        let hits = db.search_active_parts("J12", 2).await.unwrap();
        let numbers: Vec<_> = hits.iter().map(|d| d.part_number.as_str()).collect();
        assert_eq!(numbers, ["J1201", "J1202"]);
    }

    #[tokio::test]
    async fn test_mock_details_fall_back_to_bare_record() {
        let db = MockPartsDb::with_active_parts(["J1201"]);
        let details = db.part_details("J1201").await.unwrap().unwrap();
        assert_eq!(details.part_number, "J1201");
        assert!(details.brand.is_none());

        assert!(db.part_details("J9999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_failure_modes() {
        let db = MockPartsDb::with_active_parts(["J1201"]);

        db.set_unavailable(true);
        let err = db.active_part_exists("J1201").await.unwrap_err();
        assert!(err.is_unavailable());

        db.set_query_failure(true);
        let err = db.active_part_exists("J1201").await.unwrap_err();
        assert!(!err.is_unavailable());

        db.set_query_failure(false);
        assert!(db.active_part_exists("J1201").await.unwrap());
    }
}
