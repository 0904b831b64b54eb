//! Partmap Core - Part-number resolution engine
//!
//! This crate contains the resolution logic of the partmap catalog imaging
//! pipeline: turning an arbitrary, inconsistently-formatted image filename
//! into a canonical, currently-active part number.
//!
//! # How it works
//!
//! - Pattern extraction pulls up to three candidate numbers out of the
//!   filename (`extract`)
//! - A bulk-loaded interchange cache maps superseded numbers to their
//!   current replacements (`interchange`)
//! - The resolver tries direct existence, interchange lookup, then fuzzy
//!   variants, in strict priority order, and scores the outcome
//!   (`resolver`)
//! - Every outcome carries a fixed-tier confidence and a manual-review flag;
//!   resolution never raises, so one database hiccup cannot abort a batch
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use partmap_core::{MappingMethod, MockPartsDb, PartNumberResolver};
//!
//! # async fn example() {
//! // In production the database handle is the server's Postgres adapter;
//! // the mock stands in for tests and examples.
//! let db = Arc::new(MockPartsDb::with_active_parts(["J1234567"]));
//! let resolver = PartNumberResolver::new(db);
//! resolver.refresh_cache().await;
//!
//! let result = resolver.resolve("J1234567_detail.jpg").await;
//! assert_eq!(result.mapping_method, MappingMethod::DirectMatch);
//! assert_eq!(result.mapped_part_number.as_deref(), Some("J1234567"));
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod interchange;
pub mod mapping;
pub mod oracle;
pub mod resolver;

// Re-export main types for convenience
pub use error::{MappingError, Result};
pub use extract::PartNumberExtractor;
pub use interchange::{InterchangeCache, InterchangeMapping, InterchangeRow};
pub use mapping::{
    ManualOverride, MappingMethod, PartMappingResult, PartNumberSuggestion, REVIEW_THRESHOLD,
};
pub use oracle::{MockPartsDb, PartDetails, PartsDatabase};
pub use resolver::PartNumberResolver;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Integration test: the full resolution ladder against one seeded
    /// database, from direct match down to no-extraction.
    #[tokio::test]
    async fn test_full_resolution_workflow() {
        let db = Arc::new(MockPartsDb::with_active_parts(["J1234567", "12345"]));
        db.add_interchange("IC", "OLD12345", "12345");

        let resolver = PartNumberResolver::new(db.clone());
        assert_eq!(resolver.refresh_cache().await, 1);

        // Direct match wins immediately and is auto-accepted.
        let direct = resolver.resolve("J1234567_detail.jpg").await;
        assert_eq!(direct.mapping_method, MappingMethod::DirectMatch);
        assert!(!direct.requires_manual_review);

        // Old numbers route through the interchange table.
        let interchanged = resolver.resolve("OLD12345_1.jpg").await;
        assert_eq!(interchanged.mapping_method, MappingMethod::InterchangeMapping);
        assert_eq!(interchanged.mapped_part_number.as_deref(), Some("12345"));

        // Unknown but extractable names fall through to a reviewable guess.
        let guess = resolver.resolve("mystery_bracket_99.jpg").await;
        assert_eq!(guess.mapping_method, MappingMethod::BestGuess);
        assert!(guess.requires_manual_review);

        // Unextractable names are a defined outcome, not an error.
        let nothing = resolver.resolve("12.jpg").await;
        assert_eq!(nothing.mapping_method, MappingMethod::NoExtraction);
        assert!(nothing.requires_manual_review);
    }

    /// The review-threshold invariant holds across every method tier.
    #[tokio::test]
    async fn test_review_threshold_invariant() {
        let db = Arc::new(MockPartsDb::with_active_parts(["J1234567", "00001234", "12345"]));
        db.add_interchange("IC", "OLD12345", "12345");
        let resolver = PartNumberResolver::new(db);
        resolver.refresh_cache().await;

        for filename in [
            "J1234567.jpg",
            "OLD12345_1.jpg",
            "1234_2.jpg",
            "mystery_bracket_99.jpg",
            "12.jpg",
            "",
        ] {
            let result = resolver.resolve(filename).await;
            assert!(
                (0.0..=1.0).contains(&result.confidence_score),
                "confidence out of range for {filename:?}"
            );
            if result.confidence_score < REVIEW_THRESHOLD {
                assert!(
                    result.requires_manual_review,
                    "sub-threshold result not flagged for {filename:?}"
                );
            }
        }
    }

    /// Resolution never panics or errors, whatever the input looks like.
    #[tokio::test]
    async fn test_resolve_never_fails() {
        let resolver = PartNumberResolver::new(Arc::new(MockPartsDb::new()));

        let inputs = [
            String::new(),
            " ".to_string(),
            "!!!???".to_string(),
            "no extension".to_string(),
            "ünïcödé_12345.jpg".to_string(),
            "x".repeat(10_000),
        ];
        for input in inputs {
            let result = resolver.resolve(&input).await;
            assert_ne!(result.mapping_method, MappingMethod::Error);
        }
    }
}
