//! Part-number resolution orchestration.
//!
//! [`PartNumberResolver`] turns a raw image filename into a
//! [`PartMappingResult`] by trying the cheapest, most confident strategies
//! first: direct existence, then interchange lookup, then fuzzy variants,
//! then a best guess. A resolution call never fails: every failure mode is
//! encoded in the returned result, so a single database hiccup can never
//! abort a batch scan.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::{MappingError, Result};
use crate::extract::PartNumberExtractor;
use crate::interchange::InterchangeCache;
use crate::mapping::{PartMappingResult, PartNumberSuggestion};
use crate::oracle::PartsDatabase;

/// Minimum typed input before suggestions are computed.
const SUGGESTION_MIN_INPUT: usize = 2;

/// Maximum suggestions returned per request.
const SUGGESTION_LIMIT: usize = 10;

/// Width candidates are zero-padded to when trying fuzzy variants.
const FUZZY_PAD_WIDTH: usize = 8;

/// Letter prefixes tried when a bare number fails to match.
const FUZZY_PREFIXES: [&str; 2] = ["J", "A"];

/// Stateless-per-call resolution engine.
///
/// Construct once at process start with the parts database handle and share
/// via `Arc`; each [`resolve`](Self::resolve) call is independent and
/// side-effect-free apart from read queries.
pub struct PartNumberResolver {
    db: Arc<dyn PartsDatabase>,
    cache: InterchangeCache,
    extractor: PartNumberExtractor,
}

impl PartNumberResolver {
    /// Create a resolver with an empty interchange cache. Call
    /// [`refresh_cache`](Self::refresh_cache) once at startup to populate.
    pub fn new(db: Arc<dyn PartsDatabase>) -> Self {
        Self {
            db,
            cache: InterchangeCache::new(),
            extractor: PartNumberExtractor::new(),
        }
    }

    /// Rebuild the interchange cache from the parts database; returns the
    /// number of mappings now live. Safe to call while resolutions are in
    /// flight.
    pub async fn refresh_cache(&self) -> usize {
        self.cache.refresh(self.db.as_ref()).await
    }

    /// Number of interchange mappings currently cached.
    pub fn cached_mappings(&self) -> usize {
        self.cache.len()
    }

    /// Map a filename to a part number.
    ///
    /// Never returns an error and never panics: unexpected failures are
    /// converted into a terminal `error` result flagged for manual review.
    pub async fn resolve(&self, filename: &str) -> PartMappingResult {
        match self.try_resolve(filename).await {
            Ok(result) => {
                debug!(
                    filename,
                    method = %result.mapping_method,
                    part = result.mapped_part_number.as_deref().unwrap_or("-"),
                    confidence = result.confidence_score,
                    "resolved filename"
                );
                result
            }
            Err(e) => {
                error!(filename, error = %e, "resolution failed");
                PartMappingResult::failed(filename, e.to_string())
            }
        }
    }

    async fn try_resolve(&self, filename: &str) -> Result<PartMappingResult> {
        let candidates = self.extractor.extract(filename);
        if candidates.is_empty() {
            return Ok(PartMappingResult::no_extraction(filename));
        }

        let mut fuzzy_best: Option<String> = None;

        for candidate in &candidates {
            // Strongest first: the candidate is an active part as-is.
            if self.exists_soft(candidate).await? {
                return Ok(PartMappingResult::direct_match(
                    filename,
                    candidates.clone(),
                    candidate.clone(),
                ));
            }

            // Next: the candidate is an old number with a current
            // replacement in the interchange table.
            if let Some(mapping) = self.cache.lookup(candidate) {
                return Ok(PartMappingResult::interchange(
                    filename,
                    candidates.clone(),
                    mapping,
                ));
            }

            // Weakest: variant spellings of the candidate. A fuzzy hit is
            // recorded but never short-circuits the scan; a later candidate
            // may still produce a direct or interchange match.
            if fuzzy_best.is_none() {
                fuzzy_best = self.fuzzy_lookup(candidate).await?;
            }
        }

        if let Some(part_number) = fuzzy_best {
            return Ok(PartMappingResult::fuzzy_match(
                filename, candidates, part_number,
            ));
        }

        Ok(PartMappingResult::best_guess(filename, candidates))
    }

    /// Existence check with the degradation policy applied: a
    /// connection-level failure counts as "not found" for this call so the
    /// resolution can fall through to weaker strategies. Any other database
    /// error propagates and terminates the resolution as `error`.
    async fn exists_soft(&self, part_number: &str) -> Result<bool> {
        match self.db.active_part_exists(part_number).await {
            Ok(exists) => Ok(exists),
            Err(MappingError::Unavailable(reason)) => {
                warn!(part_number, %reason, "existence check unavailable; treating as not found");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Try variant spellings of a candidate against the active parts table.
    /// First hit wins. The unchanged candidate is not re-tried.
    async fn fuzzy_lookup(&self, candidate: &str) -> Result<Option<String>> {
        for variant in fuzzy_variants(candidate) {
            if variant != candidate && self.exists_soft(&variant).await? {
                debug!(candidate, %variant, "fuzzy variant matched");
                return Ok(Some(variant));
            }
        }
        Ok(None)
    }

    /// Autocomplete suggestions for manual part-number entry.
    ///
    /// Requires at least two typed characters; returns an empty list (never
    /// an error) on short input or database unavailability.
    pub async fn suggest(&self, filename: &str, partial_input: &str) -> Vec<PartNumberSuggestion> {
        let prefix = partial_input.trim().to_uppercase();
        if prefix.len() < SUGGESTION_MIN_INPUT {
            return Vec::new();
        }

        match self.db.search_active_parts(&prefix, SUGGESTION_LIMIT).await {
            Ok(parts) => parts
                .into_iter()
                .map(|details| {
                    let match_score = if details.part_number == prefix { 1.0 } else { 0.7 };
                    PartNumberSuggestion {
                        part_number: details.part_number,
                        description: details.title.or(details.description),
                        brand: details.brand,
                        match_score,
                        match_reason: "prefix_search".to_string(),
                    }
                })
                .collect(),
            Err(e) => {
                warn!(filename, %prefix, error = %e, "suggestion search failed");
                Vec::new()
            }
        }
    }

    /// Whether a part number exists and is active. Database failures count
    /// as invalid rather than erroring.
    pub async fn validate(&self, part_number: &str) -> bool {
        let normalized = part_number.trim().to_uppercase();
        if normalized.is_empty() {
            return false;
        }
        match self.db.active_part_exists(&normalized).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(part_number = %normalized, error = %e, "validation lookup failed");
                false
            }
        }
    }
}

/// Variant spellings tried during fuzzy matching, in priority order:
/// leading zeros stripped, zero-padded to eight characters, then the known
/// letter prefixes.
fn fuzzy_variants(candidate: &str) -> Vec<String> {
    let width = FUZZY_PAD_WIDTH;
    let mut variants = Vec::with_capacity(4);
    variants.push(candidate.trim_start_matches('0').to_string());
    variants.push(format!("{candidate:0>width$}"));
    for prefix in FUZZY_PREFIXES {
        variants.push(format!("{prefix}{candidate}"));
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{
        MappingMethod, BEST_GUESS_CONFIDENCE, DIRECT_MATCH_CONFIDENCE, FUZZY_MATCH_CONFIDENCE,
        INTERCHANGE_CONFIDENCE,
    };
    use crate::oracle::MockPartsDb;

    async fn resolver_with(db: MockPartsDb) -> (PartNumberResolver, Arc<MockPartsDb>) {
        let db = Arc::new(db);
        let resolver = PartNumberResolver::new(db.clone());
        resolver.refresh_cache().await;
        (resolver, db)
    }

    #[tokio::test]
    async fn test_direct_match() {
        let db = MockPartsDb::with_active_parts(["J1234567"]);
        let (resolver, _db) = resolver_with(db).await;

        let result = resolver.resolve("J1234567_detail.jpg").await;
        assert_eq!(result.extracted_numbers, vec!["J1234567"]);
        assert_eq!(result.mapped_part_number.as_deref(), Some("J1234567"));
        assert_eq!(result.mapping_method, MappingMethod::DirectMatch);
        assert_eq!(result.confidence_score, DIRECT_MATCH_CONFIDENCE);
        assert!(!result.requires_manual_review);
    }

    #[tokio::test]
    async fn test_interchange_mapping() {
        let db = MockPartsDb::with_active_parts(["12345"]);
        db.add_interchange("IC", "OLD12345", "12345");
        let (resolver, _db) = resolver_with(db).await;

        let result = resolver.resolve("OLD12345_1.jpg").await;
        assert_eq!(result.mapped_part_number.as_deref(), Some("12345"));
        assert_eq!(result.mapping_method, MappingMethod::InterchangeMapping);
        assert_eq!(result.confidence_score, INTERCHANGE_CONFIDENCE);
        assert!(!result.requires_manual_review);
        let mapping = result.interchange_mapping.expect("mapping recorded");
        assert_eq!(mapping.old_part_number, "OLD12345");
    }

    #[tokio::test]
    async fn test_counter_suffix_then_direct_match() {
        let db = MockPartsDb::with_active_parts(["12345"]);
        let (resolver, _db) = resolver_with(db).await;

        let result = resolver.resolve("12345 (2).jpg").await;
        assert_eq!(result.mapping_method, MappingMethod::DirectMatch);
        assert_eq!(result.mapped_part_number.as_deref(), Some("12345"));
        assert_eq!(result.confidence_score, DIRECT_MATCH_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_best_guess_when_nothing_matches() {
        let (resolver, _db) = resolver_with(MockPartsDb::new()).await;

        let result = resolver.resolve("unknown_part_123.jpg").await;
        assert_eq!(result.mapping_method, MappingMethod::BestGuess);
        assert_eq!(result.confidence_score, BEST_GUESS_CONFIDENCE);
        assert_eq!(result.mapped_part_number.as_deref(), Some("UNKNOWNPART123"));
        assert!(result.requires_manual_review);
    }

    #[tokio::test]
    async fn test_no_extraction_for_empty_filename() {
        let (resolver, _db) = resolver_with(MockPartsDb::new()).await;

        let result = resolver.resolve("").await;
        assert!(result.extracted_numbers.is_empty());
        assert!(result.mapped_part_number.is_none());
        assert_eq!(result.mapping_method, MappingMethod::NoExtraction);
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.requires_manual_review);
    }

    #[tokio::test]
    async fn test_fuzzy_zero_padding() {
        // "1234" only exists zero-padded in the master table.
        let db = MockPartsDb::with_active_parts(["00001234"]);
        let (resolver, _db) = resolver_with(db).await;

        let result = resolver.resolve("1234_2.jpg").await;
        assert_eq!(result.mapping_method, MappingMethod::FuzzyMatch);
        assert_eq!(result.mapped_part_number.as_deref(), Some("00001234"));
        assert_eq!(result.confidence_score, FUZZY_MATCH_CONFIDENCE);
        assert!(result.requires_manual_review);
    }

    #[tokio::test]
    async fn test_fuzzy_letter_prefix() {
        let db = MockPartsDb::with_active_parts(["J5556667"]);
        let (resolver, _db) = resolver_with(db).await;

        let result = resolver.resolve("5556667.jpg").await;
        assert_eq!(result.mapping_method, MappingMethod::FuzzyMatch);
        assert_eq!(result.mapped_part_number.as_deref(), Some("J5556667"));
    }

    #[tokio::test]
    async fn test_fuzzy_does_not_shadow_later_direct_match() {
        // First candidate only fuzzy-matches; a later candidate matches
        // directly and must win.
        let db = MockPartsDb::with_active_parts(["J00012345", "67890"]);
        let (resolver, _db) = resolver_with(db).await;

        // "00012345_67890" extracts "00012345" first (anchored prefix) and
        // "67890" second (embedded scan).
        let result = resolver.resolve("00012345_67890.jpg").await;
        assert_eq!(result.mapping_method, MappingMethod::DirectMatch);
        assert_eq!(result.mapped_part_number.as_deref(), Some("67890"));
    }

    #[tokio::test]
    async fn test_fuzzy_variant_order_prefers_zero_strip() {
        // Both the zero-stripped and the J-prefixed variants exist; the
        // zero-stripped spelling is tried first.
        let db = MockPartsDb::with_active_parts(["12345", "J0012345"]);
        let (resolver, _db) = resolver_with(db).await;

        let result = resolver.resolve("0012345_x.jpg").await;
        assert_eq!(result.mapping_method, MappingMethod::FuzzyMatch);
        assert_eq!(result.mapped_part_number.as_deref(), Some("12345"));
    }

    #[tokio::test]
    async fn test_unavailable_database_degrades_to_best_guess() {
        let db = MockPartsDb::with_active_parts(["J1234567"]);
        db.set_unavailable(true);
        let resolver = PartNumberResolver::new(Arc::new(db));

        // Connection-level failures are "not found" per call: the result is
        // a reviewable best guess, not an error.
        let result = resolver.resolve("J1234567.jpg").await;
        assert_eq!(result.mapping_method, MappingMethod::BestGuess);
        assert_eq!(result.mapped_part_number.as_deref(), Some("J1234567"));
        assert!(result.requires_manual_review);
    }

    #[tokio::test]
    async fn test_unexpected_failure_becomes_error_result() {
        let db = MockPartsDb::with_active_parts(["J1234567"]);
        db.set_query_failure(true);
        let resolver = PartNumberResolver::new(Arc::new(db));

        let result = resolver.resolve("J1234567.jpg").await;
        assert_eq!(result.mapping_method, MappingMethod::Error);
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.requires_manual_review);
        assert!(result.error_message.is_some());
    }

    #[tokio::test]
    async fn test_resolution_is_case_insensitive() {
        let db = MockPartsDb::with_active_parts(["J1234567"]);
        let (resolver, _db) = resolver_with(db).await;

        let lower = resolver.resolve("j1234567_2.jpg").await;
        let upper = resolver.resolve("J1234567_2.JPG").await;
        assert_eq!(lower.mapped_part_number, upper.mapped_part_number);
        assert_eq!(lower.mapping_method, upper.mapping_method);
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let db = MockPartsDb::with_active_parts(["12345"]);
        db.add_interchange("IC", "OLD12345", "12345");
        let (resolver, _db) = resolver_with(db).await;

        let first = resolver.resolve("OLD12345_1.jpg").await;
        let second = resolver.resolve("OLD12345_1.jpg").await;
        assert_eq!(first.mapped_part_number, second.mapped_part_number);
        assert_eq!(first.mapping_method, second.mapping_method);
        assert_eq!(first.confidence_score, second.confidence_score);
        assert_eq!(first.extracted_numbers, second.extracted_numbers);
    }

    #[tokio::test]
    async fn test_suggest_requires_two_characters() {
        let db = MockPartsDb::with_active_parts(["J1234567"]);
        let (resolver, _db) = resolver_with(db).await;

        assert!(resolver.suggest("x.jpg", "J").await.is_empty());
        assert!(resolver.suggest("x.jpg", " ").await.is_empty());
        assert!(!resolver.suggest("x.jpg", "J1").await.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_returns_enriched_ordered_hits() {
        use crate::oracle::PartDetails;

        let db = MockPartsDb::new();
        db.add_part_details(PartDetails {
            part_number: "J1234567".into(),
            brand: Some("Apex Driveline".into()),
            title: Some("Axle Shaft".into()),
            description: None,
            keywords: None,
        });
        db.add_active_part("J1234568");
        let (resolver, _db) = resolver_with(db).await;

        let suggestions = resolver.suggest("axle.jpg", "j12").await;
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].part_number, "J1234567");
        assert_eq!(suggestions[0].description.as_deref(), Some("Axle Shaft"));
        assert_eq!(suggestions[0].brand.as_deref(), Some("Apex Driveline"));
        assert_eq!(suggestions[0].match_reason, "prefix_search");
    }

    #[tokio::test]
    async fn test_suggest_soft_fails_on_outage() {
        let db = MockPartsDb::with_active_parts(["J1234567"]);
        db.set_unavailable(true);
        let resolver = PartNumberResolver::new(Arc::new(db));

        assert!(resolver.suggest("x.jpg", "J12").await.is_empty());
    }

    #[tokio::test]
    async fn test_validate() {
        let db = MockPartsDb::with_active_parts(["J1234567"]);
        let (resolver, db) = resolver_with(db).await;

        assert!(resolver.validate(" j1234567 ").await);
        assert!(!resolver.validate("J9999999").await);
        assert!(!resolver.validate("").await);

        db.set_unavailable(true);
        assert!(!resolver.validate("J1234567").await);
    }

    #[test]
    fn test_fuzzy_variants_order() {
        assert_eq!(
            fuzzy_variants("0012345"),
            vec!["12345", "00012345", "J0012345", "A0012345"]
        );
    }
}
