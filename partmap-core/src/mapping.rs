//! Data model for part-number mapping decisions.
//!
//! A [`PartMappingResult`] is created fresh per resolution call and never
//! mutated afterwards. The resolver does not persist results; callers decide
//! whether and where to store them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interchange::InterchangeMapping;

/// Confidence assigned when a candidate is found directly in the active
/// parts table.
pub const DIRECT_MATCH_CONFIDENCE: f64 = 0.95;

/// Confidence assigned when a candidate resolves through the interchange
/// table.
pub const INTERCHANGE_CONFIDENCE: f64 = 0.85;

/// Confidence assigned when only a fuzzy variant of a candidate matched.
pub const FUZZY_MATCH_CONFIDENCE: f64 = 0.6;

/// Confidence assigned when no strategy matched and the first extracted
/// candidate is returned as a guess.
pub const BEST_GUESS_CONFIDENCE: f64 = 0.3;

/// Results below this confidence always require manual review.
pub const REVIEW_THRESHOLD: f64 = 0.8;

/// Strategy that produced a mapping decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMethod {
    /// Extracted candidate exists in the active parts table.
    DirectMatch,
    /// Extracted candidate is an old number with a current replacement.
    InterchangeMapping,
    /// A variant (zero-padding, letter prefix) of a candidate matched.
    FuzzyMatch,
    /// Nothing matched; the first extracted candidate is a guess.
    BestGuess,
    /// No candidate could be extracted from the filename.
    NoExtraction,
    /// Resolution failed unexpectedly; see `error_message`.
    Error,
}

impl std::fmt::Display for MappingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::DirectMatch => "direct_match",
            Self::InterchangeMapping => "interchange_mapping",
            Self::FuzzyMatch => "fuzzy_match",
            Self::BestGuess => "best_guess",
            Self::NoExtraction => "no_extraction",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Outcome of mapping one filename to a part number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartMappingResult {
    /// Filename exactly as it was handed to the resolver.
    pub original_filename: String,
    /// Candidate part numbers found in the filename, extraction-rank order.
    pub extracted_numbers: Vec<String>,
    /// The resolved part number, when any strategy produced one.
    pub mapped_part_number: Option<String>,
    /// Fixed-tier confidence in `[0, 1]` driving the review gate.
    pub confidence_score: f64,
    /// Strategy that produced this decision.
    pub mapping_method: MappingMethod,
    /// The interchange row used, for `interchange_mapping` decisions.
    pub interchange_mapping: Option<InterchangeMapping>,
    /// Whether a human must confirm this decision before renditions run.
    pub requires_manual_review: bool,
    /// Failure description, for `error` decisions.
    pub error_message: Option<String>,
    /// When this decision was produced.
    pub created_at: DateTime<Utc>,
}

impl PartMappingResult {
    fn base(filename: &str, method: MappingMethod, confidence: f64) -> Self {
        Self {
            original_filename: filename.to_string(),
            extracted_numbers: Vec::new(),
            mapped_part_number: None,
            confidence_score: confidence,
            mapping_method: method,
            interchange_mapping: None,
            requires_manual_review: confidence < REVIEW_THRESHOLD,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// No candidate could be extracted from the filename.
    pub fn no_extraction(filename: &str) -> Self {
        Self::base(filename, MappingMethod::NoExtraction, 0.0)
    }

    /// Candidate found directly in the active parts table.
    pub fn direct_match(filename: &str, candidates: Vec<String>, part_number: String) -> Self {
        Self {
            extracted_numbers: candidates,
            mapped_part_number: Some(part_number),
            ..Self::base(filename, MappingMethod::DirectMatch, DIRECT_MATCH_CONFIDENCE)
        }
    }

    /// Candidate resolved through the interchange table to its replacement.
    pub fn interchange(
        filename: &str,
        candidates: Vec<String>,
        mapping: InterchangeMapping,
    ) -> Self {
        Self {
            extracted_numbers: candidates,
            mapped_part_number: Some(mapping.new_part_number.clone()),
            interchange_mapping: Some(mapping),
            ..Self::base(
                filename,
                MappingMethod::InterchangeMapping,
                INTERCHANGE_CONFIDENCE,
            )
        }
    }

    /// A fuzzy variant of one of the candidates matched an active part.
    pub fn fuzzy_match(filename: &str, candidates: Vec<String>, part_number: String) -> Self {
        Self {
            extracted_numbers: candidates,
            mapped_part_number: Some(part_number),
            ..Self::base(filename, MappingMethod::FuzzyMatch, FUZZY_MATCH_CONFIDENCE)
        }
    }

    /// Nothing matched; surface the first candidate for the reviewer.
    pub fn best_guess(filename: &str, candidates: Vec<String>) -> Self {
        Self {
            mapped_part_number: candidates.first().cloned(),
            extracted_numbers: candidates,
            ..Self::base(filename, MappingMethod::BestGuess, BEST_GUESS_CONFIDENCE)
        }
    }

    /// Resolution failed unexpectedly. The result always carries a message
    /// and is flagged for manual review.
    pub fn failed(filename: &str, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            requires_manual_review: true,
            ..Self::base(filename, MappingMethod::Error, 0.0)
        }
    }
}

/// A human-supplied correction to a resolver decision.
///
/// Appended to the owning file's processing history and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualOverride {
    /// Identifier of the file record being corrected.
    pub file_id: String,
    /// What is being overridden (e.g. `part_number`).
    pub override_type: String,
    /// The value the system had determined, if any.
    pub system_value: Option<String>,
    /// The value the human supplied; authoritative from this point on.
    pub user_value: String,
    /// Optional free-text justification.
    pub override_reason: Option<String>,
    /// Who made the correction.
    pub overridden_by: String,
    /// When the correction was made.
    pub overridden_at: DateTime<Utc>,
}

/// An autocomplete suggestion for manual part-number entry. Ephemeral;
/// computed on demand and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartNumberSuggestion {
    pub part_number: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    /// Relevance in `[0, 1]`; exact prefix equality scores highest.
    pub match_score: f64,
    /// Why this entry was suggested.
    pub match_reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_serializes_to_snake_case() {
        let json = serde_json::to_string(&MappingMethod::DirectMatch).unwrap();
        assert_eq!(json, "\"direct_match\"");
        let json = serde_json::to_string(&MappingMethod::NoExtraction).unwrap();
        assert_eq!(json, "\"no_extraction\"");
    }

    #[test]
    fn test_method_display_matches_serde() {
        for method in [
            MappingMethod::DirectMatch,
            MappingMethod::InterchangeMapping,
            MappingMethod::FuzzyMatch,
            MappingMethod::BestGuess,
            MappingMethod::NoExtraction,
            MappingMethod::Error,
        ] {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method));
        }
    }

    #[test]
    fn test_direct_match_does_not_require_review() {
        let result =
            PartMappingResult::direct_match("A123456.jpg", vec!["A123456".into()], "A123456".into());
        assert_eq!(result.confidence_score, DIRECT_MATCH_CONFIDENCE);
        assert!(!result.requires_manual_review);
    }

    #[test]
    fn test_low_confidence_requires_review() {
        let fuzzy =
            PartMappingResult::fuzzy_match("x.jpg", vec!["1234".into()], "00001234".into());
        assert!(fuzzy.requires_manual_review);

        let guess = PartMappingResult::best_guess("x.jpg", vec!["1234".into()]);
        assert!(guess.requires_manual_review);
        assert_eq!(guess.mapped_part_number.as_deref(), Some("1234"));
    }

    #[test]
    fn test_failed_always_carries_message_and_review_flag() {
        let result = PartMappingResult::failed("x.jpg", "connection dropped");
        assert_eq!(result.mapping_method, MappingMethod::Error);
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.requires_manual_review);
        assert_eq!(result.error_message.as_deref(), Some("connection dropped"));
    }
}
