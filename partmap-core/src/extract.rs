//! Filename pattern extraction.
//!
//! Designers name image files loosely: `12345_2.jpg`, `12345 (2).jpg`,
//! `J1234567_detail.psd`, `apex_A12345_v2.tif`. This module pulls a short
//! ranked list of plausible part-number substrings out of a raw filename,
//! highest-confidence pattern first. Extraction is a pure function of its
//! input: no I/O, no hidden state, never fails.

use std::path::Path;

use regex::Regex;

/// Maximum number of candidates returned per filename.
const MAX_CANDIDATES: usize = 3;

/// Candidates shorter than this are discarded (a part number is at least
/// four digits).
const MIN_CANDIDATE_LEN: usize = 4;

/// Extracts candidate part numbers from raw image filenames.
///
/// Construct once at process start and share; the compiled patterns are
/// immutable and the extractor is `Send + Sync`.
pub struct PartNumberExtractor {
    /// 0-2 leading letters followed by 4-8 digits, anchored at the start.
    prefix: Regex,
    /// Trailing `_<digits>` counter, e.g. `12345_2`.
    trailing_counter: Regex,
    /// Trailing `(<digits>)` counter, e.g. `12345 (2)`.
    paren_counter: Regex,
    /// Known descriptive suffixes appended by designers.
    view_suffix: Regex,
    /// 0-2 letters + 4-8 digits anywhere in the stem.
    embedded: Regex,
}

impl PartNumberExtractor {
    pub fn new() -> Self {
        // Hard-coded patterns; compilation cannot fail.
        Self {
            prefix: Regex::new(r"^[A-Z]{0,2}[0-9]{4,8}").expect("prefix pattern"),
            trailing_counter: Regex::new(r"^(.+?)_[0-9]+$").expect("counter pattern"),
            paren_counter: Regex::new(r"^(.+?)\s*\([0-9]+\)$").expect("paren pattern"),
            view_suffix: Regex::new(r"^(.+?)(?:_DETAIL|_MAIN|_FRONT|_BACK|_TOP|_BOTTOM)$")
                .expect("suffix pattern"),
            embedded: Regex::new(r"[A-Z]{0,2}[0-9]{4,8}").expect("embedded pattern"),
        }
    }

    /// Extract up to three candidate part numbers from `filename`.
    ///
    /// Rules are applied in fixed order, accumulating unique matches in
    /// first-seen order. Filenames with no qualifying substring return an
    /// empty vector.
    pub fn extract(&self, filename: &str) -> Vec<String> {
        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_uppercase();

        let mut candidates: Vec<String> = Vec::new();

        // Rule: anchored letter-prefix pattern on the full stem.
        if let Some(m) = self.prefix.find(&stem) {
            push_unique(&mut candidates, m.as_str());
        }

        // Rules: strip a trailing counter or view suffix, then retry the
        // anchored pattern on the remainder. The remainder itself qualifies
        // as a candidate when it is already a clean alphanumeric run (a
        // plausible part number cannot contain separators).
        for stripper in [&self.trailing_counter, &self.paren_counter, &self.view_suffix] {
            if let Some(caps) = stripper.captures(&stem) {
                let remainder = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                if remainder.chars().all(|c| c.is_ascii_alphanumeric()) {
                    push_unique(&mut candidates, remainder);
                }
                if let Some(m) = self.prefix.find(remainder) {
                    push_unique(&mut candidates, m.as_str());
                }
            }
        }

        // Rule: part-like sequences embedded anywhere in the stem.
        for m in self.embedded.find_iter(&stem) {
            push_unique(&mut candidates, m.as_str());
        }

        // Fallback: nothing pattern-shaped found, take the whole stem with
        // separators stripped.
        if candidates.is_empty() {
            let cleaned: String = stem.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
            push_unique(&mut candidates, &cleaned);
        }

        candidates.truncate(MAX_CANDIDATES);
        candidates
    }
}

impl Default for PartNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn push_unique(candidates: &mut Vec<String>, candidate: &str) {
    if candidate.len() >= MIN_CANDIDATE_LEN && !candidates.iter().any(|c| c == candidate) {
        candidates.push(candidate.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(filename: &str) -> Vec<String> {
        PartNumberExtractor::new().extract(filename)
    }

    #[test]
    fn test_plain_numeric_stem() {
        assert_eq!(extract("12345.jpg"), vec!["12345"]);
    }

    #[test]
    fn test_letter_prefix_stem() {
        assert_eq!(extract("J1234567.psd"), vec!["J1234567"]);
        assert_eq!(extract("A5550.png"), vec!["A5550"]);
    }

    #[test]
    fn test_trailing_counter_stripped() {
        assert_eq!(extract("12345_2.jpg"), vec!["12345"]);
    }

    #[test]
    fn test_paren_counter_stripped() {
        assert_eq!(extract("12345 (2).jpg"), vec!["12345"]);
    }

    #[test]
    fn test_view_suffix_stripped() {
        assert_eq!(extract("J1234567_detail.jpg"), vec!["J1234567"]);
        assert_eq!(extract("J1234567_back.jpg"), vec!["J1234567"]);
    }

    #[test]
    fn test_old_style_number_with_counter() {
        // "OLD12345" has a three-letter prefix, so only the counter rule
        // recovers it whole; the embedded scan then finds a two-letter tail.
        let candidates = extract("OLD12345_1.jpg");
        assert_eq!(candidates[0], "OLD12345");
        assert!(candidates.len() <= 3);
    }

    #[test]
    fn test_embedded_number_in_decorated_name() {
        let candidates = extract("apex_A12345_detail.jpg");
        assert!(candidates.contains(&"A12345".to_string()));
    }

    #[test]
    fn test_embedded_number_mid_stem() {
        assert_eq!(extract("part_12345_main_view.tiff"), vec!["12345"]);
    }

    #[test]
    fn test_fallback_whole_stem() {
        assert_eq!(extract("unknown_part_123.jpg"), vec!["UNKNOWNPART123"]);
    }

    #[test]
    fn test_no_candidates_for_short_stems() {
        assert!(extract("12.jpg").is_empty());
        assert!(extract("a_b.png").is_empty());
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert!(extract("").is_empty());
        assert!(extract("...").is_empty());
        assert!(extract("§§§.jpg").is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(extract("j1234567_2.jpg"), extract("J1234567_2.JPG"));
    }

    #[test]
    fn test_at_most_three_candidates() {
        let candidates = extract("1111_2222_3333_4444_5555.jpg");
        assert!(candidates.len() <= 3);
    }

    #[test]
    fn test_deterministic() {
        let extractor = PartNumberExtractor::new();
        let first = extractor.extract("apex_A12345_detail (3).jpg");
        for _ in 0..10 {
            assert_eq!(extractor.extract("apex_A12345_detail (3).jpg"), first);
        }
    }

    #[test]
    fn test_long_input_does_not_panic() {
        let long = format!("{}.jpg", "X9".repeat(4096));
        let _ = extract(&long);
    }
}
