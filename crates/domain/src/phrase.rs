//! Trigger phrases — normalisation and fuzzy best-match scoring.

use crate::error::PhraseError;

/// Default minimum score for a transcript to dispatch.
pub const DEFAULT_MATCH_THRESHOLD: u8 = 50;

/// Scores the similarity of two strings on a 0–100 scale.
pub type Scorer = fn(&str, &str) -> u8;

/// Canonical form of a phrase: trimmed and lower-cased.
///
/// # Errors
///
/// [`PhraseError::Empty`] if nothing is left after trimming.
pub fn normalize(phrase: &str) -> Result<String, PhraseError> {
    let normalized = phrase.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(PhraseError::Empty);
    }
    Ok(normalized)
}

/// Case-insensitive normalized Levenshtein similarity, scaled to 0–100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ratio(a: &str, b: &str) -> u8 {
    let similarity = strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase());
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

/// The winning phrase for a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseMatch<'a> {
    pub phrase: &'a str,
    pub score: u8,
}

/// Single best-match strategy with an inclusive threshold.
#[derive(Debug, Clone, Copy)]
pub struct PhraseMatcher {
    threshold: u8,
    scorer: Scorer,
}

impl Default for PhraseMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl PhraseMatcher {
    #[must_use]
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            scorer: ratio,
        }
    }

    /// Replace the scoring function.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Pick the highest-scoring candidate (first one wins ties) and return it
    /// when its score is at least the threshold. Never returns more than one.
    pub fn best_match<'a, I>(&self, transcript: &str, candidates: I) -> Option<PhraseMatch<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<PhraseMatch<'a>> = None;
        for phrase in candidates {
            let score = (self.scorer)(transcript, phrase);
            if best.is_none_or(|b| score > b.score) {
                best = Some(PhraseMatch { phrase, score });
            }
        }
        best.filter(|m| m.score >= self.threshold)
    }
}
