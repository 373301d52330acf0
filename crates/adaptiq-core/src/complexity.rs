//! Content complexity estimation.
//!
//! A crude proxy for how much specialized vocabulary a chapter carries:
//! TF-IDF weights over a one-document corpus (so IDF is constant and the
//! weights are L2-normalized term frequencies), averaged over the terms
//! present. Text dominated by a few repeated terms scores high; long text
//! with a broad vocabulary scores low.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::FallbackReason;

/// Value reported when estimation cannot produce a number.
pub const NEUTRAL_COMPLEXITY: f64 = 0.5;

/// Tokens shorter than this are ignored.
const MIN_TOKEN_LEN: usize = 2;

/// Outcome of a complexity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Complexity {
    /// The estimator produced a value from the text.
    Computed { value: f64 },
    /// The estimator fell back to [`NEUTRAL_COMPLEXITY`].
    Defaulted { reason: FallbackReason },
}

impl Complexity {
    pub fn value(&self) -> f64 {
        match self {
            Complexity::Computed { value } => *value,
            Complexity::Defaulted { .. } => NEUTRAL_COMPLEXITY,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Complexity::Defaulted { .. })
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Complexity::Computed { .. } => None,
            Complexity::Defaulted { reason } => Some(*reason),
        }
    }
}

/// Scores raw chapter text. Holds the stop-word table across calls; every
/// call is otherwise independent.
#[derive(Debug, Clone)]
pub struct ComplexityEstimator {
    stop_words: HashSet<String>,
}

impl Default for ComplexityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplexityEstimator {
    /// Estimator with the built-in English stop-word list.
    pub fn new() -> Self {
        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Add more stop words (e.g. boilerplate from a textbook series).
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    /// Estimate the complexity of `text`. Never fails.
    pub fn estimate_complexity(&self, text: &str) -> Complexity {
        if text.trim().is_empty() {
            return Complexity::Defaulted {
                reason: FallbackReason::EmptyText,
            };
        }

        let weights = self.term_weights(text);
        if weights.is_empty() {
            tracing::debug!("no content terms in chapter text, using neutral complexity");
            return Complexity::Defaulted {
                reason: FallbackReason::NoContentTerms,
            };
        }

        let value = weights.values().sum::<f64>() / weights.len() as f64;
        if !value.is_finite() {
            tracing::warn!("complexity estimate was not finite, using neutral complexity");
            return Complexity::Defaulted {
                reason: FallbackReason::NonFinite,
            };
        }

        Complexity::Computed { value }
    }

    /// L2-normalized term frequencies of the content terms in `text`.
    pub fn term_weights(&self, text: &str) -> HashMap<String, f64> {
        let mut counts: HashMap<String, f64> = HashMap::new();
        for token in tokenize(text) {
            if !self.stop_words.contains(&token) {
                *counts.entry(token).or_insert(0.0) += 1.0;
            }
        }

        let norm = counts.values().map(|c| c * c).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in counts.values_mut() {
                *weight /= norm;
            }
        }
        counts
    }
}

/// Lowercased word tokens of at least two characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "done",
    "down", "due", "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc",
    "even", "ever", "every", "everyone", "everything", "everywhere", "except", "few", "first",
    "for", "former", "formerly", "from", "further", "had", "has", "have", "he", "hence", "her",
    "here", "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his", "how",
    "however", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself", "just", "last",
    "latter", "least", "less", "many", "may", "me", "meanwhile", "might", "more", "moreover",
    "most", "mostly", "much", "must", "my", "myself", "namely", "neither", "never",
    "nevertheless", "next", "no", "nobody", "none", "nor", "not", "nothing", "now", "nowhere",
    "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others",
    "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "please",
    "rather", "re", "same", "see", "seem", "seemed", "seeming", "seems", "several", "she",
    "should", "since", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "than", "that", "the", "their", "them",
    "themselves", "then", "thence", "there", "thereafter", "thereby", "therefore", "therein",
    "these", "they", "this", "those", "though", "through", "throughout", "thru", "thus", "to",
    "together", "too", "toward", "towards", "under", "until", "up", "upon", "us", "very", "via",
    "was", "we", "well", "were", "what", "whatever", "when", "whence", "whenever", "where",
    "whereas", "whereby", "wherein", "whether", "which", "while", "who", "whoever", "whole",
    "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your",
    "yours", "yourself", "yourselves",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_defaults() {
        let est = ComplexityEstimator::new();
        let c = est.estimate_complexity("");
        assert_eq!(c.value(), NEUTRAL_COMPLEXITY);
        assert_eq!(c.fallback_reason(), Some(FallbackReason::EmptyText));

        let c = est.estimate_complexity("   \n\t ");
        assert_eq!(c.fallback_reason(), Some(FallbackReason::EmptyText));
    }

    #[test]
    fn stop_words_only_defaults() {
        let est = ComplexityEstimator::new();
        let c = est.estimate_complexity("the and of to it is a");
        assert!(c.is_defaulted());
        assert_eq!(c.fallback_reason(), Some(FallbackReason::NoContentTerms));
        assert_eq!(c.value(), 0.5);
    }

    #[test]
    fn single_term_scores_one() {
        let est = ComplexityEstimator::new();
        let c = est.estimate_complexity("photosynthesis photosynthesis");
        assert_eq!(c, Complexity::Computed { value: 1.0 });
    }

    #[test]
    fn distinct_terms_average_to_inverse_sqrt() {
        let est = ComplexityEstimator::new();
        let c = est.estimate_complexity("mitochondria ribosome nucleus membrane");
        assert!(!c.is_defaulted());
        assert!((c.value() - 0.5).abs() < 1e-12, "got {}", c.value());
    }

    #[test]
    fn computed_half_is_distinguishable_from_default() {
        let est = ComplexityEstimator::new();
        let computed = est.estimate_complexity("mitochondria ribosome nucleus membrane");
        let defaulted = est.estimate_complexity("");
        assert_eq!(computed.value(), defaulted.value());
        assert_ne!(computed, defaulted);
    }

    #[test]
    fn repetitive_text_scores_higher_than_broad_text() {
        let est = ComplexityEstimator::new();
        let narrow = est.estimate_complexity("vector vector vector matrix matrix");
        let broad = est.estimate_complexity(
            "vector matrix scalar tensor field ring group module lattice algebra",
        );
        assert!(narrow.value() > broad.value());
    }

    #[test]
    fn tokenizer_lowercases_and_drops_short_tokens() {
        let tokens: Vec<String> = tokenize("Newton's 3rd LAW: F = m*a").collect();
        assert_eq!(tokens, vec!["newton", "3rd", "law"]);
    }

    #[test]
    fn custom_stop_words() {
        let est = ComplexityEstimator::new().with_stop_words(["Chapter", "exercise"]);
        let c = est.estimate_complexity("chapter exercise CHAPTER");
        assert_eq!(c.fallback_reason(), Some(FallbackReason::NoContentTerms));
    }

    #[test]
    fn weights_are_unit_length() {
        let est = ComplexityEstimator::new();
        let weights = est.term_weights("acid base acid salt acid base");
        let norm: f64 = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(weights["acid"] > weights["base"]);
    }
}
