// Keyword extraction — content words out of raw text.
//
// The analyzer segments the text; this module keeps nouns, verbs and
// adjectives, maps each to its dictionary form, and drops a small stop list of
// light verbs and function-like nouns that show up in every topic. Duplicates
// are kept: downstream weighting is by frequency.

use std::collections::HashSet;

use tracing::debug;

use crate::analyzer::traits::{AnalysisError, Analyzer};

/// High-frequency forms that carry no topic on their own.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "する", "ある", "いる", "なる", "こと", "もの", "これ", "それ", "て", "の",
];

/// Extracts normalized keywords from text via an [`Analyzer`].
pub struct KeywordExtractor<A> {
    analyzer: A,
    stop_words: HashSet<String>,
}

impl<A: Analyzer> KeywordExtractor<A> {
    /// Create an extractor with the default stop list.
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Replace the stop list.
    pub fn with_stop_words<I, S>(mut self, stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = stop_words.into_iter().map(Into::into).collect();
        self
    }

    /// Add to the stop list, keeping what is already there.
    pub fn extend_stop_words<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words.extend(extra.into_iter().map(Into::into));
        self
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Extract keywords from `text`, in input order with duplicates.
    ///
    /// Blank text yields an empty sequence without calling the analyzer.
    pub async fn extract(&self, text: &str) -> Result<Vec<String>, AnalysisError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let tokens = self.analyzer.analyze(text).await?;
        let token_count = tokens.len();

        let keywords: Vec<String> = tokens
            .iter()
            .filter(|token| token.pos.is_content())
            .map(|token| token.normalized())
            .filter(|word| !self.stop_words.contains(*word))
            .map(str::to_string)
            .collect();

        debug!(
            tokens = token_count,
            keywords = keywords.len(),
            "Extracted keywords"
        );

        Ok(keywords)
    }
}
