// Topic-change detection.
//
// The "current topic" is the pooled keyword distribution of the last few
// history utterances. A new utterance whose own distribution is too far from
// it, by cosine similarity, is a topic change. Each call recomputes both sides
// from the raw texts; the caller owns the conversation history.

use serde::Serialize;
use tracing::{debug, info};

use super::keywords::KeywordExtractor;
use super::overlap::cosine_similarity;
use super::vector::to_vector;
use crate::analyzer::traits::{AnalysisError, Analyzer};

/// Similarity below which a new utterance counts as a topic change.
pub const DEFAULT_THRESHOLD: f64 = 0.25;

/// How many trailing history entries make up the current topic.
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Cap on the keywords reported back for the new utterance.
pub const MAX_NEW_KEYWORDS: usize = 5;

/// Tunable parameters of the decision policy. Fixed for a detector's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub threshold: f64,
    pub window_size: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

/// The verdict for one new utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub is_topic_change: bool,
    /// Cosine similarity to the current topic, rounded to 3 decimal places
    pub similarity: f64,
    /// The threshold the verdict was made against
    pub threshold: f64,
    /// Up to five keywords of the new utterance, in first-occurrence order
    pub new_keywords: Vec<String>,
}

/// The trailing `size` entries of `history`.
pub fn trailing_window<S>(history: &[S], size: usize) -> &[S] {
    &history[history.len().saturating_sub(size)..]
}

/// Detects topic changes between a history window and a new utterance.
pub struct TopicDetector<A> {
    extractor: KeywordExtractor<A>,
    config: DetectorConfig,
}

impl<A: Analyzer> TopicDetector<A> {
    pub fn new(extractor: KeywordExtractor<A>, config: DetectorConfig) -> Self {
        Self { extractor, config }
    }

    /// Detector with the default stop list and reference parameters.
    pub fn with_defaults(analyzer: A) -> Self {
        Self::new(KeywordExtractor::new(analyzer), DetectorConfig::default())
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn extractor(&self) -> &KeywordExtractor<A> {
        &self.extractor
    }

    /// Decide whether `new_utterance` departs from the topic of `history`.
    ///
    /// Only the last `window_size` history entries are considered. An empty
    /// history has no topic vector, so similarity is 0.0 and any positive
    /// threshold reports a change.
    pub async fn detect<S: AsRef<str>>(
        &self,
        history: &[S],
        new_utterance: &str,
    ) -> Result<DetectionResult, AnalysisError> {
        let (result, _) = self.detect_with_keywords(history, new_utterance).await?;
        Ok(result)
    }

    /// Like [`detect`](Self::detect), but also hands back every keyword of
    /// the new utterance (duplicates included), so callers that display them
    /// don't analyze the utterance a second time.
    pub async fn detect_with_keywords<S: AsRef<str>>(
        &self,
        history: &[S],
        new_utterance: &str,
    ) -> Result<(DetectionResult, Vec<String>), AnalysisError> {
        let window = trailing_window(history, self.config.window_size);

        let mut history_keywords = Vec::new();
        for text in window {
            history_keywords.extend(self.extractor.extract(text.as_ref()).await?);
        }

        let current = to_vector(&history_keywords);
        let new_keywords = self.extractor.extract(new_utterance).await?;
        let incoming = to_vector(&new_keywords);
        let similarity = cosine_similarity(&current, &incoming);

        debug!(
            window = window.len(),
            history_terms = current.len(),
            new_terms = incoming.len(),
            "Built topic vectors"
        );

        let result = DetectionResult {
            is_topic_change: similarity < self.config.threshold,
            similarity: round_to_millis(similarity),
            threshold: self.config.threshold,
            new_keywords: incoming.leading_terms(MAX_NEW_KEYWORDS),
        };

        info!(
            similarity = result.similarity,
            threshold = result.threshold,
            topic_change = result.is_topic_change,
            "Topic change check"
        );

        Ok((result, new_keywords))
    }
}

fn round_to_millis(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
