// Lexicon-driven analyzer.
//
// Segments text by greedy longest match against a fixed word list. Characters
// not covered by any entry are dropped, roughly the way particles and
// punctuation fall out of keyword extraction anyway. Deterministic and free of
// external processes, which makes it the analyzer of choice for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use super::traits::{AnalysisError, Analyzer, PartOfSpeech, Token};

/// In-process analyzer over a surface-form lexicon.
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer {
    entries: HashMap<String, Token>,
    /// Length in chars of the longest surface form
    longest: usize,
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lexicon entry. Later entries replace earlier ones with the same surface.
    pub fn with_entry(mut self, surface: &str, pos: PartOfSpeech, base_form: Option<&str>) -> Self {
        self.longest = self.longest.max(surface.chars().count());
        self.entries
            .insert(surface.to_string(), Token::new(surface, pos, base_form));
        self
    }

    pub fn noun(self, surface: &str) -> Self {
        self.with_entry(surface, PartOfSpeech::Noun, Some(surface))
    }

    pub fn verb(self, surface: &str, base_form: &str) -> Self {
        self.with_entry(surface, PartOfSpeech::Verb, Some(base_form))
    }

    pub fn adjective(self, surface: &str, base_form: &str) -> Self {
        self.with_entry(surface, PartOfSpeech::Adjective, Some(base_form))
    }

    /// A function word: recognized, but never a keyword.
    pub fn particle(self, surface: &str) -> Self {
        self.with_entry(surface, PartOfSpeech::Other, None)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Segment `text` by greedy longest match.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        // Byte offsets of every char boundary, including the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();

        let mut tokens = Vec::new();
        let mut at = 0;
        while at + 1 < bounds.len() {
            let remaining = bounds.len() - 1 - at;
            let matched = (1..=self.longest.min(remaining)).rev().find_map(|n| {
                self.entries
                    .get(&text[bounds[at]..bounds[at + n]])
                    .map(|token| (n, token))
            });

            match matched {
                Some((n, token)) => {
                    tokens.push(token.clone());
                    at += n;
                }
                None => at += 1,
            }
        }
        tokens
    }
}

#[async_trait]
impl Analyzer for LexiconAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Vec<Token>, AnalysisError> {
        Ok(self.tokenize(text))
    }
}
