// Analyzer trait — the swap-ready abstraction over morphological analysis.
//
// The topic detector never talks to CaboCha directly. It asks an Analyzer to
// turn text into tokens, so the keyword logic can be tested against canned
// lexicons and the real binary can be swapped for a library binding later.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Coarse part-of-speech category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Other,
}

impl PartOfSpeech {
    /// Parse the analyzer's category string (feature index 0).
    pub fn from_category(category: &str) -> Self {
        match category {
            "名詞" => PartOfSpeech::Noun,
            "動詞" => PartOfSpeech::Verb,
            "形容詞" => PartOfSpeech::Adjective,
            _ => PartOfSpeech::Other,
        }
    }

    /// Whether tokens of this category carry topic content.
    pub fn is_content(self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun | PartOfSpeech::Verb | PartOfSpeech::Adjective
        )
    }
}

/// A single analyzed word unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The form as written in the input
    pub surface: String,
    pub pos: PartOfSpeech,
    /// Dictionary form, when the analyzer knows one
    pub base_form: Option<String>,
}

impl Token {
    pub fn new(surface: &str, pos: PartOfSpeech, base_form: Option<&str>) -> Self {
        Self {
            surface: surface.to_string(),
            pos,
            base_form: base_form.map(str::to_string),
        }
    }

    /// The base form when it is usable, otherwise the surface form.
    ///
    /// MeCab-style dictionaries write `*` for "no base form", so that
    /// placeholder is treated the same as a missing value.
    pub fn normalized(&self) -> &str {
        match self.base_form.as_deref() {
            Some(base) if !base.is_empty() && base != "*" => base,
            _ => &self.surface,
        }
    }
}

/// Failures at the analyzer boundary.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The analyzer could not be invoked, exited with an error, or produced
    /// output that could not be read at all.
    #[error("analysis failed: {0}")]
    Failure(String),

    /// The analyzer did not finish within the configured bound.
    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for turning text into a sequence of tokens. Async because the
/// default implementation waits on a child process.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze a text and return its tokens in input order.
    async fn analyze(&self, text: &str) -> Result<Vec<Token>, AnalysisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(PartOfSpeech::from_category("名詞"), PartOfSpeech::Noun);
        assert_eq!(PartOfSpeech::from_category("動詞"), PartOfSpeech::Verb);
        assert_eq!(PartOfSpeech::from_category("形容詞"), PartOfSpeech::Adjective);
        assert_eq!(PartOfSpeech::from_category("助詞"), PartOfSpeech::Other);
        assert_eq!(PartOfSpeech::from_category(""), PartOfSpeech::Other);
    }

    #[test]
    fn test_normalized_prefers_base_form() {
        let token = Token::new("教え", PartOfSpeech::Verb, Some("教える"));
        assert_eq!(token.normalized(), "教える");
    }

    #[test]
    fn test_normalized_falls_back_on_placeholder() {
        let star = Token::new("asyncio", PartOfSpeech::Noun, Some("*"));
        let empty = Token::new("aiohttp", PartOfSpeech::Noun, Some(""));
        let missing = Token::new("ラーメン", PartOfSpeech::Noun, None);
        assert_eq!(star.normalized(), "asyncio");
        assert_eq!(empty.normalized(), "aiohttp");
        assert_eq!(missing.normalized(), "ラーメン");
    }
}
