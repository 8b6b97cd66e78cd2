use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::analyzer::cabocha::{DEFAULT_PROGRAM, DEFAULT_TIMEOUT};
use crate::topics::detector::{DetectorConfig, DEFAULT_THRESHOLD, DEFAULT_WINDOW_SIZE};

/// Central configuration loaded from environment variables.
///
/// Every setting has a default, so an empty environment yields the reference
/// behavior. The .env file is loaded at startup via dotenvy.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Analyzer executable (TOPICSHIFT_CABOCHA_BIN, default `cabocha`)
    pub cabocha_bin: String,
    /// Optional cabocharc passed as `-r` (TOPICSHIFT_CABOCHA_RCFILE)
    pub cabocha_rcfile: Option<PathBuf>,
    /// Bound on a single analyzer run (TOPICSHIFT_ANALYZER_TIMEOUT_SECS)
    pub analyzer_timeout: Duration,
    /// Similarity below which a topic change is reported (TOPICSHIFT_THRESHOLD)
    pub threshold: f64,
    /// Trailing history entries forming the current topic (TOPICSHIFT_WINDOW)
    pub window_size: usize,
    /// Stop words added on top of the built-in list (TOPICSHIFT_EXTRA_STOP_WORDS)
    pub extra_stop_words: Vec<String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let analyzer_timeout = match get("TOPICSHIFT_ANALYZER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: f64 = raw.trim().parse().with_context(|| {
                    format!("TOPICSHIFT_ANALYZER_TIMEOUT_SECS is not a number: {raw}")
                })?;
                if !(secs.is_finite() && secs > 0.0) {
                    anyhow::bail!("TOPICSHIFT_ANALYZER_TIMEOUT_SECS must be positive, got {raw}");
                }
                Duration::try_from_secs_f64(secs).with_context(|| {
                    format!("TOPICSHIFT_ANALYZER_TIMEOUT_SECS is out of range: {raw}")
                })?
            }
            None => DEFAULT_TIMEOUT,
        };

        let threshold = match get("TOPICSHIFT_THRESHOLD") {
            Some(raw) => {
                let value: f64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("TOPICSHIFT_THRESHOLD is not a number: {raw}"))?;
                if !(0.0..=1.0).contains(&value) {
                    anyhow::bail!("TOPICSHIFT_THRESHOLD must be between 0 and 1, got {raw}");
                }
                value
            }
            None => DEFAULT_THRESHOLD,
        };

        let window_size = match get("TOPICSHIFT_WINDOW") {
            Some(raw) => {
                let value: usize = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("TOPICSHIFT_WINDOW is not an integer: {raw}"))?;
                if value == 0 {
                    anyhow::bail!("TOPICSHIFT_WINDOW must be at least 1");
                }
                value
            }
            None => DEFAULT_WINDOW_SIZE,
        };

        let extra_stop_words = get("TOPICSHIFT_EXTRA_STOP_WORDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            cabocha_bin: get("TOPICSHIFT_CABOCHA_BIN")
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            cabocha_rcfile: get("TOPICSHIFT_CABOCHA_RCFILE").map(PathBuf::from),
            analyzer_timeout,
            threshold,
            window_size,
            extra_stop_words,
        })
    }

    /// The decision-policy part of the configuration.
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            threshold: self.threshold,
            window_size: self.window_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.cabocha_bin, "cabocha");
        assert_eq!(config.cabocha_rcfile, None);
        assert_eq!(config.analyzer_timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.detector_config(), DetectorConfig::default());
        assert!(config.extra_stop_words.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TOPICSHIFT_CABOCHA_BIN", "/usr/local/bin/cabocha"),
            ("TOPICSHIFT_CABOCHA_RCFILE", "/etc/cabocharc"),
            ("TOPICSHIFT_ANALYZER_TIMEOUT_SECS", "2.5"),
            ("TOPICSHIFT_THRESHOLD", "0.4"),
            ("TOPICSHIFT_WINDOW", "5"),
            ("TOPICSHIFT_EXTRA_STOP_WORDS", "よう, ため,,"),
        ])
        .unwrap();
        assert_eq!(config.cabocha_bin, "/usr/local/bin/cabocha");
        assert_eq!(config.cabocha_rcfile, Some(PathBuf::from("/etc/cabocharc")));
        assert_eq!(config.analyzer_timeout, Duration::from_millis(2500));
        assert_eq!(config.threshold, 0.4);
        assert_eq!(config.window_size, 5);
        assert_eq!(config.extra_stop_words, vec!["よう", "ため"]);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("TOPICSHIFT_THRESHOLD", "  "), ("TOPICSHIFT_CABOCHA_BIN", "")]).unwrap();
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.cabocha_bin, "cabocha");
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        for (key, value) in [
            ("TOPICSHIFT_THRESHOLD", "high"),
            ("TOPICSHIFT_THRESHOLD", "1.5"),
            ("TOPICSHIFT_WINDOW", "0"),
            ("TOPICSHIFT_WINDOW", "-1"),
            ("TOPICSHIFT_ANALYZER_TIMEOUT_SECS", "0"),
            ("TOPICSHIFT_ANALYZER_TIMEOUT_SECS", "soon"),
            ("TOPICSHIFT_ANALYZER_TIMEOUT_SECS", "1e300"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(
                format!("{err:#}").contains(key),
                "{key}={value}: error should name the variable, got {err:#}"
            );
        }
    }
}
