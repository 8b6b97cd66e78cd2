// Scenario replay: walk a scripted conversation through the detector.
//
// Each utterance is checked against everything said before it, the way a live
// conversation would grow turn by turn. Useful for eyeballing how the
// threshold behaves on paraphrases and topic drift.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyzer::traits::{AnalysisError, Analyzer};
use crate::topics::detector::{DetectionResult, TopicDetector};

/// A titled, ordered list of utterances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub title: String,
    pub utterances: Vec<String>,
}

/// Scenario files hold either a single scenario or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScenarioFile {
    Many(Vec<Scenario>),
    One(Scenario),
}

/// One replayed utterance and its verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayStep {
    pub utterance: String,
    /// Every keyword extracted from the utterance, duplicates included
    pub keywords: Vec<String>,
    /// Number of utterances that preceded this one
    pub history_len: usize,
    pub result: DetectionResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub title: String,
    pub steps: Vec<ReplayStep>,
}

impl ScenarioReport {
    /// How many steps were judged a topic change.
    pub fn topic_changes(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.result.is_topic_change)
            .count()
    }
}

/// Parse scenario JSON.
pub fn parse_scenarios(json: &str) -> Result<Vec<Scenario>> {
    let file: ScenarioFile =
        serde_json::from_str(json).context("Invalid scenario JSON")?;
    Ok(match file {
        ScenarioFile::Many(scenarios) => scenarios,
        ScenarioFile::One(scenario) => vec![scenario],
    })
}

/// Read and parse a scenario file.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    parse_scenarios(&json).with_context(|| format!("Failed to load {}", path.display()))
}

/// Replay one scenario, using each utterance's predecessors as its history.
pub async fn replay<A: Analyzer>(
    detector: &TopicDetector<A>,
    scenario: &Scenario,
) -> Result<ScenarioReport, AnalysisError> {
    let mut steps = Vec::with_capacity(scenario.utterances.len());

    for (i, utterance) in scenario.utterances.iter().enumerate() {
        let history = &scenario.utterances[..i];
        let (result, keywords) = detector.detect_with_keywords(history, utterance).await?;
        steps.push(ReplayStep {
            utterance: utterance.clone(),
            keywords,
            history_len: history.len(),
            result,
        });
    }

    let report = ScenarioReport {
        title: scenario.title.clone(),
        steps,
    };

    info!(
        title = %report.title,
        steps = report.steps.len(),
        topic_changes = report.topic_changes(),
        "Replayed scenario"
    );

    Ok(report)
}
