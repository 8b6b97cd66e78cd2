// Colored terminal output for keywords, verdicts and scenario replays.
//
// main.rs delegates all human-facing formatting here; the --json paths
// bypass this module and print serde output directly.

use colored::Colorize;

use crate::pipeline::replay::ScenarioReport;
use crate::topics::detector::DetectionResult;

/// Longest utterance preview shown in tables
const PREVIEW_CHARS: usize = 60;

/// Display the keywords extracted from a text.
pub fn display_keywords(text: &str, keywords: &[String]) {
    println!("{}", super::truncate_chars(text, PREVIEW_CHARS).bold());
    if keywords.is_empty() {
        println!("  {}", "(no keywords)".dimmed());
    } else {
        println!("  Keywords: {}", keywords.join(", ").cyan());
    }
}

/// Display a single detection verdict.
pub fn display_detection(utterance: &str, history_len: usize, result: &DetectionResult) {
    println!(
        "\n{}",
        format!("=== Topic check (history: {history_len} utterances) ===").bold()
    );
    println!("  Utterance:  {}", super::truncate_chars(utterance, PREVIEW_CHARS));
    println!("  Verdict:    {}", verdict_label(result));
    println!(
        "  Similarity: {}  (threshold {})",
        colorize_similarity(result),
        result.threshold
    );
    println!(
        "  Keywords:   {}",
        if result.new_keywords.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            result.new_keywords.join(", ")
        }
    );
}

/// Display a replayed scenario as a turn-by-turn table.
pub fn display_replay(report: &ScenarioReport) {
    let title = if report.title.is_empty() {
        "(untitled)"
    } else {
        report.title.as_str()
    };
    println!("\n{}", format!("=== {title} ===").bold());
    println!();

    for (i, step) in report.steps.iter().enumerate() {
        println!(
            "  {:>2}. {:<9} {:>5.3}  {}",
            i + 1,
            verdict_label(&step.result),
            step.result.similarity,
            super::truncate_chars(&step.utterance, PREVIEW_CHARS)
        );
        if !step.keywords.is_empty() {
            println!("      {}", step.keywords.join(", ").dimmed());
        }
    }

    println!();
    println!(
        "  {} topic changes over {} utterances",
        report.topic_changes(),
        report.steps.len()
    );
}

fn verdict_label(result: &DetectionResult) -> colored::ColoredString {
    if result.is_topic_change {
        "CHANGE".yellow().bold()
    } else {
        "CONTINUE".green()
    }
}

fn colorize_similarity(result: &DetectionResult) -> colored::ColoredString {
    let text = format!("{:.3}", result.similarity);
    if result.is_topic_change {
        text.yellow()
    } else {
        text.green()
    }
}
