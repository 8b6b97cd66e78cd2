use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use topicshift::analyzer::cabocha::CabochaAnalyzer;
use topicshift::analyzer::traits::Analyzer;
use topicshift::config::Config;
use topicshift::output::terminal;
use topicshift::pipeline::replay;
use topicshift::topics::detector::TopicDetector;
use topicshift::topics::keywords::KeywordExtractor;

/// topicshift: keyword-overlap topic change detection for conversations.
///
/// Compares the vocabulary of a new utterance against the last few turns of
/// a conversation and reports whether the topic has moved on.
#[derive(Parser)]
#[command(name = "topicshift", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the keywords extracted from a text
    Keywords {
        /// The text to analyze
        text: String,
    },

    /// Check whether an utterance changes the topic of a conversation
    Detect {
        /// A prior utterance, oldest first (repeat for each turn)
        #[arg(long = "history", short = 'H')]
        history: Vec<String>,

        /// The new utterance to judge
        utterance: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay scripted conversations from a JSON scenario file
    Replay {
        /// Path to a scenario file: {"title", "utterances"} or an array of them
        path: PathBuf,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration and check the analyzer works
    Status,
}

/// Sentence used to probe the analyzer in `status`
const PROBE_TEXT: &str = "今日は良い天気です。";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topicshift=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Keywords { text } => {
            let extractor = build_extractor(&config);
            let keywords = extractor
                .extract(&text)
                .await
                .context("Keyword extraction failed")?;
            terminal::display_keywords(&text, &keywords);
        }

        Commands::Detect {
            history,
            utterance,
            json,
        } => {
            let detector = build_detector(&config);
            let result = detector
                .detect(&history, &utterance)
                .await
                .context("Topic change detection failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                terminal::display_detection(&utterance, history.len(), &result);
            }
        }

        Commands::Replay { path, json } => {
            let scenarios = replay::load_scenarios(&path)?;
            info!(count = scenarios.len(), path = %path.display(), "Loaded scenarios");

            let detector = build_detector(&config);
            let mut reports = Vec::with_capacity(scenarios.len());
            for scenario in &scenarios {
                let report = replay::replay(&detector, scenario)
                    .await
                    .with_context(|| format!("Replay of \"{}\" failed", scenario.title))?;
                if !json {
                    terminal::display_replay(&report);
                }
                reports.push(report);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
        }

        Commands::Status => {
            println!("{}", "=== topicshift status ===".bold());
            println!("  Analyzer:        {}", config.cabocha_bin);
            if let Some(rcfile) = &config.cabocha_rcfile {
                println!("  Analyzer rcfile: {}", rcfile.display());
            }
            println!("  Timeout:         {:?}", config.analyzer_timeout);
            println!("  Threshold:       {}", config.threshold);
            println!("  History window:  {}", config.window_size);
            if !config.extra_stop_words.is_empty() {
                println!("  Extra stop words: {}", config.extra_stop_words.join(", "));
            }

            let analyzer = CabochaAnalyzer::from_config(&config);
            match analyzer.analyze(PROBE_TEXT).await {
                Ok(tokens) => println!(
                    "\n  {} analyzer returned {} tokens for \"{}\"",
                    "OK".green().bold(),
                    tokens.len(),
                    PROBE_TEXT
                ),
                Err(e) => {
                    println!("\n  {} {}", "Analyzer unavailable:".red().bold(), e);
                    println!(
                        "  Install CaboCha or point TOPICSHIFT_CABOCHA_BIN at the binary."
                    );
                }
            }
        }
    }

    Ok(())
}

fn build_extractor(config: &Config) -> KeywordExtractor<CabochaAnalyzer> {
    KeywordExtractor::new(CabochaAnalyzer::from_config(config))
        .extend_stop_words(config.extra_stop_words.iter().cloned())
}

fn build_detector(config: &Config) -> TopicDetector<CabochaAnalyzer> {
    TopicDetector::new(build_extractor(config), config.detector_config())
}
