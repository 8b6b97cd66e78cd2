// CaboCha subprocess analyzer.
//
// Runs `cabocha -f1`, feeds the text on stdin, and parses the lattice table it
// prints: one token per line as `surface<TAB>feature,feature,...`, with `*`
// chunk headers and `EOS` sentence markers in between. The call is bounded by
// a timeout; the child is killed if it overruns.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

use super::traits::{AnalysisError, Analyzer, PartOfSpeech, Token};
use crate::config::Config;

/// Executable looked up on PATH when nothing else is configured.
pub const DEFAULT_PROGRAM: &str = "cabocha";

/// Upper bound on a single analyzer run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Feature-list index holding the base form in IPADIC-style output.
const BASE_FORM_FIELD: usize = 6;

/// Analyzer backed by the `cabocha` command-line tool.
#[derive(Debug, Clone)]
pub struct CabochaAnalyzer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CabochaAnalyzer {
    /// Create an analyzer that runs `program -f1` with the default timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["-f1".to_string()],
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the argument list passed to the program.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build an analyzer from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut args = vec!["-f1".to_string()];
        if let Some(rcfile) = &config.cabocha_rcfile {
            args.push("-r".to_string());
            args.push(rcfile.display().to_string());
        }
        Self::new(config.cabocha_bin.clone())
            .with_args(args)
            .with_timeout(config.analyzer_timeout)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the program once and return its stdout.
    async fn run(&self, text: &str) -> Result<String, AnalysisError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AnalysisError::Failure(format!("failed to start `{}`: {e}", self.program))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AnalysisError::Failure("analyzer stdin not available".to_string()))?;
        let input = text.as_bytes().to_vec();

        // Feed stdin while stdout is drained, so a long input cannot wedge
        // both sides on full pipes.
        let write = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());

        let output = output.map_err(|e| {
            AnalysisError::Failure(format!("failed to wait for `{}`: {e}", self.program))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalysisError::Failure(format!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        written.map_err(|e| {
            AnalysisError::Failure(format!("failed to write to `{}`: {e}", self.program))
        })?;

        String::from_utf8(output.stdout).map_err(|e| {
            AnalysisError::Failure(format!("`{}` produced non-UTF-8 output: {e}", self.program))
        })
    }
}

impl Default for CabochaAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

#[async_trait]
impl Analyzer for CabochaAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Vec<Token>, AnalysisError> {
        debug!(program = %self.program, chars = text.chars().count(), "Running analyzer");

        let stdout = match tokio::time::timeout(self.timeout, self.run(text)).await {
            Ok(result) => result?,
            Err(_) => return Err(AnalysisError::Timeout(self.timeout)),
        };

        Ok(parse_lattice(&stdout))
    }
}

/// Parse `-f1` lattice output into tokens.
///
/// Chunk headers (`*`-prefixed) and `EOS` are structural and skipped. Lines
/// without a tab separator are noise and skipped too; partial output is
/// expected from morphological analyzers and is not an error.
pub fn parse_lattice(output: &str) -> Vec<Token> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Token> {
    if line.starts_with('*') || line == "EOS" {
        return None;
    }

    let Some((surface, features)) = line.split_once('\t') else {
        trace!(line, "Skipping lattice line without features");
        return None;
    };

    let fields: Vec<&str> = features.split(',').collect();
    let pos = PartOfSpeech::from_category(fields[0]);
    let base_form = fields
        .get(BASE_FORM_FIELD)
        .copied()
        .filter(|base| !base.is_empty() && *base != "*")
        .map(str::to_string);

    Some(Token {
        surface: surface.to_string(),
        pos,
        base_form,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
* 0 2D 0/1 -1.014600
ラーメン\t名詞,一般,*,*,*,*,ラーメン,ラーメン,ラーメン
を\t助詞,格助詞,一般,*,*,*,を,ヲ,ヲ
* 1 2D 0/0 0.000000
食べ\t動詞,自立,*,*,一段,連用形,食べる,タベ,タベ
たい\t助動詞,*,*,*,特殊・タイ,基本形,たい,タイ,タイ
EOS
";

    #[test]
    fn test_parse_skips_structural_lines() {
        let tokens = parse_lattice(SAMPLE);
        let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["ラーメン", "を", "食べ", "たい"]);
    }

    #[test]
    fn test_parse_reads_pos_and_base_form() {
        let tokens = parse_lattice(SAMPLE);
        assert_eq!(tokens[0].pos, PartOfSpeech::Noun);
        assert_eq!(tokens[1].pos, PartOfSpeech::Other);
        assert_eq!(tokens[2].pos, PartOfSpeech::Verb);
        assert_eq!(tokens[2].base_form.as_deref(), Some("食べる"));
    }

    #[test]
    fn test_parse_unknown_word_has_no_base_form() {
        // Unknown words get a short feature list with no base form field
        let tokens = parse_lattice("asyncio\t名詞,固有名詞,組織,*,*,*,*\naiohttp\t名詞,一般,*\nEOS\n");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].base_form, None);
        assert_eq!(tokens[1].base_form, None);
        assert_eq!(tokens[1].normalized(), "aiohttp");
    }

    #[test]
    fn test_parse_tolerates_malformed_lines() {
        let tokens = parse_lattice("garbage without tab\n\nEOS\n処理\t名詞,サ変接続,*,*,*,*,処理\n");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].surface, "処理");
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_lattice("").is_empty());
        assert!(parse_lattice("EOS\n").is_empty());
    }

    #[test]
    fn test_from_config_passes_rcfile() {
        let config = Config {
            cabocha_bin: "/opt/cabocha/bin/cabocha".to_string(),
            cabocha_rcfile: Some("/etc/cabocharc".into()),
            analyzer_timeout: Duration::from_secs(3),
            threshold: 0.25,
            window_size: 3,
            extra_stop_words: Vec::new(),
        };
        let analyzer = CabochaAnalyzer::from_config(&config);
        assert_eq!(analyzer.program(), "/opt/cabocha/bin/cabocha");
        assert_eq!(analyzer.args, vec!["-f1", "-r", "/etc/cabocharc"]);
        assert_eq!(analyzer.timeout(), Duration::from_secs(3));
    }

    // The process plumbing is exercised with stock Unix tools: `cat` echoes
    // a lattice back, `false` fails, `sleep` overruns the bound.

    #[cfg(unix)]
    #[tokio::test]
    async fn test_analyze_reads_child_stdout() {
        let analyzer = CabochaAnalyzer::new("cat").with_args(Vec::new());
        let tokens = analyzer.analyze(SAMPLE).await.unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].normalized(), "食べる");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_analyze_nonzero_exit_is_failure() {
        let analyzer = CabochaAnalyzer::new("false").with_args(Vec::new());
        let err = analyzer.analyze("テスト").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Failure(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_analyze_non_utf8_output_is_failure() {
        // Drain stdin first so the exit status and write both succeed
        let analyzer = CabochaAnalyzer::new("sh").with_args(vec![
            "-c".to_string(),
            "cat > /dev/null; printf '\\377\\376\\n'".to_string(),
        ]);
        let err = analyzer.analyze("テスト").await.unwrap_err();
        match err {
            AnalysisError::Failure(msg) => assert!(msg.contains("non-UTF-8"), "got {msg}"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_missing_binary_is_failure() {
        let analyzer = CabochaAnalyzer::new("topicshift-no-such-analyzer-binary");
        let err = analyzer.analyze("テスト").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Failure(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_analyze_times_out() {
        let analyzer = CabochaAnalyzer::new("sleep")
            .with_args(vec!["5".to_string()])
            .with_timeout(Duration::from_millis(100));
        let err = analyzer.analyze("テスト").await.unwrap_err();
        match err {
            AnalysisError::Timeout(d) => assert_eq!(d, Duration::from_millis(100)),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
