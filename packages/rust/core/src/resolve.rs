//! Hand the unified index to an interactive selector and read back a path.
//!
//! Each entry becomes one line: a display label, a tab, then the document
//! path. The selector shows only the label and replies with the path of the
//! accepted line.

use std::io::Write;
use std::process::{Command, Stdio};

use docmux_shared::{DocmuxError, Entry, Result, SelectorConfig};
use tracing::{debug, info};

use crate::index::UnifiedIndex;

/// Separates the label from the path on each selector line.
pub const FIELD_DELIMITER: char = '\t';

/// Exit status a selector uses when the user aborts.
const EXIT_CANCELLED: i32 = 130;

/// Exit status `fzf` uses when nothing matched the query.
const EXIT_NO_MATCH: i32 = 1;

// ---------------------------------------------------------------------------
// Selector seam
// ---------------------------------------------------------------------------

/// What the selector is being asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Pick one entry line; reply with its path field.
    Entry,
    /// Pick any number of plain lines; reply with each of them.
    Many,
}

/// Input for one selector run.
#[derive(Debug, Clone)]
pub struct SelectRequest<'a> {
    pub lines: &'a [String],
    pub mode: SelectMode,
    pub prompt: Option<&'a str>,
}

/// Result of one selector run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The user accepted; raw reply lines as printed by the selector.
    Accepted(Vec<String>),
    /// The user aborted or nothing matched.
    Cancelled,
}

/// An interactive line picker.
pub trait Selector {
    fn select(&self, request: &SelectRequest<'_>) -> Result<SelectOutcome>;
}

// ---------------------------------------------------------------------------
// Rendering and parsing
// ---------------------------------------------------------------------------

/// Render one entry as a selector line.
pub fn render_line(entry: &Entry) -> String {
    let label: String = entry
        .label()
        .chars()
        .map(|c| if c == FIELD_DELIMITER || c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!("{label}{FIELD_DELIMITER}{}", entry.path.display())
}

/// Render the whole index, in index order.
pub fn render_lines(index: &UnifiedIndex) -> Vec<String> {
    index.iter().map(render_line).collect()
}

/// Pull the path out of a selector reply.
///
/// Takes the first line that is not blank. If the selector echoed the whole
/// line rather than the path field, the last field is used. The path itself
/// is returned byte for byte.
pub fn parse_reply(reply: &str) -> Option<String> {
    let line = reply.lines().find(|l| !l.trim().is_empty())?;
    let path = line.rsplit(FIELD_DELIMITER).next().unwrap_or(line);
    (!path.is_empty()).then(|| path.to_string())
}

/// Show `index` in the selector and return the chosen document path.
///
/// `Ok(None)` means the user made no selection.
pub fn resolve(index: &UnifiedIndex, selector: &dyn Selector) -> Result<Option<String>> {
    if index.is_empty() {
        info!("unified index is empty, nothing to select");
        return Ok(None);
    }

    let lines = render_lines(index);
    let request = SelectRequest {
        lines: &lines,
        mode: SelectMode::Entry,
        prompt: None,
    };

    match selector.select(&request)? {
        SelectOutcome::Accepted(reply) => Ok(parse_reply(&reply.join("\n"))),
        SelectOutcome::Cancelled => {
            debug!("selection cancelled");
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// fzf
// ---------------------------------------------------------------------------

/// [`Selector`] backed by an `fzf` child process.
#[derive(Debug, Clone)]
pub struct FzfSelector {
    command: String,
    viewer: String,
}

impl FzfSelector {
    pub fn new(config: &SelectorConfig) -> Self {
        Self {
            command: config.command.clone(),
            viewer: config.viewer.clone(),
        }
    }

    /// Command-line arguments for a request.
    fn args(&self, request: &SelectRequest<'_>) -> Vec<String> {
        let mut args: Vec<String> = match request.mode {
            SelectMode::Entry => vec![
                "--with-nth".into(),
                "1".into(),
                "--delimiter".into(),
                FIELD_DELIMITER.to_string(),
                "--accept-nth".into(),
                "-1".into(),
                "--bind".into(),
                format!("enter:execute({} '{{-1}}')", self.viewer),
                "--bind".into(),
                "ctrl-v:execute(echo '{-1}')+abort".into(),
            ],
            SelectMode::Many => vec!["--multi".into()],
        };
        if let Some(prompt) = request.prompt {
            args.push("--prompt".into());
            args.push(prompt.into());
        }
        args
    }
}

impl Selector for FzfSelector {
    fn select(&self, request: &SelectRequest<'_>) -> Result<SelectOutcome> {
        let args = self.args(request);
        debug!(command = %self.command, ?args, lines = request.lines.len(), "launching selector");

        let mut child = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => DocmuxError::SelectorUnavailable {
                    command: self.command.clone(),
                },
                _ => DocmuxError::Selector(format!("failed to spawn {}: {e}", self.command)),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let mut input = request.lines.join("\n");
            input.push('\n');
            // The selector may exit before reading everything (e.g. user aborts early).
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(DocmuxError::Selector(format!("failed to write selector input: {e}")));
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| DocmuxError::Selector(format!("failed to wait for {}: {e}", self.command)))?;

        outcome_from_status(output.status.code(), &String::from_utf8_lossy(&output.stdout))
    }
}

/// Interpret a selector's exit status and standard output.
fn outcome_from_status(code: Option<i32>, stdout: &str) -> Result<SelectOutcome> {
    match code {
        Some(0) => Ok(SelectOutcome::Accepted(
            stdout
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(String::from)
                .collect(),
        )),
        Some(EXIT_CANCELLED) | Some(EXIT_NO_MATCH) => Ok(SelectOutcome::Cancelled),
        Some(code) => Err(DocmuxError::Selector(format!("selector exited with status {code}"))),
        None => Err(DocmuxError::Selector("selector terminated by signal".into())),
    }
}
