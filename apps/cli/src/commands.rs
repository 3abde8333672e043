//! CLI command definitions, routing, and tracing setup.

use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use docmux_core::acquire::{self, AcquireOutcome, ProgressReporter};
use docmux_core::merge::{docsets_from_args, docsets_in_dir};
use docmux_core::resolve::{self, FzfSelector, Selector};
use docmux_core::{UnifiedIndex, build_index};
use docmux_shared::{AppConfig, DocmuxError, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docmux: one fuzzy search across many offline docsets.
#[derive(Parser)]
#[command(
    name = "docmux",
    version,
    about = "Search several offline documentation sets at once and open the match.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.docmux/docmux.toml.
    #[arg(long, global = true, env = "DOCMUX_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Merge docsets, pick an entry, and print its document path.
    Search {
        #[command(flatten)]
        source: DocsetSource,
    },

    /// Print the merged index as JSON lines.
    Index {
        #[command(flatten)]
        source: DocsetSource,
    },

    /// Pick docsets from the published feeds and install them.
    Download {
        /// Directory the docsets are unpacked into.
        target_dir: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Which docsets to merge.
#[derive(clap::Args)]
pub(crate) struct DocsetSource {
    /// Docset bundle paths (`*.docset`). Other paths are ignored.
    docsets: Vec<PathBuf>,

    /// Also merge every docset in DIR (defaults to the configured docset_dir).
    /// A value must be attached as `--dir=DIR`.
    #[arg(long, value_name = "DIR", num_args = 0..=1, require_equals = true)]
    dir: Option<Option<PathBuf>>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout is
/// reserved for command output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docmux=info",
        1 => "docmux=debug",
        _ => "docmux=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => docmux_shared::load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Search { source } => cmd_search(&source, &config).await,
        Command::Index { source } => cmd_index(&source, &config).await,
        Command::Download { target_dir } => cmd_download(&target_dir, &config).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

// ---------------------------------------------------------------------------
// search / index
// ---------------------------------------------------------------------------

/// Merge the requested docsets. `None` when no valid docset was given.
async fn load_index(source: &DocsetSource, config: &AppConfig) -> Result<Option<UnifiedIndex>> {
    let mut docsets = docsets_from_args(&source.docsets);

    if let Some(dir) = &source.dir {
        let dir = match dir {
            Some(dir) => dir.clone(),
            None => config.defaults.docset_dir_path()?,
        };
        docsets.extend(docsets_in_dir(&dir)?);
    }

    if docsets.is_empty() {
        error!("no docsets provided (expected paths ending in .docset)");
        return Ok(None);
    }

    info!(count = docsets.len(), "merging docsets");
    let (index, _report) = build_index(&docsets).await;
    Ok(Some(index))
}

async fn cmd_search(source: &DocsetSource, config: &AppConfig) -> Result<ExitCode> {
    let Some(index) = load_index(source, config).await? else {
        return Ok(ExitCode::FAILURE);
    };

    let selector = FzfSelector::new(&config.selector);
    search(&index, &selector, &mut std::io::stdout().lock())
}

/// Resolve a pick and write its path to `out`. Exit 0 only when a path was
/// written.
fn search(index: &UnifiedIndex, selector: &dyn Selector, out: &mut dyn Write) -> Result<ExitCode> {
    match resolve::resolve(index, selector) {
        Ok(Some(path)) => {
            writeln!(out, "{path}")?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => Ok(ExitCode::FAILURE),
        Err(e @ DocmuxError::SelectorUnavailable { .. }) => {
            error!("{e}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!(error = %e, "selection failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn cmd_index(source: &DocsetSource, config: &AppConfig) -> Result<ExitCode> {
    let Some(index) = load_index(source, config).await? else {
        return Ok(ExitCode::FAILURE);
    };

    for entry in index.iter() {
        println!("{}", serde_json::to_string(entry)?);
    }
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// download
// ---------------------------------------------------------------------------

async fn cmd_download(target_dir: &Path, config: &AppConfig) -> Result<ExitCode> {
    let selector = FzfSelector::new(&config.selector);
    let reporter = CliProgress::new();

    match acquire::acquire(&config.feeds, target_dir, &selector, &reporter).await {
        Ok(AcquireOutcome::NothingSelected) => Ok(ExitCode::SUCCESS),
        Ok(AcquireOutcome::Installed(report)) => {
            info!(
                "downloaded {} of {} selected docsets",
                report.installed.len(),
                report.attempted()
            );
            Ok(if report.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(e) => {
            error!(error = %e, "download failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// CLI progress reporter: one indicatif bar per docset, or a spinner when
/// the archive size is unknown.
struct CliProgress {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliProgress {
    fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(bar) = self.bar.borrow().as_ref() {
            f(bar);
        }
    }
}

impl ProgressReporter for CliProgress {
    fn download_started(&self, name: &str, total_bytes: Option<u64>) {
        let bar = match total_bytes {
            Some(total) => {
                let bar = ProgressBar::new(total);
                bar.set_style(
                    ProgressStyle::with_template(
                        "  {msg} [{bar:30.cyan/blue}] {percent:>3}% {bytes}/{total_bytes}",
                    )
                    .expect("valid progress template")
                    .progress_chars("=> "),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg} {bytes}")
                        .expect("valid spinner template")
                        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
                );
                bar.enable_steady_tick(Duration::from_millis(80));
                bar
            }
        };
        bar.set_message(name.to_string());
        *self.bar.borrow_mut() = Some(bar);
    }

    fn download_progress(&self, downloaded: u64) {
        self.with_bar(|bar| bar.set_position(downloaded));
    }

    fn extracting(&self, name: &str) {
        self.with_bar(|bar| bar.set_message(format!("Extracting {name}")));
    }

    fn finished(&self, _name: &str, _ok: bool) {
        if let Some(bar) = self.bar.borrow_mut().take() {
            bar.finish_and_clear();
        }
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<ExitCode> {
    let path = init_config()?;
    eprintln!("Config initialized at: {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_config_show(config: &AppConfig) -> Result<ExitCode> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use docmux_core::resolve::{SelectOutcome, SelectRequest};
    use docmux_shared::{Entry, SelectorConfig};

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_accepts_paths_and_bare_dir_flag() {
        let cli = Cli::try_parse_from(["docmux", "search", "/d/A.docset", "notes.txt", "--dir"])
            .expect("parse");
        match cli.command {
            Command::Search { source } => {
                assert_eq!(source.docsets.len(), 2);
                assert_eq!(source.dir, Some(None));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn dir_flag_with_value() {
        let cli = Cli::try_parse_from(["docmux", "index", "--dir=/srv/docsets"]).expect("parse");
        match cli.command {
            Command::Index { source } => {
                assert!(source.docsets.is_empty());
                assert_eq!(source.dir, Some(Some(PathBuf::from("/srv/docsets"))));
            }
            _ => panic!("expected index"),
        }
    }

    #[test]
    fn bare_dir_flag_does_not_swallow_docsets() {
        let cli = Cli::try_parse_from(["docmux", "search", "--dir", "A.docset", "B.docset"])
            .expect("parse");
        match cli.command {
            Command::Search { source } => {
                assert_eq!(source.dir, Some(None));
                assert_eq!(
                    source.docsets,
                    vec![PathBuf::from("A.docset"), PathBuf::from("B.docset")]
                );
            }
            _ => panic!("expected search"),
        }
    }

    #[tokio::test]
    async fn no_valid_docsets_is_a_usage_failure() {
        let source = DocsetSource {
            docsets: vec![PathBuf::from("/tmp/readme.md")],
            dir: None,
        };
        let index = load_index(&source, &AppConfig::default()).await.unwrap();
        assert!(index.is_none());
    }

    struct Reply(Option<&'static str>);

    impl Selector for Reply {
        fn select(&self, _request: &SelectRequest<'_>) -> docmux_shared::Result<SelectOutcome> {
            Ok(match self.0 {
                Some(line) => SelectOutcome::Accepted(vec![line.to_string()]),
                None => SelectOutcome::Cancelled,
            })
        }
    }

    fn one_entry_index() -> UnifiedIndex {
        let mut index = UnifiedIndex::new();
        index.extend([Entry {
            name: "foo".into(),
            kind: "Method".into(),
            docset_id: "A".into(),
            path: PathBuf::from("/d/A.docset/Contents/Resources/Documents/a.html"),
        }]);
        index
    }

    #[test]
    fn search_prints_exactly_the_chosen_path() {
        let mut out = Vec::new();
        let code = search(
            &one_entry_index(),
            &Reply(Some("/d/A.docset/Contents/Resources/Documents/a.html")),
            &mut out,
        )
        .unwrap();

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "/d/A.docset/Contents/Resources/Documents/a.html\n"
        );
    }

    #[test]
    fn search_cancel_exits_one_with_empty_stdout() {
        let mut out = Vec::new();
        let code = search(&one_entry_index(), &Reply(None), &mut out).unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.is_empty());
    }

    #[test]
    fn search_empty_index_exits_one() {
        let mut out = Vec::new();
        let code = search(&UnifiedIndex::new(), &Reply(Some("/x.html")), &mut out).unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.is_empty());
    }

    #[test]
    fn search_without_selector_binary_exits_one() {
        let selector = FzfSelector::new(&SelectorConfig {
            command: "docmux-selector-that-does-not-exist".into(),
            viewer: "true".into(),
        });
        let mut out = Vec::new();
        let code = search(&one_entry_index(), &selector, &mut out).unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.is_empty());
    }
}
