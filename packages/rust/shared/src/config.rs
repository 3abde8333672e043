//! Application configuration for docmux.
//!
//! User config lives at `~/.docmux/docmux.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocmuxError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docmux.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docmux";

// ---------------------------------------------------------------------------
// Config structs (matching docmux.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Interactive selector settings.
    #[serde(default)]
    pub selector: SelectorConfig,

    /// Remote docset feed settings.
    #[serde(default)]
    pub feeds: FeedsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory scanned for `*.docset` bundles by `search --dir`.
    #[serde(default = "default_docset_dir")]
    pub docset_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            docset_dir: default_docset_dir(),
        }
    }
}

fn default_docset_dir() -> String {
    "~/.local/share/docsets".into()
}

/// `[selector]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Selector executable.
    #[serde(default = "default_selector_command")]
    pub command: String,

    /// Viewer launched from the selector's `enter` binding.
    #[serde(default = "default_viewer")]
    pub viewer: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            command: default_selector_command(),
            viewer: default_viewer(),
        }
    }
}

fn default_selector_command() -> String {
    "fzf".into()
}
fn default_viewer() -> String {
    "w3m".into()
}

/// `[feeds]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Git tree listing of the published feeds repository.
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Base URL that `<name>.tgz` archives are fetched from.
    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,

    /// HTTP timeout for the feed listing, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            index_url: default_index_url(),
            download_base_url: default_download_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_index_url() -> String {
    "https://api.github.com/repos/Kapeli/feeds/git/trees/master".into()
}
fn default_download_base_url() -> String {
    "https://kapeli.com/feeds".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl DefaultsConfig {
    /// The docset directory with a leading `~` expanded.
    pub fn docset_dir_path(&self) -> Result<PathBuf> {
        expand_home(&self.docset_dir)
    }
}

/// Expand a leading `~/` against the user's home directory.
fn expand_home(raw: &str) -> Result<PathBuf> {
    match raw.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| DocmuxError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None if raw == "~" => {
            dirs::home_dir().ok_or_else(|| DocmuxError::config("could not determine home directory"))
        }
        None => Ok(PathBuf::from(raw)),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docmux/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocmuxError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docmux/docmux.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocmuxError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocmuxError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocmuxError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocmuxError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocmuxError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
