//! Enumeration of remotely published docsets.
//!
//! The names returned here are the ones accepted by the download step
//! (`<download_base_url>/<name>.tgz`).

mod parser;

use docmux_shared::{DocmuxError, FeedsConfig, Result};
use reqwest::Client;
use tracing::{info, instrument};

/// User-Agent string for feed requests. The GitHub API rejects requests without one.
const USER_AGENT: &str = concat!("docmux/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for the feed listing request.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// URL of the feeds repository tree listing.
    pub index_url: String,
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl From<&FeedsConfig> for DiscoveryOptions {
    fn from(config: &FeedsConfig) -> Self {
        Self {
            index_url: config.index_url.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&FeedsConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Fetch the sorted list of docset names published by the feeds repository.
#[instrument(skip_all, fields(url = %opts.index_url))]
pub async fn fetch_available_docsets(opts: &DiscoveryOptions) -> Result<Vec<String>> {
    let client = build_client(opts)?;

    let response = client
        .get(&opts.index_url)
        .send()
        .await
        .map_err(|e| DocmuxError::Network(format!("{}: {e}", opts.index_url)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DocmuxError::Network(format!(
            "{}: HTTP {status}",
            opts.index_url
        )));
    }

    let body = response.text().await.map_err(|e| {
        DocmuxError::Network(format!("{}: failed to read body: {e}", opts.index_url))
    })?;

    let names = parser::parse_feed_listing(&body)?;
    info!(count = names.len(), "fetched docset feed listing");
    Ok(names)
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &DiscoveryOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| DocmuxError::Network(format!("failed to build HTTP client: {e}")))
}
