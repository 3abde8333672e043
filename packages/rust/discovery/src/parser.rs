//! Feed listing parser.
//!
//! The feeds repository publishes one `<Name>.xml` feed file per docset.
//! Its git tree listing looks like:
//!
//! ```json
//! { "tree": [ { "path": "Rust.xml", "type": "blob" }, { "path": "docs", "type": "tree" } ] }
//! ```

use docmux_shared::{DocmuxError, Result};
use serde::Deserialize;

/// Extension of a feed file in the listing.
const FEED_EXTENSION: &str = ".xml";

#[derive(Debug, Deserialize)]
struct TreeListing {
    #[serde(default)]
    tree: Vec<TreeItem>,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    #[serde(default)]
    path: String,
    #[serde(default, rename = "type")]
    kind: String,
}

/// Parse a git tree listing into sorted docset names.
pub(crate) fn parse_feed_listing(body: &str) -> Result<Vec<String>> {
    let listing: TreeListing = serde_json::from_str(body)
        .map_err(|e| DocmuxError::validation(format!("malformed feed listing: {e}")))?;

    let mut names: Vec<String> = listing
        .tree
        .into_iter()
        .filter(|item| item.kind == "blob")
        .filter_map(|item| {
            item.path
                .strip_suffix(FEED_EXTENSION)
                .filter(|name| !name.is_empty())
                .map(String::from)
        })
        .collect();

    names.sort();
    Ok(names)
}
