//! Turn raw store paths into absolute document paths.

use std::path::PathBuf;
use std::sync::LazyLock;

use docmux_shared::Docset;
use regex::Regex;

/// Matches one `<dash_entry_...>` marker, up to the first closing `>`.
static DASH_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<dash_entry_[^>]*>").expect("dash entry regex"));

/// Remove every `<dash_entry_...>` marker from a raw store path.
pub fn strip_markers(raw_path: &str) -> String {
    DASH_ENTRY_RE.replace_all(raw_path, "").into_owned()
}

/// Absolute path of the document a raw store path points at.
///
/// The documents root and the cleaned path are joined with a plain `/`
/// rather than [`Path::join`](std::path::Path::join), which would discard
/// the root when the raw path starts with `/`.
pub fn document_path(docset: &Docset, raw_path: &str) -> PathBuf {
    let cleaned = strip_markers(raw_path);
    let mut joined = docset.documents_root().into_os_string();
    joined.push("/");
    joined.push(cleaned);
    PathBuf::from(joined)
}
