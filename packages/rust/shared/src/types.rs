//! Core domain types for docmux.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Directory suffix that marks a docset bundle.
pub const DOCSET_SUFFIX: &str = ".docset";

/// Location of the embedded index store, relative to the docset root.
pub const STORE_RELATIVE_PATH: &str = "Contents/Resources/docSet.dsidx";

/// Location of the documents root, relative to the docset root.
pub const DOCUMENTS_RELATIVE_PATH: &str = "Contents/Resources/Documents";

// ---------------------------------------------------------------------------
// Docset
// ---------------------------------------------------------------------------

/// A documentation bundle on disk.
///
/// Identity is the bundle's base name: `/opt/docs/Rust.docset` has the id
/// `Rust`. Docsets are never written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Docset {
    root: PathBuf,
    id: String,
}

impl Docset {
    /// Build a docset from a command-line style path.
    ///
    /// Returns `None` unless the path (ignoring one trailing `/`) ends in
    /// `.docset`.
    pub fn from_arg(arg: impl AsRef<Path>) -> Option<Self> {
        let raw = arg.as_ref().to_string_lossy();
        let trimmed = raw.strip_suffix('/').unwrap_or(&raw);
        if !trimmed.ends_with(DOCSET_SUFFIX) {
            return None;
        }

        let root = PathBuf::from(trimmed);
        let id = root.file_stem()?.to_string_lossy().into_owned();
        Some(Self { root, id })
    }

    /// The bundle directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The docset's base name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Where the embedded index store is expected.
    pub fn store_path(&self) -> PathBuf {
        self.root.join(STORE_RELATIVE_PATH)
    }

    /// Root directory that store paths are relative to.
    pub fn documents_root(&self) -> PathBuf {
        self.root.join(DOCUMENTS_RELATIVE_PATH)
    }
}

impl fmt::Display for Docset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

// ---------------------------------------------------------------------------
// Store rows
// ---------------------------------------------------------------------------

/// The two known generations of the embedded index store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// Flat `searchIndex(name, type, path)` table.
    Modern,
    /// Normalized `ztoken` / `ztokenmetainformation` / `zfilepath` / `ztokentype` tables.
    Legacy,
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modern => f.write_str("modern"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

/// One `(name, kind, raw_path)` row as read from an index store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub kind: String,
    /// Path relative to the documents root, possibly with `<dash_entry_...>`
    /// markers and an `#anchor` suffix.
    pub raw_path: String,
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One symbol in the unified index.
///
/// `name` and `kind` are kept verbatim. Entries are not unique: the same
/// name and kind may appear many times, within or across docsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub kind: String,
    pub docset_id: String,
    /// Absolute path to the target document, fragment included.
    pub path: PathBuf,
}

impl Entry {
    /// Human-readable label: `name (kind, docset_id)`.
    pub fn label(&self) -> String {
        format!("{} ({}, {})", self.name, self.kind, self.docset_id)
    }
}
