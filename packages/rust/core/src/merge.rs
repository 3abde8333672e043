//! Build a [`UnifiedIndex`] from docsets on disk.
//!
//! Docsets are processed one at a time. Each store is opened read-only,
//! drained, and dropped before the next one is touched. A docset that fails
//! contributes nothing; the others are unaffected.

use std::path::{Path, PathBuf};

use docmux_shared::{DocmuxError, Docset, Entry, Result, SchemaVariant};
use docmux_storage::DocsetStore;
use tracing::{debug, error, info, instrument, warn};

use crate::index::UnifiedIndex;
use crate::normalize;

/// What happened to one docset during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocsetOutcome {
    /// Rows were read and appended.
    Merged {
        variant: SchemaVariant,
        entries: usize,
    },
    /// The docset has no index store; nothing was appended.
    MissingStore,
}

/// Summary of a multi-docset merge.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// `(docset_id, variant, entries appended)` per merged docset, in order.
    pub merged: Vec<(String, SchemaVariant, usize)>,
    /// Docsets skipped because their store was absent.
    pub skipped: Vec<PathBuf>,
    /// Docsets whose store could not be read, with the error message.
    pub failed: Vec<(PathBuf, String)>,
}

impl MergeReport {
    /// Total entries appended across all docsets.
    pub fn total_entries(&self) -> usize {
        self.merged.iter().map(|(_, _, n)| n).sum()
    }
}

/// Merge one docset into `index`.
///
/// A missing store is not an error: it is logged and reported as
/// [`DocsetOutcome::MissingStore`]. Any store failure is returned and leaves
/// `index` untouched, since rows are fully read before the first append.
#[instrument(skip_all, fields(docset = %docset.id()))]
pub async fn merge_docset(index: &mut UnifiedIndex, docset: &Docset) -> Result<DocsetOutcome> {
    let store_path = docset.store_path();
    if !store_path.is_file() {
        warn!(docset = %docset, "index store not found, skipping docset");
        return Ok(DocsetOutcome::MissingStore);
    }

    let extraction = {
        let store = DocsetStore::open_readonly(&store_path).await?;
        store.extract().await?
    };
    debug!(variant = %extraction.variant, rows = extraction.rows.len(), "extracted index store");

    let count = extraction.rows.len();
    index.extend(extraction.rows.into_iter().map(|row| Entry {
        path: normalize::document_path(docset, &row.raw_path),
        name: row.name,
        kind: row.kind,
        docset_id: docset.id().to_string(),
    }));

    Ok(DocsetOutcome::Merged {
        variant: extraction.variant,
        entries: count,
    })
}

/// Merge every docset in order. Failures are logged and recorded in the
/// report; they never stop the remaining docsets from being merged.
pub async fn merge_all(index: &mut UnifiedIndex, docsets: &[Docset]) -> MergeReport {
    let mut report = MergeReport::default();

    for docset in docsets {
        match merge_docset(index, docset).await {
            Ok(DocsetOutcome::Merged { variant, entries }) => {
                report
                    .merged
                    .push((docset.id().to_string(), variant, entries));
            }
            Ok(DocsetOutcome::MissingStore) => {
                report.skipped.push(docset.root().to_path_buf());
            }
            Err(e) => {
                error!(docset = %docset, error = %e, "failed to read docset, skipping");
                report.failed.push((docset.root().to_path_buf(), e.to_string()));
            }
        }
    }

    info!(
        merged = report.merged.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        entries = report.total_entries(),
        "unified index built"
    );
    report
}

// ---------------------------------------------------------------------------
// Docset selection
// ---------------------------------------------------------------------------

/// Keep the arguments that name docset bundles, in order. Others are
/// silently dropped.
pub fn docsets_from_args<I, P>(args: I) -> Vec<Docset>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    args.into_iter().filter_map(Docset::from_arg).collect()
}

/// Every `*.docset` directory directly inside `dir`, sorted by path.
pub fn docsets_in_dir(dir: &Path) -> Result<Vec<Docset>> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| DocmuxError::io(dir, e))?;

    let mut paths = Vec::new();
    for item in read_dir {
        let item = item.map_err(|e| DocmuxError::io(dir, e))?;
        let path = item.path();
        if path.is_dir() {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(docsets_from_args(paths))
}
