//! Core domain logic for docmux.
//!
//! This crate ties the index stores, path normalization, the unified index
//! and the interactive selector into end-to-end workflows: [`build_index`]
//! and [`resolve::resolve`] for searching, [`acquire::acquire`] for
//! installing new docsets.

pub mod acquire;
pub mod index;
pub mod merge;
pub mod normalize;
pub mod resolve;

#[cfg(test)]
mod test_support;

pub use index::UnifiedIndex;
pub use merge::{DocsetOutcome, MergeReport};

use docmux_shared::Docset;

/// Merge `docsets` in order into a fresh index.
pub async fn build_index(docsets: &[Docset]) -> (UnifiedIndex, MergeReport) {
    let mut index = UnifiedIndex::new();
    let report = merge::merge_all(&mut index, docsets).await;
    (index, report)
}
