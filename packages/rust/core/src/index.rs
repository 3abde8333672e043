//! The unified, in-memory entry index for one search session.

use docmux_shared::Entry;

/// Append-only multiset of [`Entry`] values.
///
/// Order is insertion order: docsets in the order they were merged, rows in
/// the order each store returned them. Nothing is ever removed, replaced or
/// deduplicated.
#[derive(Debug, Default)]
pub struct UnifiedIndex {
    entries: Vec<Entry>,
}

impl UnifiedIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every entry from `entries`, preserving their order.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = Entry>) {
        self.entries.extend(entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }
}
