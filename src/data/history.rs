//! The connection history shown by the dashboard.

use super::normalize::CanonicalEntry;

/// Ordered canonical entries, oldest first.
///
/// The history is never edited in place: a refresh either replaces it as a
/// whole or leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionHistory {
    entries: Vec<CanonicalEntry>,
}

impl ConnectionHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole history with a fresh snapshot.
    pub fn replace(&mut self, entries: Vec<CanonicalEntry>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[CanonicalEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&CanonicalEntry> {
        self.entries.last()
    }

    /// The entry before the most recent one.
    pub fn previous(&self) -> Option<&CanonicalEntry> {
        self.entries.len().checked_sub(2).map(|i| &self.entries[i])
    }

    /// Iterate newest first, as the event log displays entries.
    pub fn newest_first(&self) -> impl Iterator<Item = &CanonicalEntry> {
        self.entries.iter().rev()
    }
}

impl From<Vec<CanonicalEntry>> for ConnectionHistory {
    fn from(entries: Vec<CanonicalEntry>) -> Self {
        Self { entries }
    }
}
