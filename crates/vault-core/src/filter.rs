//! Entry list derivation: pinned-first ordering, search filtering, and the
//! master-detail browser state built on top of them.

use std::collections::BTreeSet;

use crate::models::{Entry, EntryId};

/// Stable sort that moves pinned entries ahead of unpinned ones.
///
/// Relative order inside each group is the fetch order.
#[must_use]
pub fn sort_pinned_first(entries: &[Entry]) -> Vec<Entry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|entry| !entry.pinned);
    sorted
}

/// Case-insensitive substring match against title, excerpt, or any tag.
///
/// The term is used as typed; only the empty term matches everything.
#[must_use]
pub fn entry_matches(entry: &Entry, search_term: &str) -> bool {
    let query = normalize_query(search_term);
    matches_normalized(entry, &query)
}

/// Sort then filter; the result is always a subset of `entries`.
#[must_use]
pub fn visible_entries(entries: &[Entry], search_term: &str) -> Vec<Entry> {
    let query = normalize_query(search_term);
    sort_pinned_first(entries)
        .into_iter()
        .filter(|entry| matches_normalized(entry, &query))
        .collect()
}

/// Return a sorted, deduplicated tag list discovered across entries.
#[must_use]
pub fn collect_tags(entries: &[Entry]) -> Vec<String> {
    let mut tags = BTreeSet::new();
    for entry in entries {
        for tag in &entry.tags {
            tags.insert(tag.to_lowercase());
        }
    }
    tags.into_iter().collect()
}

fn normalize_query(raw: &str) -> String {
    raw.to_lowercase()
}

fn matches_normalized(entry: &Entry, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    entry.title.to_lowercase().contains(query)
        || entry.excerpt.to_lowercase().contains(query)
        || entry
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
}

/// Read-only master-detail state for browsing entries.
#[derive(Debug, Clone, Default)]
pub struct EntryBrowser {
    entries: Vec<Entry>,
    search_term: String,
    selected: Option<EntryId>,
}

impl EntryBrowser {
    #[must_use]
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Replace the backing list after a fetch.
    pub fn replace_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        self.drop_stale_selection();
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Update the search term, deselecting an entry that is no longer visible.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.drop_stale_selection();
    }

    /// Current list view, recomputed on every call.
    #[must_use]
    pub fn visible(&self) -> Vec<Entry> {
        visible_entries(&self.entries, &self.search_term)
    }

    /// Open the detail pane for a visible entry. Returns false if it is hidden.
    pub fn select(&mut self, id: &EntryId) -> bool {
        if self.is_visible(id) {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    pub fn back_to_list(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected_entry(&self) -> Option<&Entry> {
        let selected = self.selected.as_ref()?;
        self.entries.iter().find(|entry| &entry.id == selected)
    }

    fn is_visible(&self, id: &EntryId) -> bool {
        let query = normalize_query(&self.search_term);
        self.entries
            .iter()
            .any(|entry| &entry.id == id && matches_normalized(entry, &query))
    }

    fn drop_stale_selection(&mut self) {
        if let Some(selected) = self.selected.clone() {
            if !self.is_visible(&selected) {
                self.selected = None;
            }
        }
    }
}
