//! Vault entry model

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::{deserialize_key, Category};
use crate::normalize::normalize_tag_list;

/// Store-assigned identifier for an entry.
///
/// The record store owns key generation, so the value is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_key(deserializer).map(Self)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A markdown-bodied vault note with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Store-assigned identifier
    pub id: EntryId,
    /// Display title
    pub title: String,
    /// Calendar date the entry is filed under
    pub date: NaiveDate,
    /// Short summary shown on list cards
    #[serde(default)]
    pub excerpt: String,
    /// Trimmed, non-empty tags in author order
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Category,
    /// Markdown body
    #[serde(default)]
    pub content: String,
    /// Pinned entries sort ahead of everything else
    #[serde(default)]
    pub pinned: bool,
}

impl Entry {
    /// Attach a store-assigned id to a draft
    #[must_use]
    pub fn from_draft(id: EntryId, draft: EntryDraft) -> Self {
        Self {
            id,
            title: draft.title,
            date: draft.date,
            excerpt: draft.excerpt,
            tags: draft.tags,
            category: draft.category,
            content: draft.content,
            pinned: draft.pinned,
        }
    }

    /// Copy of the editable fields, as sent back to the store on update
    #[must_use]
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            title: self.title.clone(),
            date: self.date,
            excerpt: self.excerpt.clone(),
            tags: self.tags.clone(),
            category: self.category,
            content: self.content.clone(),
            pinned: self.pinned,
        }
    }

    /// Re-apply the tag normalization rule.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.tags = normalize_tag_list(self.tags);
        self
    }
}

/// The editable shape of an entry: everything except the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub pinned: bool,
}

impl EntryDraft {
    /// Create a draft with only the required fields set
    #[must_use]
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            excerpt: String::new(),
            tags: Vec::new(),
            category: Category::default(),
            content: String::new(),
            pinned: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    #[test]
    fn entry_id_accepts_numeric_keys() {
        let id: EntryId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");

        let id: EntryId = serde_json::from_str("\"a1b2\"").unwrap();
        assert_eq!(id.to_string(), "a1b2");
    }

    #[test]
    fn draft_defaults() {
        let draft = EntryDraft::new("Hooks Deep Dive", sample_date());
        assert_eq!(draft.category, Category::Note);
        assert!(!draft.pinned);
        assert!(draft.tags.is_empty());
    }

    #[test]
    fn draft_roundtrip_through_entry() {
        let mut draft = EntryDraft::new("Redux Basics", sample_date());
        draft.tags = vec!["redux".to_string()];
        draft.pinned = true;

        let entry = Entry::from_draft(EntryId::new("7"), draft.clone());
        assert_eq!(entry.id.as_str(), "7");
        assert_eq!(entry.to_draft(), draft);
    }

    #[test]
    fn normalized_drops_blank_tags() {
        let mut entry = Entry::from_draft(
            EntryId::new("1"),
            EntryDraft::new("Tagged", sample_date()),
        );
        entry.tags = vec![" rust ".to_string(), "  ".to_string(), "cli".to_string()];
        assert_eq!(entry.normalized().tags, vec!["rust", "cli"]);
    }

    #[test]
    fn draft_serializes_date_as_calendar_day() {
        let draft = EntryDraft::new("Dated", sample_date());
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["date"], "2024-03-14");
        assert_eq!(json["category"], "note");
    }
}
