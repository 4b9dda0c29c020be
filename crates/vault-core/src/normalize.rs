//! Store-boundary normalization of raw entry records.
//!
//! Records come back from the store in whatever shape they were written:
//! `tags` may be an array or a comma-separated string, older rows keep the
//! title under `text`, and optional columns may be null. Everything above the
//! store works with the canonical [`Entry`] produced here.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{Category, Entry, EntryId};

/// An entry row exactly as the record store returned it
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    pub id: EntryId,
    #[serde(default)]
    pub title: Option<String>,
    /// Legacy title column
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub pinned: Option<bool>,
}

/// Convert a raw record into the canonical entry shape.
#[must_use]
pub fn normalize_entry(raw: RawEntry) -> Entry {
    let date = raw
        .date
        .as_deref()
        .and_then(parse_entry_date)
        .unwrap_or_else(|| {
            tracing::warn!("Entry {} has no usable date; defaulting to epoch", raw.id);
            NaiveDate::default()
        });

    Entry {
        title: raw
            .title
            .or(raw.text)
            .map(|title| title.trim().to_string())
            .unwrap_or_default(),
        date,
        excerpt: raw.excerpt.unwrap_or_default(),
        tags: normalize_tags_value(&raw.tags),
        category: Category::from_stored(raw.category.as_deref()),
        content: raw.content.unwrap_or_default(),
        pinned: raw.pinned.unwrap_or(false),
        id: raw.id,
    }
}

impl From<RawEntry> for Entry {
    fn from(raw: RawEntry) -> Self {
        normalize_entry(raw)
    }
}

/// Split a comma-separated tag string into trimmed, non-empty tags.
///
/// ```
/// use vault_core::normalize::normalize_tags;
///
/// assert_eq!(normalize_tags(" react,  hooks ,ui"), vec!["react", "hooks", "ui"]);
/// ```
#[must_use]
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Trim every tag in an existing list and drop the blank ones.
#[must_use]
pub fn normalize_tag_list(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Apply the tag rule to an untyped JSON value.
///
/// Arrays keep their string members, strings are split on commas, anything
/// else yields no tags.
#[must_use]
pub fn normalize_tags_value(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => normalize_tag_list(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect(),
        ),
        Value::String(raw) => normalize_tags(raw),
        _ => Vec::new(),
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
#[must_use]
pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
