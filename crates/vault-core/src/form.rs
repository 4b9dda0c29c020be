//! Entry form state: capture, validation, and submit/reset semantics.

use std::future::Future;

use chrono::NaiveDate;
use thiserror::Error;

use crate::markdown::render_markdown;
use crate::models::{Category, Entry, EntryDraft, EntryId};
use crate::normalize::normalize_tags;

/// Input-level validation failures; these never reach the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Date is required")]
    MissingDate,
    #[error("Date must be formatted as YYYY-MM-DD, got '{0}'")]
    InvalidDate(String),
}

/// Why a submit did not complete
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormError),
    #[error(transparent)]
    Save(#[from] crate::Error),
}

/// Editable fields for one entry, in the form's own text representation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryForm {
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub excerpt: String,
    /// Comma-separated tag text as typed
    pub tags: String,
    pub category: Category,
    /// Markdown body
    pub content: String,
    pub pinned: bool,
    editing: Option<EntryId>,
}

impl EntryForm {
    /// Blank form in create mode
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from an existing entry, in edit mode
    #[must_use]
    pub fn edit(entry: &Entry) -> Self {
        Self {
            title: entry.title.clone(),
            date: entry.date.format("%Y-%m-%d").to_string(),
            excerpt: entry.excerpt.clone(),
            tags: entry.tags.join(", "),
            category: entry.category,
            content: entry.content.clone(),
            pinned: entry.pinned,
            editing: Some(entry.id.clone()),
        }
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    #[must_use]
    pub const fn editing_id(&self) -> Option<&EntryId> {
        self.editing.as_ref()
    }

    /// Discard an in-progress edit. Only available in edit mode.
    pub fn cancel(&mut self) -> bool {
        if !self.is_editing() {
            return false;
        }
        self.reset();
        true
    }

    /// Back to blank create-mode defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check required fields and build the draft that would be saved.
    pub fn validate(&self) -> Result<EntryDraft, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::MissingTitle);
        }

        let raw_date = self.date.trim();
        if raw_date.is_empty() {
            return Err(FormError::MissingDate);
        }
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| FormError::InvalidDate(raw_date.to_string()))?;

        Ok(EntryDraft {
            title: title.to_string(),
            date,
            excerpt: self.excerpt.trim().to_string(),
            tags: normalize_tags(&self.tags),
            category: self.category,
            content: self.content.clone(),
            pinned: self.pinned,
        })
    }

    /// Validate and hand the draft to `save`.
    ///
    /// The form resets to blank defaults only after `save` succeeds; a
    /// rejected save leaves every field as the user typed it.
    pub async fn submit<F, Fut, T>(&mut self, save: F) -> Result<T, SubmitError>
    where
        F: FnOnce(Option<EntryId>, EntryDraft) -> Fut,
        Fut: Future<Output = crate::Result<T>>,
    {
        let draft = self.validate()?;
        let saved = save(self.editing.clone(), draft).await?;
        self.reset();
        Ok(saved)
    }

    /// Live HTML preview of the markdown body
    #[must_use]
    pub fn preview_html(&self) -> String {
        render_markdown(&self.content)
    }
}
