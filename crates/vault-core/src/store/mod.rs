//! Record-store access for entries and contact messages.
//!
//! The store is an external hosted database; every operation is a single
//! request with no automatic retry. Entry rows are normalized here, so callers
//! only ever see canonical [`Entry`] values.

mod memory;
mod supabase;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::models::{Entry, EntryDraft, EntryId, Message, MessageId};
use crate::Result;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

/// CRUD operations over the `entries` collection
pub trait EntryStore {
    /// List every entry, normalized
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Entry>>> + Send;

    /// Insert a new entry; the store assigns the id
    fn create(&self, draft: &EntryDraft) -> impl Future<Output = Result<Entry>> + Send;

    /// Overwrite the editable fields of an existing entry
    fn update(
        &self,
        id: &EntryId,
        draft: &EntryDraft,
    ) -> impl Future<Output = Result<Entry>> + Send;

    /// Remove an entry
    fn delete(&self, id: &EntryId) -> impl Future<Output = Result<()>> + Send;
}

/// Read/delete operations over the `messages` collection
pub trait MessageStore {
    /// List every message, newest first
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Message>>> + Send;

    /// Messages created at or after `since`, oldest first
    fn fetch_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Message>>> + Send;

    /// Remove one message
    fn delete(&self, id: &MessageId) -> impl Future<Output = Result<()>> + Send;

    /// Remove every message in `ids` with a single request
    fn delete_many(&self, ids: &[MessageId]) -> impl Future<Output = Result<()>> + Send;
}
