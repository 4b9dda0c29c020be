//! In-process record store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::{EntryStore, MessageStore};
use crate::models::{Entry, EntryDraft, EntryId, Message, MessageId};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct MemoryState {
    entries: Vec<Entry>,
    messages: Vec<Message>,
    next_id: u64,
    pending_failure: Option<String>,
    requests: usize,
}

/// Shared in-memory store implementing both collections.
///
/// Clones share state. A failure can be queued with [`MemoryStore::fail_next`]
/// to simulate a transport error on the next request.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing entries, keeping their ids
    #[must_use]
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        let store = Self::new();
        store.lock().entries = entries;
        store
    }

    /// Seed the store with messages (kept in the given order)
    #[must_use]
    pub fn with_messages(messages: Vec<Message>) -> Self {
        let store = Self::new();
        store.lock().messages = messages;
        store
    }

    /// Make the next request fail with `Error::Api(reason)`
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.lock().pending_failure = Some(reason.into());
    }

    /// Simulate an externally created message
    pub fn insert_message(&self, message: Message) {
        self.lock().messages.insert(0, message);
    }

    /// Number of requests served (including failed ones)
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    #[must_use]
    pub fn entries_snapshot(&self) -> Vec<Entry> {
        self.lock().entries.clone()
    }

    #[must_use]
    pub fn messages_snapshot(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_request(&self) -> Result<MutexGuard<'_, MemoryState>> {
        let mut state = self.lock();
        state.requests += 1;
        match state.pending_failure.take() {
            Some(reason) => Err(Error::Api(reason)),
            None => Ok(state),
        }
    }
}

impl EntryStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Entry>> {
        let state = self.begin_request()?;
        Ok(state.entries.iter().cloned().map(Entry::normalized).collect())
    }

    async fn create(&self, draft: &EntryDraft) -> Result<Entry> {
        let mut state = self.begin_request()?;
        state.next_id += 1;
        let id = EntryId::new(format!("mem-{}", state.next_id));
        let entry = Entry::from_draft(id, draft.clone()).normalized();
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, id: &EntryId, draft: &EntryDraft) -> Result<Entry> {
        let mut state = self.begin_request()?;
        let slot = state
            .entries
            .iter_mut()
            .find(|entry| &entry.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        *slot = Entry::from_draft(id.clone(), draft.clone()).normalized();
        Ok(slot.clone())
    }

    async fn delete(&self, id: &EntryId) -> Result<()> {
        let mut state = self.begin_request()?;
        state.entries.retain(|entry| &entry.id != id);
        Ok(())
    }
}

impl MessageStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Message>> {
        let state = self.begin_request()?;
        Ok(state.messages.clone())
    }

    async fn fetch_since(&self, since: DateTime<Utc>) -> Result<Vec<Message>> {
        let state = self.begin_request()?;
        let mut fresh = state
            .messages
            .iter()
            .filter(|message| message.created_at >= since)
            .cloned()
            .collect::<Vec<_>>();
        fresh.sort_by_key(|message| message.created_at);
        Ok(fresh)
    }

    async fn delete(&self, id: &MessageId) -> Result<()> {
        let mut state = self.begin_request()?;
        state.messages.retain(|message| &message.id != id);
        Ok(())
    }

    async fn delete_many(&self, ids: &[MessageId]) -> Result<()> {
        let mut state = self.begin_request()?;
        state.messages.retain(|message| !ids.contains(&message.id));
        Ok(())
    }
}
