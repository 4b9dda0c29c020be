//! Vault controllers: the editor page (CRUD over entries) and the read-only
//! viewer (search + master-detail).
//!
//! Every mutation is followed by a full refetch. List-affecting requests take
//! a ticket from [`RequestSequencer`], and only the response to the most
//! recently issued ticket is allowed to replace visible state.

use crate::filter::EntryBrowser;
use crate::form::{EntryForm, SubmitError};
use crate::models::{Entry, EntryId};
use crate::notice::Notice;
use crate::store::EntryStore;
use crate::{Error, Result};

/// Monotonic ticket handed out per list-affecting request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Last-request-wins bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    #[must_use]
    pub const fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// Outcome of the most recent list fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

/// Confirmation token for a requested delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    id: EntryId,
}

impl PendingDelete {
    #[must_use]
    pub const fn id(&self) -> &EntryId {
        &self.id
    }
}

/// Shared list-refresh state used by both controllers
#[derive(Debug, Default)]
struct EntryList {
    entries: Vec<Entry>,
    load_state: LoadState,
    sequencer: RequestSequencer,
}

impl EntryList {
    fn begin(&mut self) -> Ticket {
        self.load_state = LoadState::Loading;
        self.sequencer.issue()
    }

    fn apply(&mut self, ticket: Ticket, result: &Result<Vec<Entry>>) -> bool {
        if !self.sequencer.is_current(ticket) {
            tracing::debug!("Discarding stale entry list response {:?}", ticket);
            return false;
        }
        match result {
            Ok(entries) => {
                self.entries.clone_from(entries);
                self.load_state = LoadState::Ready;
            }
            Err(error) => {
                tracing::warn!("Failed to load entries: {}", error);
                self.load_state = LoadState::Failed(error.to_string());
            }
        }
        true
    }

    async fn refresh<S: EntryStore>(&mut self, store: &S) -> Result<bool> {
        let ticket = self.begin();
        let result = store.fetch_all().await;
        let applied = self.apply(ticket, &result);
        result.map(|_| applied)
    }
}

/// Editor page controller
pub struct VaultEditor<S> {
    store: S,
    list: EntryList,
    pending_delete: Option<EntryId>,
    notices: Vec<Notice>,
}

impl<S: EntryStore> VaultEditor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            list: EntryList::default(),
            pending_delete: None,
            notices: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.list.entries
    }

    pub const fn load_state(&self) -> &LoadState {
        &self.list.load_state
    }

    pub fn find(&self, id: &EntryId) -> Option<&Entry> {
        self.list.entries.iter().find(|entry| &entry.id == id)
    }

    /// Drain notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch the full list. Failures leave the previous list in place.
    pub async fn load(&mut self) -> Result<()> {
        self.list.refresh(&self.store).await.map(|_| ())
    }

    /// Start a list refresh; pair with [`Self::apply_refresh`].
    pub fn begin_refresh(&mut self) -> Ticket {
        self.list.begin()
    }

    /// Apply a fetch result. Returns false when a newer request superseded it.
    pub fn apply_refresh(&mut self, ticket: Ticket, result: Result<Vec<Entry>>) -> bool {
        self.list.apply(ticket, &result)
    }

    /// Edit-mode form for an entry in the current list
    pub fn edit_form(&self, id: &EntryId) -> Option<EntryForm> {
        self.find(id).map(EntryForm::edit)
    }

    /// Create or update from the form, then refetch.
    ///
    /// On a store failure the list is untouched and the form keeps its values.
    pub async fn save(&mut self, form: &mut EntryForm) -> std::result::Result<Entry, SubmitError> {
        let editing = form.is_editing();
        let store = &self.store;
        let result = form
            .submit(|id, draft| async move {
                match id {
                    Some(id) => store.update(&id, &draft).await,
                    None => store.create(&draft).await,
                }
            })
            .await;

        match result {
            Ok(entry) => {
                self.notices.push(if editing {
                    Notice::info("Entry Updated", "The entry was updated successfully.")
                } else {
                    Notice::info("Entry Added", "A new entry was added successfully.")
                });
                if let Err(error) = self.load().await {
                    tracing::warn!("Entry {} saved but list refresh failed: {}", entry.id, error);
                }
                Ok(entry)
            }
            Err(SubmitError::Save(error)) => {
                tracing::warn!("Failed to save entry: {}", error);
                self.notices
                    .push(Notice::failure("Save Failed", error.to_string()));
                Err(SubmitError::Save(error))
            }
            Err(invalid) => Err(invalid),
        }
    }

    /// Ask for confirmation before deleting
    pub fn request_delete(&mut self, id: EntryId) -> PendingDelete {
        self.notices.push(Notice::failure(
            "Delete Entry?",
            "Are you sure you want to delete this entry?",
        ));
        self.pending_delete = Some(id.clone());
        PendingDelete { id }
    }

    /// Drop a pending delete without touching the store
    pub fn cancel_delete(&mut self) -> Option<EntryId> {
        self.pending_delete.take()
    }

    /// Perform a confirmed delete, then refetch.
    pub async fn confirm_delete(&mut self, pending: PendingDelete) -> Result<()> {
        if self.pending_delete.as_ref() != Some(&pending.id) {
            return Err(Error::InvalidInput(format!(
                "no pending delete for entry {}",
                pending.id
            )));
        }
        self.pending_delete = None;

        if let Err(error) = self.store.delete(&pending.id).await {
            tracing::warn!("Failed to delete entry {}: {}", pending.id, error);
            self.notices
                .push(Notice::failure("Delete Failed", error.to_string()));
            return Err(error);
        }

        self.notices.push(Notice::info(
            "Entry Deleted",
            "The entry was deleted successfully.",
        ));
        if let Err(error) = self.load().await {
            tracing::warn!("Entry deleted but list refresh failed: {}", error);
        }
        Ok(())
    }
}

/// Read-only viewer controller
pub struct VaultViewer<S> {
    store: S,
    list: EntryList,
    browser: EntryBrowser,
}

impl<S: EntryStore> VaultViewer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            list: EntryList::default(),
            browser: EntryBrowser::default(),
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        if self.list.refresh(&self.store).await? {
            self.browser.replace_entries(self.list.entries.clone());
        }
        Ok(())
    }

    pub const fn load_state(&self) -> &LoadState {
        &self.list.load_state
    }

    pub const fn browser(&self) -> &EntryBrowser {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut EntryBrowser {
        &mut self.browser
    }
}
