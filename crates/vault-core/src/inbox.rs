//! Contact-message inbox: list, detail view, selection, deletes and replies.

use std::collections::BTreeSet;

use crate::models::{Message, MessageId};
use crate::notice::Notice;
use crate::store::MessageStore;
use crate::vault::LoadState;
use crate::{Error, Result};

/// Which pane of the inbox is showing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InboxView {
    #[default]
    Listing,
    Viewing(MessageId),
}

/// A reply that was accepted for sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub to: String,
    pub to_name: String,
    pub content: String,
    pub original_message_id: MessageId,
}

/// Inbox controller over a [`MessageStore`]
pub struct Inbox<S> {
    store: S,
    messages: Vec<Message>,
    load_state: LoadState,
    view: InboxView,
    selected: BTreeSet<MessageId>,
    reply_draft: String,
    notices: Vec<Notice>,
}

impl<S: MessageStore> Inbox<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            messages: Vec::new(),
            load_state: LoadState::Idle,
            view: InboxView::Listing,
            selected: BTreeSet::new(),
            reply_draft: String::new(),
            notices: Vec::new(),
        }
    }

    /// Messages, newest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub const fn view(&self) -> &InboxView {
        &self.view
    }

    pub const fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub const fn selected(&self) -> &BTreeSet<MessageId> {
        &self.selected
    }

    pub fn reply_draft(&self) -> &str {
        &self.reply_draft
    }

    /// The message open in the detail pane
    pub fn open_message(&self) -> Option<&Message> {
        match &self.view {
            InboxView::Viewing(id) => self.find(id),
            InboxView::Listing => None,
        }
    }

    pub fn find(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| &message.id == id)
    }

    /// Drain notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Fetch every message. On failure the current list is kept.
    pub async fn load(&mut self) -> Result<()> {
        self.load_state = LoadState::Loading;
        match self.store.fetch_all().await {
            Ok(messages) => {
                self.messages = messages;
                self.load_state = LoadState::Ready;
                self.prune_stale();
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Failed to fetch messages: {}", error);
                self.load_state = LoadState::Failed(error.to_string());
                self.notices
                    .push(Notice::failure("Error", "Failed to fetch messages."));
                Err(error)
            }
        }
    }

    /// Show one message in the detail pane
    pub fn open(&mut self, id: &MessageId) -> Result<&Message> {
        if self.find(id).is_none() {
            return Err(Error::NotFound(format!("message {id}")));
        }
        self.view = InboxView::Viewing(id.clone());
        self.reply_draft.clear();
        self.find(id)
            .ok_or_else(|| Error::NotFound(format!("message {id}")))
    }

    /// Return to the list and clear the selection
    pub fn back_to_list(&mut self) {
        self.view = InboxView::Listing;
        self.selected.clear();
        self.reply_draft.clear();
    }

    /// Flip selection for one message; returns whether it is now selected
    pub fn toggle_selected(&mut self, id: &MessageId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Delete one message, then refetch.
    pub async fn delete_message(&mut self, id: &MessageId) -> Result<()> {
        if let Err(error) = self.store.delete(id).await {
            tracing::warn!("Failed to delete message {}: {}", id, error);
            self.notices
                .push(Notice::failure("Error", "Failed to delete message."));
            return Err(error);
        }
        tracing::info!("Deleted message {}", id);

        self.forget(std::slice::from_ref(id));
        self.notices.push(Notice::info(
            "Message deleted",
            "Message has been deleted successfully.",
        ));
        self.refetch_after_mutation().await;
        Ok(())
    }

    /// Delete every selected message in one request, then refetch.
    pub async fn delete_selected(&mut self) -> Result<usize> {
        let ids = self.selected.iter().cloned().collect::<Vec<_>>();
        if ids.is_empty() {
            return Ok(0);
        }

        if let Err(error) = self.store.delete_many(&ids).await {
            tracing::warn!("Failed to delete {} messages: {}", ids.len(), error);
            self.notices
                .push(Notice::failure("Error", "Failed to delete messages."));
            return Err(error);
        }
        tracing::info!("Deleted {} messages", ids.len());

        self.forget(&ids);
        self.selected.clear();
        self.notices.push(Notice::info(
            "Messages deleted",
            format!("{} messages have been deleted.", ids.len()),
        ));
        self.refetch_after_mutation().await;
        Ok(ids.len())
    }

    /// Apply a realtime insert. Returns false for a message already listed.
    pub fn apply_insert(&mut self, message: Message) -> bool {
        if self.find(&message.id).is_some() {
            return false;
        }
        self.notices.push(Notice::info(
            "New Message",
            format!("{} sent you a message", message.name),
        ));
        self.messages.insert(0, message);
        true
    }

    pub fn compose_reply(&mut self, text: impl Into<String>) {
        self.reply_draft = text.into();
    }

    /// Accept the reply draft for the open message.
    ///
    /// Replies are recorded in the log only; nothing is transmitted.
    pub fn send_reply(&mut self) -> Result<SentReply> {
        let content = self.reply_draft.trim();
        if content.is_empty() {
            return Err(Error::InvalidInput("reply text is empty".to_string()));
        }
        let message = self
            .open_message()
            .ok_or_else(|| Error::InvalidInput("no message is open".to_string()))?;

        let reply = SentReply {
            to: message.email.clone(),
            to_name: message.name.clone(),
            content: content.to_string(),
            original_message_id: message.id.clone(),
        };
        tracing::info!(
            to = %reply.to,
            to_name = %reply.to_name,
            original_message_id = %reply.original_message_id,
            content = %reply.content,
            "Reply recorded"
        );

        self.notices.push(Notice::info(
            "Reply sent",
            format!("Reply sent to {}", reply.to_name),
        ));
        self.reply_draft.clear();
        Ok(reply)
    }

    fn forget(&mut self, ids: &[MessageId]) {
        self.messages.retain(|message| !ids.contains(&message.id));
        self.prune_stale();
    }

    /// Drop selection and view references to messages no longer listed
    fn prune_stale(&mut self) {
        let messages = &self.messages;
        self.selected
            .retain(|id| messages.iter().any(|message| &message.id == id));
        if let InboxView::Viewing(id) = &self.view {
            if !messages.iter().any(|message| &message.id == id) {
                self.view = InboxView::Listing;
                self.reply_draft.clear();
            }
        }
    }

    async fn refetch_after_mutation(&mut self) {
        if let Err(error) = self.load().await {
            tracing::warn!("Message list refresh after delete failed: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::MemoryStore;

    fn message(id: &str, name: &str, minutes_ago: i64) -> Message {
        Message {
            id: MessageId::new(id),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            message: format!("Hello from {name}"),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn seeded() -> MemoryStore {
        MemoryStore::with_messages(vec![
            message("1", "Ada", 1),
            message("2", "Grace", 2),
            message("3", "Linus", 3),
        ])
    }

    fn ids(inbox: &Inbox<MemoryStore>) -> Vec<&str> {
        inbox
            .messages()
            .iter()
            .map(|message| message.id.as_str())
            .collect()
    }

    #[tokio::test]
    async fn failed_load_raises_notice() {
        let store = seeded();
        store.fail_next("offline");
        let mut inbox = Inbox::new(store);

        assert!(inbox.load().await.is_err());
        assert!(matches!(inbox.load_state(), LoadState::Failed(_)));
        let notices = inbox.take_notices();
        assert_eq!(notices[0].description, "Failed to fetch messages.");
    }

    #[tokio::test]
    async fn deleting_open_selected_message_clears_everything() {
        let mut inbox = Inbox::new(seeded());
        inbox.load().await.unwrap();

        let target = MessageId::new("2");
        assert!(inbox.toggle_selected(&target));
        inbox.open(&target).unwrap();
        inbox.delete_message(&target).await.unwrap();

        assert_eq!(ids(&inbox), vec!["1", "3"]);
        assert!(!inbox.selected().contains(&target));
        assert_eq!(inbox.view(), &InboxView::Listing);
    }

    #[tokio::test]
    async fn failed_delete_keeps_state() {
        let store = seeded();
        let mut inbox = Inbox::new(store.clone());
        inbox.load().await.unwrap();
        inbox.open(&MessageId::new("1")).unwrap();

        store.fail_next("denied");
        assert!(inbox.delete_message(&MessageId::new("1")).await.is_err());
        assert_eq!(ids(&inbox), vec!["1", "2", "3"]);
        assert_eq!(inbox.view(), &InboxView::Viewing(MessageId::new("1")));
        assert_eq!(
            inbox.take_notices()[0].description,
            "Failed to delete message."
        );
    }

    #[tokio::test]
    async fn bulk_delete_clears_selection() {
        let store = seeded();
        let mut inbox = Inbox::new(store.clone());
        inbox.load().await.unwrap();

        inbox.toggle_selected(&MessageId::new("1"));
        inbox.toggle_selected(&MessageId::new("3"));
        assert_eq!(inbox.delete_selected().await.unwrap(), 2);

        assert_eq!(ids(&inbox), vec!["2"]);
        assert!(inbox.selected().is_empty());
        assert_eq!(store.messages_snapshot().len(), 1);
        assert_eq!(
            inbox.take_notices()[0].description,
            "2 messages have been deleted."
        );
    }

    #[tokio::test]
    async fn bulk_delete_with_empty_selection_is_a_no_op() {
        let store = seeded();
        let mut inbox = Inbox::new(store.clone());
        inbox.load().await.unwrap();
        let before = store.request_count();

        assert_eq!(inbox.delete_selected().await.unwrap(), 0);
        assert_eq!(store.request_count(), before);
    }

    #[tokio::test]
    async fn back_to_list_clears_selection() {
        let mut inbox = Inbox::new(seeded());
        inbox.load().await.unwrap();
        inbox.toggle_selected(&MessageId::new("1"));
        inbox.open(&MessageId::new("2")).unwrap();

        inbox.back_to_list();
        assert!(inbox.selected().is_empty());
        assert_eq!(inbox.view(), &InboxView::Listing);
    }

    #[tokio::test]
    async fn toggle_twice_deselects() {
        let mut inbox = Inbox::new(seeded());
        inbox.load().await.unwrap();
        let id = MessageId::new("3");
        assert!(inbox.toggle_selected(&id));
        assert!(!inbox.toggle_selected(&id));
        assert!(inbox.selected().is_empty());
    }

    #[test]
    fn realtime_insert_prepends_once() {
        let mut inbox = Inbox::new(MemoryStore::new());
        let fresh = message("9", "Margaret", 0);

        assert!(inbox.apply_insert(fresh.clone()));
        assert!(!inbox.apply_insert(fresh));
        assert_eq!(inbox.messages().len(), 1);

        let notices = inbox.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "New Message");
        assert_eq!(notices[0].description, "Margaret sent you a message");
    }

    #[tokio::test]
    async fn reply_requires_text_and_open_message() {
        let mut inbox = Inbox::new(seeded());
        inbox.load().await.unwrap();

        inbox.compose_reply("Thanks!");
        assert!(inbox.send_reply().is_err());

        inbox.open(&MessageId::new("1")).unwrap();
        inbox.compose_reply("   ");
        assert!(inbox.send_reply().is_err());

        inbox.compose_reply("Thanks for reaching out");
        let reply = inbox.send_reply().unwrap();
        assert_eq!(reply.to, "ada@example.com");
        assert_eq!(reply.original_message_id, MessageId::new("1"));
        assert!(inbox.reply_draft().is_empty());
        assert_eq!(
            inbox.take_notices().last().unwrap().description,
            "Reply sent to Ada"
        );
    }

    #[tokio::test]
    async fn opening_another_message_clears_reply_draft() {
        let mut inbox = Inbox::new(seeded());
        inbox.load().await.unwrap();
        inbox.open(&MessageId::new("1")).unwrap();
        inbox.compose_reply("half written");

        inbox.open(&MessageId::new("2")).unwrap();
        assert_eq!(inbox.reply_draft(), "");
    }
}
