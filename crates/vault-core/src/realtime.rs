//! Realtime message feed.
//!
//! New rows are discovered by polling [`MessageStore::fetch_since`] on a
//! background task and forwarded over a channel. Each poll re-reads a short
//! window behind the newest delivered timestamp so rows that share a
//! timestamp or commit late are not lost; ids already sent are skipped. The
//! returned [`Subscription`] owns the task; releasing it more than once is a
//! no-op.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::models::{Message, MessageId};
use crate::store::MessageStore;

/// Buffered events before the poller waits on the receiver
const EVENT_BUFFER: usize = 64;
/// How far behind the newest delivered `created_at` each poll starts
const REPLAY_WINDOW_SECS: i64 = 30;

/// A change observed on the messages collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEvent {
    Inserted(Message),
}

pub struct MessageFeed;

impl MessageFeed {
    /// Start watching for messages created after `since`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<S>(store: S, since: DateTime<Utc>, interval: Duration) -> Subscription
    where
        S: MessageStore + Send + Sync + 'static,
    {
        let (sender, events) = mpsc::channel(EVENT_BUFFER);
        let task = tokio::spawn(poll_messages(store, since, interval, sender));
        tracing::debug!("Message feed subscribed (interval {:?})", interval);
        Subscription {
            events,
            task: Some(task),
        }
    }
}

async fn poll_messages<S: MessageStore>(
    store: S,
    since: DateTime<Utc>,
    interval: Duration,
    sender: mpsc::Sender<MessageEvent>,
) {
    let mut cursor = FeedCursor::new(since);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let from = cursor.query_from();
        match store.fetch_since(from).await {
            Ok(messages) => {
                tracing::debug!("Polled {} messages since {}", messages.len(), from);
                for message in messages {
                    if !cursor.admit(&message) {
                        continue;
                    }
                    if sender.send(MessageEvent::Inserted(message)).await.is_err() {
                        return;
                    }
                }
                cursor.prune();
            }
            Err(error) => tracing::warn!("Message feed poll failed: {}", error),
        }
    }
}

/// Read position of the poller.
///
/// Never reads before the subscribe time; remembers delivered ids for as
/// long as they can still come back inside the replay window.
#[derive(Debug)]
struct FeedCursor {
    floor: DateTime<Utc>,
    newest: DateTime<Utc>,
    delivered: HashMap<MessageId, DateTime<Utc>>,
}

impl FeedCursor {
    fn new(since: DateTime<Utc>) -> Self {
        Self {
            floor: since,
            newest: since,
            delivered: HashMap::new(),
        }
    }

    fn query_from(&self) -> DateTime<Utc> {
        (self.newest - chrono::Duration::seconds(REPLAY_WINDOW_SECS)).max(self.floor)
    }

    /// Record a polled message. False if it was already delivered.
    fn admit(&mut self, message: &Message) -> bool {
        if self.delivered.contains_key(&message.id) {
            return false;
        }
        self.delivered.insert(message.id.clone(), message.created_at);
        self.newest = self.newest.max(message.created_at);
        true
    }

    fn prune(&mut self) {
        let from = self.query_from();
        self.delivered.retain(|_, created_at| *created_at >= from);
    }
}

/// Handle to a running feed
pub struct Subscription {
    events: mpsc::Receiver<MessageEvent>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Next event; `None` once the feed is released and drained
    pub async fn recv(&mut self) -> Option<MessageEvent> {
        self.events.recv().await
    }

    pub const fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Stop polling. Returns false if already released.
    pub fn unsubscribe(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        task.abort();
        tracing::debug!("Message feed released");
        true
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use tokio::time::timeout;

    use super::*;
    use crate::models::MessageId;
    use crate::store::MemoryStore;

    const TICK: Duration = Duration::from_millis(10);
    const WAIT: Duration = Duration::from_secs(2);

    fn message(id: &str, created_at: DateTime<Utc>) -> Message {
        Message {
            id: MessageId::new(id),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "hi".to_string(),
            created_at,
        }
    }

    #[tokio::test]
    async fn delivers_inserts_after_cutoff_once() {
        let start = Utc::now();
        let store = MemoryStore::with_messages(vec![message(
            "old",
            start - ChronoDuration::minutes(5),
        )]);
        let mut feed = MessageFeed::subscribe(store.clone(), start, TICK);

        store.insert_message(message("new", start + ChronoDuration::seconds(1)));
        let event = timeout(WAIT, feed.recv()).await.unwrap().unwrap();
        let MessageEvent::Inserted(received) = event;
        assert_eq!(received.id.as_str(), "new");

        // later polls re-read it but skip the known id
        assert!(timeout(TICK * 5, feed.recv()).await.is_err());
    }

    async fn next_id(feed: &mut Subscription) -> String {
        let event = timeout(WAIT, feed.recv()).await.unwrap().unwrap();
        let MessageEvent::Inserted(received) = event;
        received.id.as_str().to_string()
    }

    #[tokio::test]
    async fn shared_timestamps_and_late_commits_are_delivered() {
        let start = Utc::now();
        let stamp = start + ChronoDuration::seconds(10);
        let store = MemoryStore::new();
        let mut feed = MessageFeed::subscribe(store.clone(), start, TICK);

        store.insert_message(message("a", stamp));
        assert_eq!(next_id(&mut feed).await, "a");

        tokio::time::sleep(TICK * 3).await;
        store.insert_message(message("b", stamp));
        assert_eq!(next_id(&mut feed).await, "b");

        store.insert_message(message("c", stamp - ChronoDuration::seconds(5)));
        assert_eq!(next_id(&mut feed).await, "c");

        assert!(timeout(TICK * 5, feed.recv()).await.is_err());
    }

    #[test]
    fn cursor_stays_above_floor_and_forgets_old_ids() {
        let start = Utc::now();
        let mut cursor = FeedCursor::new(start);
        assert_eq!(cursor.query_from(), start);

        let early = message("early", start + ChronoDuration::seconds(1));
        assert!(cursor.admit(&early));
        assert!(!cursor.admit(&early));
        assert_eq!(cursor.query_from(), start);

        let late = message("late", start + ChronoDuration::minutes(5));
        assert!(cursor.admit(&late));
        cursor.prune();
        assert_eq!(
            cursor.query_from(),
            late.created_at - ChronoDuration::seconds(REPLAY_WINDOW_SECS)
        );
        assert!(!cursor.delivered.contains_key(&early.id));
        assert!(cursor.delivered.contains_key(&late.id));
    }

    #[tokio::test]
    async fn release_happens_once() {
        let mut feed = MessageFeed::subscribe(MemoryStore::new(), Utc::now(), TICK);
        assert!(feed.is_active());
        assert!(feed.unsubscribe());
        assert!(!feed.unsubscribe());
        assert!(!feed.is_active());

        // sender is gone with the aborted task
        assert_eq!(timeout(WAIT, feed.recv()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn poll_failures_do_not_end_the_feed() {
        let start = Utc::now();
        let store = MemoryStore::new();
        store.fail_next("flaky");
        let mut feed = MessageFeed::subscribe(store.clone(), start, TICK);

        tokio::time::sleep(TICK * 3).await;
        store.insert_message(message("late", start + ChronoDuration::seconds(1)));
        let event = timeout(WAIT, feed.recv()).await.unwrap();
        assert!(matches!(event, Some(MessageEvent::Inserted(_))));
    }
}
