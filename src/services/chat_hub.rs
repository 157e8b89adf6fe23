//! In-process publish/subscribe registry for live chat delivery.
//!
//! Each conversation between two vendors gets one broadcast group, keyed by the
//! sorted pair of participant ids. Groups are created on first subscribe and
//! removed when their last subscription is dropped, so a disconnected socket
//! never keeps a group alive.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::dto::chat_dto::ChatFrame;

pub const DEFAULT_GROUP_CAPACITY: usize = 256;

/// Canonical identifier of the conversation between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    low: Uuid,
    high: Uuid,
}

impl ConversationKey {
    pub fn new(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn participants(&self) -> (Uuid, Uuid) {
        (self.low, self.high)
    }

    pub fn includes(&self, id: Uuid) -> bool {
        self.low == id || self.high == id
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat_{}_{}", self.low, self.high)
    }
}

type Groups = Arc<Mutex<HashMap<ConversationKey, broadcast::Sender<ChatFrame>>>>;

fn lock(groups: &Groups) -> MutexGuard<'_, HashMap<ConversationKey, broadcast::Sender<ChatFrame>>> {
    groups.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone)]
pub struct ChatHub {
    groups: Groups,
    capacity: usize,
}

impl ChatHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            groups: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, key: ConversationKey) -> Subscription {
        let receiver = lock(&self.groups)
            .entry(key)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        tracing::debug!(group = %key, "chat subscriber joined");
        Subscription {
            key,
            receiver: Some(receiver),
            groups: Arc::clone(&self.groups),
        }
    }

    /// Delivers `frame` to the current subscribers of `key` and returns how many
    /// received it. Nobody listening is not an error.
    pub fn publish(&self, key: ConversationKey, frame: ChatFrame) -> usize {
        let groups = lock(&self.groups);
        match groups.get(&key) {
            Some(sender) => sender.send(frame).unwrap_or(0),
            None => 0,
        }
    }

    pub fn group_count(&self) -> usize {
        lock(&self.groups).len()
    }

    pub fn subscriber_count(&self, key: ConversationKey) -> usize {
        lock(&self.groups)
            .get(&key)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_CAPACITY)
    }
}

/// A live feed of one conversation. Dropping it leaves the group.
pub struct Subscription {
    key: ConversationKey,
    receiver: Option<broadcast::Receiver<ChatFrame>>,
    groups: Groups,
}

impl Subscription {
    pub fn key(&self) -> ConversationKey {
        self.key
    }

    /// Next frame for this subscriber. Frames missed while lagging are skipped.
    pub async fn recv(&mut self) -> Option<ChatFrame> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(frame) => return Some(frame),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(group = %self.key, skipped, "chat subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        drop(self.receiver.take());
        let mut groups = lock(&self.groups);
        let empty = groups
            .get(&self.key)
            .is_some_and(|sender| sender.receiver_count() == 0);
        if empty {
            groups.remove(&self.key);
        }
        tracing::debug!(group = %self.key, "chat subscriber left");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn frame(sender_id: Uuid, receiver_id: Uuid, message: &str) -> ChatFrame {
        ChatFrame {
            id: Uuid::new_v4(),
            message: message.to_string(),
            sender_id,
            receiver_id,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn key_is_order_independent() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(ConversationKey::new(a, b), ConversationKey::new(b, a));
        assert_eq!(
            ConversationKey::new(a, b).to_string(),
            ConversationKey::new(b, a).to_string()
        );
        assert!(ConversationKey::new(a, b).includes(a));
        assert!(!ConversationKey::new(a, b).includes(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn both_participants_receive_published_frames() {
        let hub = ChatHub::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut a_side = hub.subscribe(ConversationKey::new(a, b));
        let mut b_side = hub.subscribe(ConversationKey::new(b, a));

        let delivered = hub.publish(ConversationKey::new(a, b), frame(a, b, "hello"));
        assert_eq!(delivered, 2);
        assert_eq!(a_side.recv().await.unwrap().message, "hello");
        assert_eq!(b_side.recv().await.unwrap().message, "hello");
    }

    #[tokio::test]
    async fn conversations_sharing_a_participant_stay_isolated() {
        let hub = ChatHub::default();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut bc = hub.subscribe(ConversationKey::new(b, c));
        let mut ab = hub.subscribe(ConversationKey::new(a, b));

        hub.publish(ConversationKey::new(a, b), frame(a, b, "for b only"));
        assert_eq!(ab.recv().await.unwrap().message, "for b only");

        let mut pending = tokio_test::task::spawn(bc.recv());
        tokio_test::assert_pending!(pending.poll());
    }

    #[tokio::test]
    async fn dropping_last_subscription_removes_group() {
        let hub = ChatHub::default();
        let key = ConversationKey::new(Uuid::new_v4(), Uuid::new_v4());
        let first = hub.subscribe(key);
        let second = hub.subscribe(key);
        assert_eq!(hub.subscriber_count(key), 2);

        drop(first);
        assert_eq!(hub.group_count(), 1);
        assert_eq!(hub.subscriber_count(key), 1);

        drop(second);
        assert_eq!(hub.group_count(), 0);
    }

    #[test]
    fn publish_without_subscribers_creates_nothing() {
        let hub = ChatHub::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(hub.publish(ConversationKey::new(a, b), frame(a, b, "void")), 0);
        assert_eq!(hub.group_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_subscribe_and_drop_leaves_no_groups() {
        let hub = ChatHub::default();
        let key = ConversationKey::new(Uuid::new_v4(), Uuid::new_v4());
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let hub = hub.clone();
            tasks.push(tokio::spawn(async move {
                let sub = hub.subscribe(key);
                tokio::task::yield_now().await;
                drop(sub);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(hub.group_count(), 0);
    }
}
