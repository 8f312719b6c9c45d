//! In-process pub/sub for chat groups.
//!
//! One broadcast channel per active group. A group exists while at least one
//! member holds a [`Membership`].

use std::collections::HashMap;

use tokio::sync::{Mutex, broadcast};

use super::message::ChatEvent;

/// Registry of chat groups.
#[derive(Debug)]
pub struct ChatHub {
    groups: Mutex<HashMap<String, broadcast::Sender<ChatEvent>>>,
    capacity: usize,
}

/// A connection's place in a group: its inbox plus a handle to publish.
#[derive(Debug)]
pub struct Membership {
    group: String,
    sender: broadcast::Sender<ChatEvent>,
    inbox: broadcast::Receiver<ChatEvent>,
}

impl ChatHub {
    /// Create a hub whose groups buffer `capacity` events per member.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Join a group, creating it if needed.
    pub async fn join(&self, group: &str) -> Membership {
        let mut groups = self.groups.lock().await;
        let sender = groups
            .entry(group.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone();
        let inbox = sender.subscribe();

        Membership {
            group: group.to_string(),
            sender,
            inbox,
        }
    }

    /// Leave a group, dropping it when the last member is gone.
    pub async fn leave(&self, membership: Membership) {
        let Membership { group, inbox, .. } = membership;
        drop(inbox);

        let mut groups = self.groups.lock().await;
        if groups
            .get(&group)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            groups.remove(&group);
            tracing::debug!(%group, "chat group closed");
        }
    }

    /// Number of members currently in `group`.
    pub async fn member_count(&self, group: &str) -> usize {
        self.groups
            .lock()
            .await
            .get(group)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Number of groups with at least one member.
    pub async fn group_count(&self) -> usize {
        self.groups.lock().await.len()
    }
}

impl Membership {
    /// Group name.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Send an event to every member, including this one.
    pub fn publish(&self, event: ChatEvent) {
        if let Err(error) = self.sender.send(event) {
            tracing::warn!(group = %self.group, ?error, "failed to broadcast chat event");
        }
    }

    /// Wait for the next event delivered to the group.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged` when this member fell behind and events
    /// were skipped.
    pub async fn recv(&mut self) -> Result<ChatEvent, broadcast::error::RecvError> {
        self.inbox.recv().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn join_event(name: &str) -> ChatEvent {
        ChatEvent::ChatJoin {
            username: name.to_string(),
        }
    }

    #[tokio::test]
    async fn members_of_a_group_see_each_others_events() {
        let hub = ChatHub::new(8);
        let mut a = hub.join("customer-service_1").await;
        let mut b = hub.join("customer-service_1").await;

        a.publish(join_event("a"));

        assert_eq!(a.recv().await.unwrap(), join_event("a"));
        assert_eq!(b.recv().await.unwrap(), join_event("a"));
        assert_eq!(hub.member_count("customer-service_1").await, 2);
    }

    #[tokio::test]
    async fn groups_are_isolated() {
        let hub = ChatHub::new(8);
        let one = hub.join("customer-service_1").await;
        let mut two = hub.join("customer-service_2").await;

        one.publish(join_event("one"));
        two.publish(join_event("two"));

        assert_eq!(two.recv().await.unwrap(), join_event("two"));
        assert!(two.inbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn last_member_leaving_drops_the_group() {
        let hub = ChatHub::new(8);
        let a = hub.join("customer-service_9").await;
        let b = hub.join("customer-service_9").await;
        assert_eq!(hub.group_count().await, 1);

        hub.leave(a).await;
        assert_eq!(hub.group_count().await, 1);
        assert_eq!(hub.member_count("customer-service_9").await, 1);

        hub.leave(b).await;
        assert_eq!(hub.group_count().await, 0);
    }

    #[tokio::test]
    async fn slow_member_lags_instead_of_blocking() {
        let hub = ChatHub::new(2);
        let sender = hub.join("customer-service_3").await;
        let mut slow = hub.join("customer-service_3").await;

        for i in 0..5 {
            sender.publish(join_event(&i.to_string()));
        }

        assert!(matches!(
            slow.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert_eq!(slow.recv().await.unwrap(), join_event("3"));
    }
}
