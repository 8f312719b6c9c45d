//! One open chat connection.
//!
//! The relay is generic over the socket halves so it can be driven by an
//! axum `WebSocket` or by in-memory channels.

use std::fmt::Display;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use ebookstore_core::OrderId;

use super::authorize::ChatRole;
use super::hub::{ChatHub, Membership};
use super::message::{ChatEvent, ClientFrame};
use super::presence::PresenceStore;
use super::{group_name, presence_key};

/// Who is on the connection and where they are chatting.
#[derive(Debug, Clone)]
pub struct ChatParticipant {
    pub order_id: OrderId,
    /// Shown to the other side.
    pub username: String,
    /// Identifies the participant in presence keys and logs.
    pub email: String,
    pub role: ChatRole,
}

/// Relay frames between a socket and the order's chat group until either
/// side closes.
pub async fn run<Tx, Rx, E>(
    mut outbound: Tx,
    mut inbound: Rx,
    hub: &ChatHub,
    presence: &dyn PresenceStore,
    presence_ttl: Duration,
    participant: &ChatParticipant,
) where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut membership = hub.join(&group_name(participant.order_id)).await;
    membership.publish(ChatEvent::ChatJoin {
        username: participant.username.clone(),
    });

    loop {
        select! {
            frame = inbound.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(text.as_str(), &membership, presence, presence_ttl, participant).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!(error = %err, "chat socket error");
                        break;
                    }
                }
            }
            event = membership.recv() => {
                if !forward_event(event, &mut outbound, participant).await {
                    break;
                }
            }
        }
    }

    membership.publish(ChatEvent::ChatLeave {
        username: participant.username.clone(),
    });
    info!(
        order_id = %participant.order_id,
        role = participant.role.as_str(),
        "Closing chat stream for user {}",
        participant.email
    );
    hub.leave(membership).await;
}

async fn handle_frame(
    text: &str,
    membership: &Membership,
    presence: &dyn PresenceStore,
    presence_ttl: Duration,
    participant: &ChatParticipant,
) {
    match ClientFrame::parse(text) {
        Some(ClientFrame::Message { message }) => {
            membership.publish(ChatEvent::ChatMessage {
                username: participant.username.clone(),
                message,
            });
        }
        Some(ClientFrame::Heartbeat) => {
            let key = presence_key(participant.order_id, &participant.email);
            presence.mark_alive(&key, presence_ttl).await;
        }
        None => {}
    }
}

/// Returns `false` when the connection should end.
async fn forward_event<Tx>(
    event: Result<ChatEvent, RecvError>,
    outbound: &mut Tx,
    participant: &ChatParticipant,
) -> bool
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
{
    match event {
        Ok(event) => {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to encode chat event");
                    return true;
                }
            };
            if let Err(err) = outbound.send(Message::Text(json.into())).await {
                debug!(error = %err, "failed to deliver chat event");
                return false;
            }
            true
        }
        Err(RecvError::Lagged(skipped)) => {
            warn!(order_id = %participant.order_id, skipped, "chat connection lagged");
            true
        }
        Err(RecvError::Closed) => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::convert::Infallible;
    use std::sync::Arc;

    use futures::channel::mpsc;

    use super::*;
    use crate::chat::presence::MemoryPresence;

    fn participant(name: &str, role: ChatRole) -> ChatParticipant {
        ChatParticipant {
            order_id: OrderId::new(5),
            username: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
        }
    }

    fn text(json: &str) -> Result<Message, Infallible> {
        Ok(Message::Text(json.to_string().into()))
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<Message>) -> serde_json::Value {
        match rx.next().await.unwrap() {
            Message::Text(body) => serde_json::from_str(body.as_str()).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[tokio::test]
    async fn joiner_sees_own_join_and_echoed_messages() {
        let hub = Arc::new(ChatHub::new(16));
        let presence = Arc::new(MemoryPresence::default());
        let (out_tx, mut out_rx) = mpsc::unbounded();
        let (in_tx, in_rx) = mpsc::unbounded();

        let task = tokio::spawn({
            let hub = Arc::clone(&hub);
            let presence = Arc::clone(&presence);
            async move {
                let who = participant("Achieng", ChatRole::Client);
                run(out_tx, in_rx, &hub, presence.as_ref(), Duration::from_secs(10), &who).await;
            }
        });

        assert_eq!(
            next_event(&mut out_rx).await,
            serde_json::json!({"type": "chat_join", "username": "Achieng"})
        );

        in_tx.unbounded_send(text(r#"{"type":"bogus"}"#)).unwrap();
        in_tx.unbounded_send(text(r#"{"type":"heartbeat"}"#)).unwrap();
        in_tx
            .unbounded_send(text(r#"{"type":"message","message":"Habari"}"#))
            .unwrap();

        assert_eq!(
            next_event(&mut out_rx).await,
            serde_json::json!({"type": "chat_message", "username": "Achieng", "message": "Habari"})
        );
        assert!(presence.is_alive("customer-service_5_achieng@example.com").await);

        drop(in_tx);
        task.await.unwrap();
        assert_eq!(hub.group_count().await, 0);
    }

    #[tokio::test]
    async fn close_frame_ends_the_session() {
        let hub = ChatHub::new(4);
        let presence = MemoryPresence::default();
        let (out_tx, mut out_rx) = mpsc::unbounded();
        let (in_tx, in_rx) = mpsc::unbounded();

        in_tx.unbounded_send(Ok::<_, Infallible>(Message::Close(None))).unwrap();
        let who = participant("Otieno", ChatRole::Employee);
        run(out_tx, in_rx, &hub, &presence, Duration::from_secs(10), &who).await;

        // The join may or may not be forwarded before the close is read.
        while let Ok(frame) = out_rx.try_recv() {
            assert!(matches!(frame, Message::Text(_)));
        }
        assert_eq!(hub.group_count().await, 0);
    }
}
