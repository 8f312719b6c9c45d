//! A client and an employee chatting about one order, relayed through the
//! hub exactly as two WebSocket connections would be.

#![allow(clippy::unwrap_used)]

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::StreamExt;
use futures::channel::mpsc;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use ebookstore_core::OrderId;
use ebookstore_storefront::chat::{
    self, ChatHub, ChatParticipant, ChatRole, MemoryPresence, PresenceStore,
};

const PRESENCE_TTL: Duration = Duration::from_secs(10);

/// Browser side of one connection.
struct Connection {
    send: mpsc::UnboundedSender<Result<Message, Infallible>>,
    events: mpsc::UnboundedReceiver<Message>,
    task: JoinHandle<()>,
}

impl Connection {
    fn open(hub: &Arc<ChatHub>, presence: &Arc<MemoryPresence>, who: ChatParticipant) -> Self {
        let (out_tx, events) = mpsc::unbounded();
        let (send, in_rx) = mpsc::unbounded();
        let hub = Arc::clone(hub);
        let presence = Arc::clone(presence);

        let task = tokio::spawn(async move {
            chat::run(out_tx, in_rx, &hub, presence.as_ref(), PRESENCE_TTL, &who).await;
        });

        Self { send, events, task }
    }

    fn say(&self, frame: &Value) {
        self.send
            .unbounded_send(Ok(Message::Text(frame.to_string().into())))
            .unwrap();
    }

    async fn next(&mut self) -> Value {
        let frame = tokio::time::timeout(Duration::from_secs(5), self.events.next())
            .await
            .expect("timed out waiting for a chat event")
            .unwrap();
        match frame {
            Message::Text(body) => serde_json::from_str(body.as_str()).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    async fn close(self) {
        drop(self.send);
        self.task.await.unwrap();
    }
}

fn participant(order: i32, username: &str, email: &str, role: ChatRole) -> ChatParticipant {
    ChatParticipant {
        order_id: OrderId::new(order),
        username: username.to_string(),
        email: email.to_string(),
        role,
    }
}

#[tokio::test]
async fn client_and_employee_see_each_other() {
    let hub = Arc::new(ChatHub::new(32));
    let presence = Arc::new(MemoryPresence::default());

    let mut client = Connection::open(
        &hub,
        &presence,
        participant(7, "Wanjiku Kamau", "wanjiku@example.com", ChatRole::Client),
    );
    assert_eq!(
        client.next().await,
        json!({"type": "chat_join", "username": "Wanjiku Kamau"})
    );

    let mut employee = Connection::open(
        &hub,
        &presence,
        participant(7, "Otieno", "otieno@ebookstore.co.ke", ChatRole::Employee),
    );
    let joined = json!({"type": "chat_join", "username": "Otieno"});
    assert_eq!(employee.next().await, joined);
    assert_eq!(client.next().await, joined);
    assert_eq!(hub.member_count("customer-service_7").await, 2);

    client.say(&json!({"type": "message", "message": "Where is my parcel?"}));
    let question = json!({
        "type": "chat_message",
        "username": "Wanjiku Kamau",
        "message": "Where is my parcel?"
    });
    assert_eq!(client.next().await, question);
    assert_eq!(employee.next().await, question);

    employee.say(&json!({"type": "heartbeat"}));
    employee.say(&json!({"type": "message", "message": "Sent this morning."}));
    let answer = json!({
        "type": "chat_message",
        "username": "Otieno",
        "message": "Sent this morning."
    });
    assert_eq!(employee.next().await, answer);
    assert_eq!(client.next().await, answer);

    assert!(
        presence
            .is_alive(&chat::presence_key(OrderId::new(7), "otieno@ebookstore.co.ke"))
            .await
    );
    assert!(
        !presence
            .is_alive(&chat::presence_key(OrderId::new(7), "wanjiku@example.com"))
            .await
    );

    employee.close().await;
    assert_eq!(
        client.next().await,
        json!({"type": "chat_leave", "username": "Otieno"})
    );
    assert_eq!(hub.member_count("customer-service_7").await, 1);

    client.close().await;
    assert_eq!(hub.group_count().await, 0);
}

#[tokio::test]
async fn orders_do_not_share_a_chat() {
    let hub = Arc::new(ChatHub::new(32));
    let presence = Arc::new(MemoryPresence::default());

    let mut first = Connection::open(
        &hub,
        &presence,
        participant(1, "Achieng", "achieng@example.com", ChatRole::Client),
    );
    first.next().await;

    let mut second = Connection::open(
        &hub,
        &presence,
        participant(2, "Baraka", "baraka@example.com", ChatRole::Client),
    );
    second.next().await;
    assert_eq!(hub.group_count().await, 2);

    second.say(&json!({"type": "message", "message": "Hello?"}));
    assert_eq!(
        second.next().await,
        json!({"type": "chat_message", "username": "Baraka", "message": "Hello?"})
    );

    first.say(&json!({"type": "message", "message": "ping"}));
    // The first event the first client sees after its own join is its own
    // message: nothing leaked across from order 2.
    assert_eq!(
        first.next().await,
        json!({"type": "chat_message", "username": "Achieng", "message": "ping"})
    );

    first.close().await;
    second.close().await;
    assert_eq!(hub.group_count().await, 0);
}

#[tokio::test]
async fn malformed_frames_do_not_end_the_chat() {
    let hub = Arc::new(ChatHub::new(8));
    let presence = Arc::new(MemoryPresence::default());

    let mut client = Connection::open(
        &hub,
        &presence,
        participant(3, "Amina", "amina@example.com", ChatRole::Client),
    );
    client.next().await;

    client
        .send
        .unbounded_send(Ok(Message::Text("not json".into())))
        .unwrap();
    client.say(&json!({"type": "typing"}));
    client.say(&json!({"type": "message"}));
    client.say(&json!({"type": "message", "message": "still here"}));

    assert_eq!(
        client.next().await,
        json!({"type": "chat_message", "username": "Amina", "message": "still here"})
    );
    client.close().await;
}
