//! Customer-service chat.
//!
//! Each order has a chat group `customer-service_<order_id>` joined by the
//! customer who placed it and by customer-service employees. Connections
//! are authorized before the WebSocket upgrade; after that every connection
//! runs one task relaying JSON frames between its socket and the group.
//!
//! # Frames
//!
//! Browser to server:
//! - `{"type":"message","message":"..."}` broadcast to the group
//! - `{"type":"heartbeat"}` refreshes the sender's presence key
//!
//! Server to browser: `chat_join`, `chat_leave` and `chat_message` events.
//!
//! # Presence
//!
//! Heartbeats set `customer-service_<order_id>_<email>` in a
//! [`PresenceStore`] with a short TTL, so pages can show whether the staff
//! member on an order is online.

pub mod authorize;
pub mod hub;
pub mod message;
pub mod presence;
pub mod session;

use ebookstore_core::OrderId;

pub use authorize::{ChatRejection, ChatRole, authorize, role_for};
pub use hub::{ChatHub, Membership};
pub use message::{ChatEvent, ClientFrame};
pub use presence::{MemoryPresence, PresenceStore};
pub use session::{ChatParticipant, run};

/// Name of an order's chat group.
#[must_use]
pub fn group_name(order_id: OrderId) -> String {
    format!("customer-service_{order_id}")
}

/// Presence key for one participant of an order's chat.
#[must_use]
pub fn presence_key(order_id: OrderId, email: &str) -> String {
    format!("{}_{email}", group_name(order_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_group_naming() {
        let order = OrderId::new(42);
        assert_eq!(group_name(order), "customer-service_42");
        assert_eq!(
            presence_key(order, "staff@ebookstore.co.ke"),
            "customer-service_42_staff@ebookstore.co.ke"
        );
    }
}
