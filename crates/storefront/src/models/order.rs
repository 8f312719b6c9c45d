//! Orders and order lines.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ebookstore_core::{BookId, County, OrderId, OrderLineId, OrderLineStatus, OrderStatus, UserId};

use super::address::Address;

/// Name and postal details copied onto an order at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressSnapshot {
    pub name: String,
    pub address: String,
    pub town: String,
    pub county: County,
}

impl From<&Address> for AddressSnapshot {
    fn from(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            address: address.address.clone(),
            town: address.town.clone(),
            county: address.county,
        }
    }
}

/// A submitted order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub billing_name: String,
    pub billing_address: String,
    pub billing_town: String,
    pub billing_county: County,
    pub shipping_name: String,
    pub shipping_address: String,
    pub shipping_town: String,
    pub shipping_county: County,
    pub date_added: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    /// Staff member who last opened the customer-service chat for this order.
    pub last_spoken_to: Option<UserId>,
}

/// An order line joined with its book name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub book_id: BookId,
    pub book_name: String,
    pub status: OrderLineStatus,
}

/// An order with its lines, as shown on detail pages.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Filters for order listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<UserId>,
}

/// Filters for order line listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderLineFilter {
    pub order_id: Option<OrderId>,
    pub status: Option<OrderLineStatus>,
    /// Only lines whose order has this status.
    pub order_status: Option<OrderStatus>,
}
