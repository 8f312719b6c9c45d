//! Who may open an order's chat.

use sqlx::PgPool;

use ebookstore_core::OrderId;

use crate::db::{OrderRepository, RepositoryError};
use crate::models::{Order, User};

/// Which side of the conversation a connection is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// Customer-service staff.
    Employee,
    /// The customer who placed the order.
    Client,
}

impl ChatRole {
    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Client => "client",
        }
    }
}

/// Why a connection was refused.
#[derive(Debug, thiserror::Error)]
pub enum ChatRejection {
    #[error("anonymous users cannot chat")]
    Anonymous,

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("{0} may not chat about this order")]
    Unauthorized(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Decide a signed-in user's role for an order. Employees take precedence
/// over ownership.
#[must_use]
pub fn role_for(user: &User, order: &Order) -> Option<ChatRole> {
    if user.is_employee() {
        Some(ChatRole::Employee)
    } else if order.user_id == user.id {
        Some(ChatRole::Client)
    } else {
        None
    }
}

/// Authorize a connection to an order's chat.
///
/// An employee connecting becomes the order's `last_spoken_to`.
///
/// # Errors
///
/// Returns the reason the connection must be refused.
pub async fn authorize(
    pool: &PgPool,
    user: Option<&User>,
    order_id: OrderId,
) -> Result<ChatRole, ChatRejection> {
    let Some(user) = user else {
        return Err(ChatRejection::Anonymous);
    };

    let orders = OrderRepository::new(pool);
    let order = orders
        .get(order_id)
        .await?
        .ok_or(ChatRejection::OrderNotFound(order_id))?;

    match role_for(user, &order) {
        Some(ChatRole::Employee) => {
            orders.set_last_spoken_to(order.id, user.id).await?;
            tracing::info!(order_id = %order.id, "Opening chat stream for employee {}", user.email);
            Ok(ChatRole::Employee)
        }
        Some(ChatRole::Client) => {
            tracing::info!(order_id = %order.id, "Opening chat stream for client {}", user.email);
            Ok(ChatRole::Client)
        }
        None => {
            tracing::info!(order_id = %order.id, "Unauthorized connection from {}", user.email);
            Err(ChatRejection::Unauthorized(user.email.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ebookstore_core::{County, OrderStatus, StaffGroup, UserId};

    use super::*;
    use crate::models::user::tests::user;

    fn order_for(owner: UserId) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(12),
            user_id: owner,
            status: OrderStatus::Paid,
            billing_name: "Home".to_string(),
            billing_address: "12 Moi Avenue".to_string(),
            billing_town: "Nairobi".to_string(),
            billing_county: County::Nairobi,
            shipping_name: "Home".to_string(),
            shipping_address: "12 Moi Avenue".to_string(),
            shipping_town: "Nairobi".to_string(),
            shipping_county: County::Nairobi,
            date_added: now,
            date_updated: now,
            last_spoken_to: None,
        }
    }

    #[test]
    fn owner_chats_as_client() {
        let customer = user(false, false, vec![]);
        assert_eq!(role_for(&customer, &order_for(customer.id)), Some(ChatRole::Client));
    }

    #[test]
    fn stranger_is_refused() {
        let customer = user(false, false, vec![]);
        assert_eq!(role_for(&customer, &order_for(UserId::new(999))), None);
    }

    #[test]
    fn employee_chats_on_any_order() {
        let staff = user(true, false, vec![StaffGroup::Employees]);
        assert_eq!(role_for(&staff, &order_for(UserId::new(999))), Some(ChatRole::Employee));
    }

    #[test]
    fn employee_owning_the_order_still_joins_as_employee() {
        let staff = user(true, false, vec![StaffGroup::Employees]);
        assert_eq!(role_for(&staff, &order_for(staff.id)), Some(ChatRole::Employee));
    }

    #[test]
    fn dispatcher_is_not_customer_service() {
        let dispatcher = user(true, false, vec![StaffGroup::Dispatchers]);
        assert_eq!(role_for(&dispatcher, &order_for(UserId::new(999))), None);
    }

    #[tokio::test]
    async fn anonymous_is_refused_without_touching_the_database() {
        // Nothing listens here; any query would fail with a connection error.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(100))
            .connect_lazy("postgres://nobody@127.0.0.1:1/ebookstore")
            .expect("lazy pool parses its URL");

        let refused = authorize(&pool, None, OrderId::new(12)).await;
        assert!(matches!(refused, Err(ChatRejection::Anonymous)));
    }
}
