//! Customer order dashboard and the customer-service chat page.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use ebookstore_core::{OrderId, UserId};

use crate::chat::{self, ChatRole};
use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, Order, OrderFilter, PageWindow, User};
use crate::routes::books::PageQuery;
use crate::state::AppState;

/// Orders per dashboard page.
const DASHBOARD_PAGE_SIZE: u32 = 20;

/// One order on the dashboard with its customer-service contact.
pub struct DashboardRow {
    pub order: Order,
    /// Staff member who last opened the order's chat.
    pub staff_name: Option<String>,
    /// Whether that staff member has sent a heartbeat recently.
    pub staff_online: bool,
}

/// Order dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/dashboard.html")]
pub struct DashboardTemplate {
    pub user: Option<CurrentUser>,
    pub rows: Vec<DashboardRow>,
    pub window: PageWindow,
}

/// Chat page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/customer_service.html")]
pub struct CustomerServiceTemplate {
    pub user: Option<CurrentUser>,
    pub order: Order,
    pub is_employee: bool,
}

/// The signed-in user's orders, newest first.
///
/// GET /order-dashboard/
#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<PageQuery>,
) -> Result<DashboardTemplate> {
    let orders = OrderRepository::new(state.pool());
    let users = UserRepository::new(state.pool());
    let filter = OrderFilter {
        user_id: Some(user.id),
        ..OrderFilter::default()
    };

    let total = orders.count(filter).await?;
    let window = PageWindow::resolve(query.page.as_deref(), DASHBOARD_PAGE_SIZE, total)
        .map_err(|e| AppError::NotFound(e.to_string()))?;

    let page = orders.list(filter, window).await?;
    let staff: HashMap<UserId, User> = users
        .get_many(&contacted_staff(&page))
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut rows = Vec::with_capacity(page.len());
    for order in page {
        let contact = order.last_spoken_to.and_then(|id| staff.get(&id));
        let staff_online = match contact {
            Some(contact) => {
                state
                    .presence()
                    .is_alive(&chat::presence_key(order.id, contact.email.as_str()))
                    .await
            }
            None => false,
        };
        rows.push(DashboardRow {
            staff_name: contact.map(User::display_name),
            staff_online,
            order,
        });
    }

    Ok(DashboardTemplate {
        user: Some(user),
        rows,
        window,
    })
}

/// Distinct staff members who last spoke on any of `orders`.
fn contacted_staff(orders: &[Order]) -> Vec<UserId> {
    let mut ids: Vec<UserId> = orders.iter().filter_map(|o| o.last_spoken_to).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Chat page for one order. The WebSocket repeats the authorization.
///
/// GET /customer-service/{order_id}/
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn customer_service(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<i32>,
) -> Result<CustomerServiceTemplate> {
    let order_id = OrderId::new(order_id);
    let order = OrderRepository::new(state.pool())
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
    let account = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))?;

    let role = chat::role_for(&account, &order)
        .ok_or_else(|| AppError::Forbidden(format!("order {order_id}")))?;

    Ok(CustomerServiceTemplate {
        user: Some(user),
        order,
        is_employee: role == ChatRole::Employee,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use ebookstore_core::{County, OrderStatus};

    use super::*;

    fn order(id: i32, last_spoken_to: Option<i32>) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(id),
            user_id: UserId::new(1),
            status: OrderStatus::Paid,
            billing_name: "Home".to_string(),
            billing_address: "4 Kenyatta Avenue".to_string(),
            billing_town: "Nakuru".to_string(),
            billing_county: County::Nakuru,
            shipping_name: "Home".to_string(),
            shipping_address: "4 Kenyatta Avenue".to_string(),
            shipping_town: "Nakuru".to_string(),
            shipping_county: County::Nakuru,
            date_added: now,
            date_updated: now,
            last_spoken_to: last_spoken_to.map(UserId::new),
        }
    }

    #[test]
    fn staff_are_looked_up_once_per_page() {
        let page = vec![
            order(5, Some(9)),
            order(4, None),
            order(3, Some(2)),
            order(2, Some(9)),
            order(1, Some(2)),
        ];
        assert_eq!(contacted_staff(&page), vec![UserId::new(2), UserId::new(9)]);
    }

    #[test]
    fn page_without_chats_needs_no_lookup() {
        assert!(contacted_staff(&[order(1, None)]).is_empty());
        assert!(contacted_staff(&[]).is_empty());
    }
}
