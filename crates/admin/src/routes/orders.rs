//! Order management for the back office.
//!
//! Owners and central office see every order and may change order statuses.
//! Dispatch only sees paid orders, without billing details, and only
//! changes the status of their lines.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use ebookstore_core::{OrderId, OrderLineId, OrderLineStatus, OrderStatus};
use ebookstore_storefront::db::{OrderRepository, UserRepository};
use ebookstore_storefront::models::{Order, OrderDetail, OrderFilter, PageWindow, User};

use crate::error::{AppError, Result};
use crate::middleware::SiteStaff;
use crate::site::Site;
use crate::state::AppState;

/// Orders per back-office page.
pub const ADMIN_PAGE_SIZE: u32 = 25;

/// Query parameters for the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub page: Option<String>,
}

impl OrdersQuery {
    /// The listing filter for `site`.
    ///
    /// Restricted sites ignore the status filter and always see their scope.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown status code.
    pub fn filter(&self, site: Site) -> Result<OrderFilter> {
        if let Some(scope) = site.order_scope() {
            return Ok(OrderFilter {
                status: Some(scope),
                user_id: None,
            });
        }

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<OrderStatus>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))?,
            ),
        };

        Ok(OrderFilter {
            status,
            user_id: None,
        })
    }
}

/// `status=N&` prefix repeated in pagination links.
fn status_param(filter: OrderFilter) -> String {
    filter
        .status
        .map_or_else(String::new, |s| format!("status={}&", s.code()))
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/list.html")]
pub struct OrderListTemplate {
    pub site: Site,
    pub user: User,
    pub orders: Vec<Order>,
    pub window: PageWindow,
    /// Code of the status filter, 0 for none.
    pub selected_code: i16,
    pub statuses: &'static [OrderStatus],
    pub status_param: String,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/detail.html")]
pub struct OrderDetailTemplate {
    pub site: Site,
    pub user: User,
    pub detail: OrderDetail,
    /// Customer email, when the site shows billing details.
    pub customer: Option<String>,
    pub order_statuses: &'static [OrderStatus],
    pub line_statuses: &'static [OrderLineStatus],
}

/// Status change form, shared by orders and lines.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{site}/orders/", get(list))
        .route("/{site}/orders/{id}/", get(detail))
        .route("/{site}/orders/{id}/status/", post(update_status))
        .route("/{site}/orders/{id}/lines/{line_id}/", post(update_line))
}

/// Load an order the site is allowed to see.
async fn load_order(state: &AppState, site: Site, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .filter(|order| site.order_scope().is_none_or(|scope| order.status == scope))
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))
}

fn detail_url(site: Site, id: OrderId) -> String {
    format!("{}orders/{id}/", site.prefix())
}

/// GET /{site}/orders/
#[instrument(skip(state, staff, query), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn list(
    State(state): State<AppState>,
    staff: SiteStaff,
    Query(query): Query<OrdersQuery>,
) -> Result<OrderListTemplate> {
    let filter = query.filter(staff.site)?;
    let orders = OrderRepository::new(state.pool());

    let window = PageWindow::resolve(
        query.page.as_deref(),
        ADMIN_PAGE_SIZE,
        orders.count(filter).await?,
    )?;
    let page = orders.list(filter, window).await?;

    Ok(OrderListTemplate {
        site: staff.site,
        user: staff.user,
        orders: page,
        window,
        selected_code: filter.status.map_or(0, OrderStatus::code),
        statuses: OrderStatus::ALL,
        status_param: status_param(filter),
    })
}

/// GET /{site}/orders/{id}/
#[instrument(skip(state, staff), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn detail(
    State(state): State<AppState>,
    staff: SiteStaff,
    Path((_, id)): Path<(String, i32)>,
) -> Result<OrderDetailTemplate> {
    let order = load_order(&state, staff.site, OrderId::new(id)).await?;
    let lines = OrderRepository::new(state.pool())
        .lines_for_order(order.id)
        .await?;

    let customer = if staff.site.shows_billing() {
        UserRepository::new(state.pool())
            .get_by_id(order.user_id)
            .await?
            .map(|u| u.email.to_string())
    } else {
        None
    };

    Ok(OrderDetailTemplate {
        site: staff.site,
        user: staff.user,
        detail: OrderDetail { order, lines },
        customer,
        order_statuses: OrderStatus::ALL,
        line_statuses: OrderLineStatus::ALL,
    })
}

/// POST /{site}/orders/{id}/status/
#[instrument(skip(state, staff, form), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn update_status(
    State(state): State<AppState>,
    staff: SiteStaff,
    Path((_, id)): Path<(String, i32)>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    if !staff.site.edits_order_status() {
        return Err(AppError::Forbidden(
            "order statuses cannot be changed from this site".to_string(),
        ));
    }

    let order = load_order(&state, staff.site, OrderId::new(id)).await?;
    let status = form
        .status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    OrderRepository::new(state.pool())
        .update_status(order.id, status)
        .await?;
    tracing::info!(order_id = %order.id, from = %order.status, to = %status, "order status changed");

    Ok(Redirect::to(&detail_url(staff.site, order.id)))
}

/// POST /{site}/orders/{id}/lines/{line_id}/
#[instrument(skip(state, staff, form), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn update_line(
    State(state): State<AppState>,
    staff: SiteStaff,
    Path((_, id, line_id)): Path<(String, i32, i32)>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let order = load_order(&state, staff.site, OrderId::new(id)).await?;
    let status = form
        .status
        .parse::<OrderLineStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let orders = OrderRepository::new(state.pool());
    let line = orders
        .get_line(OrderLineId::new(line_id), staff.site.order_scope())
        .await?
        .filter(|line| line.order_id == order.id)
        .ok_or_else(|| AppError::NotFound(format!("order line {line_id}")))?;

    orders
        .update_line_status(line.id, status, staff.site.order_scope())
        .await?;
    tracing::info!(
        order_id = %order.id,
        line_id = %line.id,
        from = %line.status,
        to = %status,
        "order line status changed"
    );

    Ok(Redirect::to(&detail_url(staff.site, order.id)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(status: Option<&str>) -> OrdersQuery {
        OrdersQuery {
            status: status.map(String::from),
            page: None,
        }
    }

    #[test]
    fn owners_filter_by_status() {
        let filter = query(Some("3")).filter(Site::Owners).unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Done));
        assert!(query(None).filter(Site::CentralOffice).unwrap().status.is_none());
        assert!(query(Some("")).filter(Site::Owners).unwrap().status.is_none());
    }

    #[test]
    fn dispatch_is_pinned_to_paid() {
        let filter = query(Some("1")).filter(Site::Dispatch).unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Paid));
        let filter = query(Some("junk")).filter(Site::Dispatch).unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Paid));
    }

    #[test]
    fn unknown_status_is_a_bad_request() {
        assert!(matches!(
            query(Some("9")).filter(Site::Owners),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn pagination_links_keep_the_status() {
        let filter = query(Some("2")).filter(Site::Owners).unwrap();
        assert_eq!(status_param(filter), "status=2&");
        assert_eq!(status_param(OrderFilter::default()), "");
    }

    #[test]
    fn detail_urls_stay_on_the_site() {
        assert_eq!(
            detail_url(Site::CentralOffice, OrderId::new(12)),
            "/central-office/orders/12/"
        );
    }
}
