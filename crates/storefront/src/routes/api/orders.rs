//! `/api/orders/`: paid orders with their shipping details.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use ebookstore_core::{County, OrderId, OrderStatus};

use super::{ApiError, PageQuery, list_url};
use crate::db::OrderRepository;
use crate::middleware::ApiStaff;
use crate::models::{ApiPage, Order, OrderFilter};
use crate::state::AppState;

const PATH: &str = "/api/orders/";

/// Order as exposed by the API.
#[derive(Debug, Serialize)]
pub struct OrderResource {
    pub id: OrderId,
    pub shipping_name: String,
    pub shipping_address: String,
    pub shipping_town: String,
    pub shipping_county: County,
    pub date_updated: DateTime<Utc>,
    pub date_added: DateTime<Utc>,
}

impl From<Order> for OrderResource {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            shipping_name: order.shipping_name,
            shipping_address: order.shipping_address,
            shipping_town: order.shipping_town,
            shipping_county: order.shipping_county,
            date_updated: order.date_updated,
            date_added: order.date_added,
        }
    }
}

const PAID: OrderFilter = OrderFilter {
    status: Some(OrderStatus::Paid),
    user_id: None,
};

/// GET /api/orders/
#[instrument(skip(state, staff, query), fields(staff_id = %staff.id))]
pub async fn list(
    State(state): State<AppState>,
    ApiStaff(staff): ApiStaff,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiPage<OrderResource>>, ApiError> {
    let orders = OrderRepository::new(state.pool());
    let window = query.window(orders.count(PAID).await?)?;
    let results = orders
        .list(PAID, window)
        .await?
        .into_iter()
        .map(OrderResource::from)
        .collect();

    Ok(Json(ApiPage::new(
        results,
        window,
        &list_url(&state.config().base_url, PATH),
        &[],
    )))
}

/// GET /api/orders/{id}/
#[instrument(skip(state, staff), fields(staff_id = %staff.id))]
pub async fn detail(
    State(state): State<AppState>,
    ApiStaff(staff): ApiStaff,
    Path(id): Path<i32>,
) -> Result<Json<OrderResource>, ApiError> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .filter(|order| order.status == OrderStatus::Paid)
        .ok_or(ApiError::NotFound)?;

    Ok(Json(order.into()))
}
