//! `/api/orderlines/`: units of paid orders, filterable by order and status.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ebookstore_core::{OrderId, OrderLineId, OrderLineStatus, OrderStatus};

use super::{ApiError, PageQuery, list_url};
use crate::db::OrderRepository;
use crate::middleware::ApiStaff;
use crate::models::{ApiPage, OrderLine, OrderLineFilter};
use crate::state::AppState;

const PATH: &str = "/api/orderlines/";

/// Order line as exposed by the API.
#[derive(Debug, Serialize)]
pub struct OrderLineResource {
    pub id: OrderLineId,
    pub order: OrderId,
    /// Book name.
    pub book: String,
    pub status: OrderLineStatus,
}

impl From<OrderLine> for OrderLineResource {
    fn from(line: OrderLine) -> Self {
        Self {
            id: line.id,
            order: line.order_id,
            book: line.book_name,
            status: line.status,
        }
    }
}

/// Query parameters for the list.
#[derive(Debug, Default, Deserialize)]
pub struct LineQuery {
    pub order: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
}

impl LineQuery {
    /// Parse the filters. Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` naming the first invalid filter.
    pub fn filter(&self) -> Result<OrderLineFilter, ApiError> {
        let order_id = match non_empty(self.order.as_deref()) {
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map(OrderId::new)
                    .map_err(|_| ApiError::BadRequest(format!("order: invalid value {raw}")))?,
            ),
            None => None,
        };
        let status = match non_empty(self.status.as_deref()) {
            Some(raw) => Some(
                raw.parse::<OrderLineStatus>()
                    .map_err(|_| ApiError::BadRequest(format!("status: invalid value {raw}")))?,
            ),
            None => None,
        };

        Ok(OrderLineFilter {
            order_id,
            status,
            order_status: Some(OrderStatus::Paid),
        })
    }

    /// The filters to repeat in pagination links.
    fn link_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(order) = non_empty(self.order.as_deref()) {
            params.push(("order", order.to_string()));
        }
        if let Some(status) = non_empty(self.status.as_deref()) {
            params.push(("status", status.to_string()));
        }
        params
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// GET /api/orderlines/
#[instrument(skip(state, staff, query), fields(staff_id = %staff.id))]
pub async fn list(
    State(state): State<AppState>,
    ApiStaff(staff): ApiStaff,
    Query(query): Query<LineQuery>,
) -> Result<Json<ApiPage<OrderLineResource>>, ApiError> {
    let filter = query.filter()?;
    let orders = OrderRepository::new(state.pool());

    let page = PageQuery {
        page: query.page.clone(),
    };
    let window = page.window(orders.count_lines(filter).await?)?;
    let results = orders
        .list_lines(filter, window)
        .await?
        .into_iter()
        .map(OrderLineResource::from)
        .collect();

    Ok(Json(ApiPage::new(
        results,
        window,
        &list_url(&state.config().base_url, PATH),
        &query.link_params(),
    )))
}

/// GET /api/orderlines/{id}/
#[instrument(skip(state, staff), fields(staff_id = %staff.id))]
pub async fn detail(
    State(state): State<AppState>,
    ApiStaff(staff): ApiStaff,
    Path(id): Path<i32>,
) -> Result<Json<OrderLineResource>, ApiError> {
    let line = OrderRepository::new(state.pool())
        .get_line(OrderLineId::new(id), Some(OrderStatus::Paid))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(line.into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn query(order: Option<&str>, status: Option<&str>) -> LineQuery {
        LineQuery {
            order: order.map(String::from),
            status: status.map(String::from),
            page: None,
        }
    }

    #[test]
    fn filter_always_limits_to_paid_orders() {
        let filter = query(None, None).filter().unwrap();
        assert_eq!(filter.order_status, Some(OrderStatus::Paid));
        assert!(filter.order_id.is_none());
        assert!(filter.status.is_none());
    }

    #[test]
    fn filter_parses_order_and_status() {
        let filter = query(Some("12"), Some("3")).filter().unwrap();
        assert_eq!(filter.order_id, Some(OrderId::new(12)));
        assert_eq!(filter.status, Some(OrderLineStatus::Sent));
    }

    #[test]
    fn empty_filters_are_ignored() {
        let q = query(Some(""), Some(" "));
        assert!(q.filter().unwrap().status.is_none());
        assert!(q.link_params().is_empty());
    }

    #[test]
    fn invalid_filters_are_rejected() {
        assert!(matches!(
            query(Some("abc"), None).filter(),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            query(None, Some("9")).filter(),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn link_params_repeat_filters() {
        assert_eq!(
            query(Some("4"), Some("2")).link_params(),
            vec![("order", "4".to_string()), ("status", "2".to_string())]
        );
    }
}
