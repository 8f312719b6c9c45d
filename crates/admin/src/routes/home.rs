//! Site picker and per-site index pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use tracing::instrument;

use ebookstore_core::OrderStatus;
use ebookstore_storefront::db::OrderRepository;
use ebookstore_storefront::models::{OrderFilter, User};

use crate::error::Result;
use crate::middleware::{SiteStaff, StaffUser};
use crate::site::Site;
use crate::state::AppState;

/// Landing page listing the sites the user may enter.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user: User,
    pub sites: Vec<Site>,
}

/// Order count for one status.
#[derive(Debug, Clone)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Index of one site.
#[derive(Template, WebTemplate)]
#[template(path = "site_index.html")]
pub struct SiteIndexTemplate {
    pub site: Site,
    pub user: User,
    pub counts: Vec<StatusCount>,
}

/// Build the home router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{site}/", get(site_index))
}

/// GET /
pub async fn index(StaffUser(user): StaffUser) -> IndexTemplate {
    let sites = Site::available_to(&user);
    IndexTemplate { user, sites }
}

/// GET /{site}/
#[instrument(skip(state, staff), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn site_index(State(state): State<AppState>, staff: SiteStaff) -> Result<SiteIndexTemplate> {
    let orders = OrderRepository::new(state.pool());

    let statuses: Vec<OrderStatus> = match staff.site.order_scope() {
        Some(scope) => vec![scope],
        None => OrderStatus::ALL.to_vec(),
    };

    let mut counts = Vec::with_capacity(statuses.len());
    for status in statuses {
        let count = orders
            .count(OrderFilter {
                status: Some(status),
                user_id: None,
            })
            .await?;
        counts.push(StatusCount { status, count });
    }

    Ok(SiteIndexTemplate {
        site: staff.site,
        user: staff.user,
        counts,
    })
}
