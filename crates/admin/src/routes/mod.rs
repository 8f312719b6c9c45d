//! HTTP route handlers for the back office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Health check (main.rs)
//! GET  /                                    - Sites the signed-in user may enter
//!
//! # Auth (rate limited)
//! GET  /login/                              - Login page
//! POST /login/                              - Login action (staff only)
//! POST /logout/                             - Logout
//!
//! # Per site: {site} is owners, central-office or dispatch
//! GET  /{site}/                             - Site index
//! GET  /{site}/orders/                      - Orders (?status=, ?page=)
//! GET  /{site}/orders/{id}/                 - Order detail with lines
//! POST /{site}/orders/{id}/status/          - Change order status
//! POST /{site}/orders/{id}/lines/{line_id}/ - Change order line status
//! GET  /{site}/books/                       - Books
//! GET  /{site}/books/{id}/                  - Edit form
//! POST /{site}/books/{id}/                  - Save book
//! POST /{site}/books/{id}/stock/            - Toggle in_stock from the list
//! GET  /{site}/tags/                        - Tags
//! ```

pub mod auth;
pub mod books;
pub mod home;
pub mod orders;
pub mod tags;

use axum::Router;

use crate::state::AppState;

/// Every back-office page except the login form.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(home::router())
        .merge(orders::router())
        .merge(books::router())
        .merge(tags::router())
        .route("/logout/", axum::routing::post(auth::logout))
}

/// Routes that get the sign-in rate limiter.
pub fn auth_routes() -> Router<AppState> {
    auth::router()
}
