//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                  - Home page
//! GET  /about-us/                         - About page
//! GET  /health                            - Health check (main.rs)
//!
//! # Catalog
//! GET  /books/{tag}/                      - Active books, `all` for every tag
//! GET  /book/{slug}/                      - Book detail
//!
//! # Basket
//! POST /add-to-basket/                    - Add one unit, redirect to the book
//! GET  /basket/                           - Basket page
//! POST /basket/                           - Update quantities
//!
//! # Checkout (requires auth)
//! GET  /order/address_select/             - Choose billing and shipping
//! POST /order/address_select/             - Create the order
//! GET  /order/done/                       - Confirmation
//!
//! # Address book (requires auth)
//! GET  /address/                          - Address list
//! GET  /address/create/                   - New address form
//! POST /address/create/                   - Create address
//! GET  /address/{id}/                     - Edit form
//! POST /address/{id}/                     - Update address
//! GET  /address/{id}/delete/              - Delete confirmation
//! POST /address/{id}/delete/              - Delete address
//!
//! # Orders and customer service (requires auth)
//! GET  /order-dashboard/                  - The customer's orders
//! GET  /customer-service/{order_id}/      - Chat page
//! GET  /ws/customer-service/{order_id}/   - Chat WebSocket
//!
//! # Auth (rate limited)
//! GET  /signup/                           - Sign-up page
//! POST /signup/                           - Create account
//! GET  /login/                            - Login page
//! POST /login/                            - Login action
//! POST /logout/                           - Logout action
//!
//! # Contact
//! GET  /contact-us/                       - Contact form
//! POST /contact-us/                       - Send message
//!
//! # REST API (employees and dispatchers)
//! GET  /api/orders/                       - Paid orders
//! GET  /api/orders/{id}/                  - Paid order
//! GET  /api/orderlines/                   - Lines of paid orders
//! GET  /api/orderlines/{id}/              - Line of a paid order
//! ```

pub mod addresses;
pub mod api;
pub mod auth;
pub mod basket;
pub mod books;
pub mod chat;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup/", get(auth::signup_page).post(auth::signup))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", post(auth::logout))
}

/// Create the REST API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders/", get(api::orders::list))
        .route("/api/orders/{id}/", get(api::orders::detail))
        .route("/api/orderlines/", get(api::order_lines::list))
        .route("/api/orderlines/{id}/", get(api::order_lines::detail))
}

/// Create the address book router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/address/", get(addresses::list))
        .route(
            "/address/create/",
            get(addresses::create_page).post(addresses::create),
        )
        .route(
            "/address/{id}/",
            get(addresses::update_page).post(addresses::update),
        )
        .route(
            "/address/{id}/delete/",
            get(addresses::delete_page).post(addresses::delete),
        )
}

/// Create all page routes for the storefront except auth and the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about-us/", get(home::about_us))
        // Catalog
        .route("/books/{tag}/", get(books::list))
        .route("/book/{slug}/", get(books::detail))
        // Basket
        .route("/add-to-basket/", post(basket::add))
        .route("/basket/", get(basket::show).post(basket::update))
        // Checkout
        .route(
            "/order/address_select/",
            get(checkout::address_select_page).post(checkout::address_select),
        )
        .route("/order/done/", get(checkout::order_done))
        .merge(address_routes())
        // Orders and customer service
        .route("/order-dashboard/", get(orders::dashboard))
        .route("/customer-service/{order_id}/", get(orders::customer_service))
        .route("/ws/customer-service/{order_id}/", get(chat::connect))
        // Contact
        .route(
            "/contact-us/",
            get(contact::contact_page).post(contact::contact),
        )
}
