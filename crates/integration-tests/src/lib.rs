//! Cross-crate tests for ebookstore.
//!
//! Most of these run without a database: the chat relay is driven over
//! in-memory channels and the domain rules are checked on plain values.
//! The basket merge tests need `PostgreSQL` and are ignored by default.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ebookstore-integration-tests
//!
//! # Including database tests
//! STOREFRONT_DATABASE_URL=postgres://localhost/ebookstore_test \
//!     cargo test -p ebookstore-integration-tests -- --include-ignored
//! ```
//!
//! This library only holds builders shared by the test files.

use chrono::Utc;

use ebookstore_core::{County, Email, OrderId, OrderStatus, StaffGroup, UserId};
use ebookstore_storefront::models::{Order, User};

/// An active account with the given roles.
///
/// # Panics
///
/// Panics if `email` is not a valid address.
#[must_use]
#[allow(clippy::expect_used)]
pub fn user(id: i32, email: &str, is_staff: bool, is_superuser: bool, groups: &[StaffGroup]) -> User {
    User {
        id: UserId::new(id),
        email: Email::parse(email).expect("valid test email"),
        first_name: String::new(),
        last_name: String::new(),
        is_active: true,
        is_staff,
        is_superuser,
        groups: groups.to_vec(),
        date_joined: Utc::now(),
    }
}

/// A customer with no staff roles.
#[must_use]
pub fn customer(id: i32, email: &str) -> User {
    user(id, email, false, false, &[])
}

/// An order placed by `owner`, shipped to Nairobi.
#[must_use]
pub fn order(id: i32, owner: UserId, status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id: OrderId::new(id),
        user_id: owner,
        status,
        billing_name: "Wanjiku Kamau".to_string(),
        billing_address: "12 Moi Avenue".to_string(),
        billing_town: "Nairobi".to_string(),
        billing_county: County::Nairobi,
        shipping_name: "Wanjiku Kamau".to_string(),
        shipping_address: "12 Moi Avenue".to_string(),
        shipping_town: "Nairobi".to_string(),
        shipping_county: County::Nairobi,
        date_added: now,
        date_updated: now,
        last_spoken_to: None,
    }
}
