//! Session-related types.
//!
//! Types stored in the session for authentication and basket state.

use serde::{Deserialize, Serialize};

use ebookstore_core::{Email, UserId};

use super::user::User;

/// Session-stored user identity.
///
/// Roles are not cached here; handlers that need them reload the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Name shown in the page header.
    pub display_name: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the id of the visitor's open basket.
    pub const BASKET_ID: &str = "basket_id";
}
