//! Read-only REST API for warehouse tooling.
//!
//! Only paid orders are exposed. Every endpoint requires [`ApiStaff`]:
//! an employee or dispatcher signed in through the session or HTTP Basic.
//!
//! [`ApiStaff`]: crate::middleware::ApiStaff

pub mod order_lines;
pub mod orders;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::db::RepositoryError;
use crate::models::{InvalidPage, PageWindow};
use crate::models::pagination::API_PAGE_SIZE;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error response for API endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found.")]
    NotFound,

    #[error("Invalid page.")]
    InvalidPage(#[from] InvalidPage),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound | Self::InvalidPage(_) | Self::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "API error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

/// `?page=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Resolve against a record count using the API page size.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidPage` for a page outside the result set.
    pub fn window(&self, total: i64) -> Result<PageWindow, ApiError> {
        Ok(PageWindow::resolve(
            self.page.as_deref(),
            API_PAGE_SIZE,
            total,
        )?)
    }
}

/// Absolute URL of an API list, for pagination links.
fn list_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InvalidPage(InvalidPage("9".to_string()))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::BadRequest("bad".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn list_url_joins_base_and_path() {
        assert_eq!(
            list_url("https://shop.test/", "/api/orders/"),
            "https://shop.test/api/orders/"
        );
    }
}
