//! Authentication extractors for the back office.
//!
//! The session only stores who is signed in. Roles are reloaded from the
//! database on every request so that revoking a group takes effect at once.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use ebookstore_storefront::db::{RepositoryError, UserRepository};
use ebookstore_storefront::middleware::RequireAuth;
use ebookstore_storefront::middleware::auth::AuthRejection;
use ebookstore_storefront::models::User;

use crate::error::AppError;
use crate::site::Site;
use crate::state::AppState;

/// Extractor for a signed-in, active account, with roles freshly loaded.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(StaffUser(user): StaffUser) -> impl IntoResponse {
///     format!("{} may enter {:?}", user.email, Site::available_to(&user))
/// }
/// ```
pub struct StaffUser(pub User);

/// Extractor that resolves the site from the path and requires its role.
///
/// Unknown sites are `404`; signed-in users without the role get `403`.
pub struct SiteStaff {
    pub site: Site,
    pub user: User,
}

/// Why a back-office request was refused.
pub enum SiteRejection {
    /// Nobody (or an inactive account) is signed in.
    Login(AuthRejection),
    /// The first path segment names no site.
    NotFound,
    /// Signed in without the site's role.
    Forbidden(Site),
    /// The account could not be loaded.
    Repository(RepositoryError),
}

impl From<RepositoryError> for SiteRejection {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

impl IntoResponse for SiteRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Login(rejection) => rejection.into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            Self::Forbidden(site) => (
                StatusCode::FORBIDDEN,
                format!("You do not have permission to use {}", site.header()),
            )
                .into_response(),
            Self::Repository(err) => AppError::from(err).into_response(),
        }
    }
}

/// Path and query to come back to after signing in.
fn return_path(parts: &Parts) -> String {
    parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), ToString::to_string)
}

impl FromRequestParts<AppState> for StaffUser {
    type Rejection = SiteRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(current) = RequireAuth::from_request_parts(parts, state)
            .await
            .map_err(SiteRejection::Login)?;

        let user = UserRepository::new(state.pool())
            .get_by_id(current.id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| {
                SiteRejection::Login(AuthRejection::RedirectToLogin(return_path(parts)))
            })?;

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for SiteStaff {
    type Rejection = SiteRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let site = Site::from_path(parts.uri.path()).ok_or(SiteRejection::NotFound)?;
        let StaffUser(user) = StaffUser::from_request_parts(parts, state).await?;

        if !site.admits(&user) {
            tracing::warn!(user_id = %user.id, site = %site, "site access denied");
            return Err(SiteRejection::Forbidden(site));
        }

        Ok(Self { site, user })
    }
}
