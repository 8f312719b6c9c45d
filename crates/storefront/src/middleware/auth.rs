//! Authentication middleware and extractors.
//!
//! Page handlers use [`RequireAuth`] and [`OptionalAuth`], which only read the
//! session. The read API uses [`ApiStaff`], which also accepts HTTP Basic
//! credentials and checks staff roles against the database.

use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        request::Parts,
    },
    response::{IntoResponse, Redirect, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::models::{CurrentUser, User, session_keys};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Sign-in page for customers.
pub const LOGIN_PATH: &str = "/login/";

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in, page requests are redirected to the login page
/// with a `next` parameter and API requests get `401`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is signed in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(next) => Redirect::to(&login_url(&next)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Login URL that returns to `next` afterwards.
#[must_use]
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", urlencoding::encode(next))
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if parts.uri.path().starts_with("/api/") {
                    AuthRejection::Unauthorized
                } else {
                    let next = parts
                        .uri
                        .path_and_query()
                        .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);
                    AuthRejection::RedirectToLogin(next)
                }
            })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Staff member allowed to read the API: an employee or a dispatcher,
/// signed in through the session or HTTP Basic.
pub struct ApiStaff(pub User);

/// Why an API request was refused.
#[derive(Debug)]
pub enum ApiAuthRejection {
    /// No or wrong credentials.
    Unauthenticated,
    /// Signed in without a staff role.
    Forbidden,
    /// Credentials could not be checked.
    Internal,
}

impl IntoResponse for ApiAuthRejection {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            ),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to perform this action.",
            ),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        let mut response =
            (status, axum::Json(serde_json::json!({ "detail": detail }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Basic realm="api""#),
            );
        }
        response
    }
}

impl FromRequestParts<AppState> for ApiStaff {
    type Rejection = ApiAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = if let Some((email, password)) = basic_credentials(&parts.headers) {
            match AuthService::new(state.pool()).login(&email, &password).await {
                Ok(user) => user,
                Err(AuthError::Repository(err)) => {
                    tracing::error!(error = %err, "API credential check failed");
                    return Err(ApiAuthRejection::Internal);
                }
                Err(_) => return Err(ApiAuthRejection::Unauthenticated),
            }
        } else {
            let OptionalAuth(current) = OptionalAuth::from_request_parts(parts, state)
                .await
                .unwrap_or(OptionalAuth(None));
            let current = current.ok_or(ApiAuthRejection::Unauthenticated)?;
            UserRepository::new(state.pool())
                .get_by_id(current.id)
                .await
                .map_err(|err| {
                    tracing::error!(error = %err, "API session user lookup failed");
                    ApiAuthRejection::Internal
                })?
                .ok_or(ApiAuthRejection::Unauthenticated)?
        };

        if !(user.is_employee() || user.is_dispatcher()) {
            return Err(ApiAuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

/// Decode `Authorization: Basic base64(email:password)`.
#[must_use]
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;
    Some((email.to_string(), password.to_string()))
}

/// Sign a user in: rotate the session id and store the user.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Sign the user out, dropping the whole session including the basket.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn decodes_basic_credentials() {
        let encoded = STANDARD.encode("staff@ebookstore.co.ke:pa:ss word");
        let headers = with_auth(&format!("Basic {encoded}"));
        assert_eq!(
            basic_credentials(&headers),
            Some((
                "staff@ebookstore.co.ke".to_string(),
                "pa:ss word".to_string()
            ))
        );
    }

    #[test]
    fn ignores_other_schemes_and_garbage() {
        assert_eq!(basic_credentials(&with_auth("Bearer abc")), None);
        assert_eq!(basic_credentials(&with_auth("Basic !!!")), None);
        let no_colon = STANDARD.encode("justauser");
        assert_eq!(basic_credentials(&with_auth(&format!("Basic {no_colon}"))), None);
        assert_eq!(basic_credentials(&HeaderMap::new()), None);
    }

    #[test]
    fn login_url_keeps_destination() {
        assert_eq!(
            login_url("/order/address_select/?x=1"),
            "/login/?next=%2Forder%2Faddress_select%2F%3Fx%3D1"
        );
    }

    #[test]
    fn unauthenticated_api_response_asks_for_basic() {
        let response = ApiAuthRejection::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            r#"Basic realm="api""#
        );
        assert_eq!(
            ApiAuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
