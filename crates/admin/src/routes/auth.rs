//! Staff sign-in for the back office.
//!
//! Password sign-in against the shared accounts table. Only accounts that
//! can enter at least one site are let in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ebookstore_storefront::error::{clear_sentry_user, set_sentry_user};
use ebookstore_storefront::middleware::{clear_current_user, set_current_user};
use ebookstore_storefront::models::CurrentUser;
use ebookstore_storefront::routes::auth::safe_next;
use ebookstore_storefront::services::auth::{AuthError, AuthService};

use crate::error::Result;
use crate::site::Site;
use crate::state::AppState;

const BAD_CREDENTIALS: &str = "Please enter a correct email and password.";
const NOT_STAFF: &str = "This account has no access to the back office.";

/// Login form input.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub next: String,
    pub error: Option<&'static str>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new().route("/login/", get(login_page).post(login))
}

/// GET /login/
pub async fn login_page(Query(query): Query<NextQuery>) -> LoginTemplate {
    LoginTemplate {
        email: String::new(),
        next: safe_next(query.next.as_deref()).to_string(),
        error: None,
    }
}

/// POST /login/
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_string();
    let rerender = |error| LoginTemplate {
        email: form.email.clone(),
        next: next.clone(),
        error: Some(error),
    };

    let user = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(err @ AuthError::Repository(_)) => return Err(err.into()),
        Err(_) => return Ok(rerender(BAD_CREDENTIALS).into_response()),
    };

    if Site::available_to(&user).is_empty() {
        tracing::warn!(user_id = %user.id, "back office login refused: no staff role");
        return Ok(rerender(NOT_STAFF).into_response());
    }

    set_current_user(&session, &CurrentUser::from(&user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "staff signed in");

    Ok(Redirect::to(&next).into_response())
}

/// POST /logout/
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/login/"))
}
