//! Authentication route handlers.
//!
//! Handles sign-up, login and logout with email and password. Signing in
//! merges the visitor's anonymous basket into the account.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::services::basket::BasketService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Query parameters carrying the page to return to.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<CurrentUser>,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub user: Option<CurrentUser>,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
}

/// Only same-site paths are followed after signing in.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

/// Store the user in the session and adopt the visitor's basket.
async fn sign_in(state: &AppState, session: &Session, user: &User) -> Result<()> {
    BasketService::new(state.pool(), session)
        .merge_on_login(user.id)
        .await?;
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "user signed in");
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// GET /login/
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> LoginTemplate {
    LoginTemplate {
        user,
        email: String::new(),
        next: safe_next(query.next.as_deref()).to_string(),
        error: None,
    }
}

/// POST /login/
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_string();

    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            sign_in(&state, &session, &user).await?;
            Ok(Redirect::to(&next).into_response())
        }
        Err(err @ AuthError::Repository(_)) => Err(err.into()),
        Err(err) => {
            tracing::warn!(error = %err, "login failed");
            Ok(LoginTemplate {
                user: None,
                email: form.email,
                next,
                error: Some(err.form_message()),
            }
            .into_response())
        }
    }
}

/// POST /logout/
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// GET /signup/
pub async fn signup_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<NextQuery>,
) -> SignupTemplate {
    SignupTemplate {
        user,
        email: String::new(),
        next: safe_next(query.next.as_deref()).to_string(),
        error: None,
    }
}

/// POST /signup/
#[instrument(skip(state, session, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_string();

    match AuthService::new(state.pool())
        .register(&form.email, &form.password1, &form.password2)
        .await
    {
        Ok(user) => {
            sign_in(&state, &session, &user).await?;
            Ok(Redirect::to(&next).into_response())
        }
        Err(err @ (AuthError::Repository(_) | AuthError::PasswordHash)) => Err(err.into()),
        Err(err) => Ok(SignupTemplate {
            user: None,
            email: form.email,
            next,
            error: Some(err.form_message()),
        }
        .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_keeps_local_paths_only() {
        assert_eq!(safe_next(Some("/order/address_select/")), "/order/address_select/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
