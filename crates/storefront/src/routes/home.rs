//! Home and about pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::BookRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{BookTag, CurrentUser};
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    /// Active tags, linked as shelves.
    pub tags: Vec<BookTag>,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about_us.html")]
pub struct AboutTemplate {
    pub user: Option<CurrentUser>,
}

/// Display the home page.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate> {
    let tags = BookRepository::new(state.pool())
        .list_tags()
        .await?
        .into_iter()
        .filter(|tag| tag.active)
        .collect();

    Ok(HomeTemplate { user, tags })
}

/// Display the about page.
pub async fn about_us(OptionalAuth(user): OptionalAuth) -> AboutTemplate {
    AboutTemplate { user }
}
