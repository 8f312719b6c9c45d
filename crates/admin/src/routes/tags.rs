//! Tag list, shown on every site.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use tracing::instrument;

use ebookstore_storefront::db::BookRepository;
use ebookstore_storefront::models::{BookTag, User};

use crate::error::Result;
use crate::middleware::SiteStaff;
use crate::site::Site;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "tags/list.html")]
pub struct TagListTemplate {
    pub site: Site,
    pub user: User,
    pub tags: Vec<BookTag>,
}

/// Build the tags router.
pub fn router() -> Router<AppState> {
    Router::new().route("/{site}/tags/", get(list))
}

/// GET /{site}/tags/
#[instrument(skip(state, staff), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn list(State(state): State<AppState>, staff: SiteStaff) -> Result<TagListTemplate> {
    let tags = BookRepository::new(state.pool()).list_tags().await?;

    Ok(TagListTemplate {
        site: staff.site,
        user: staff.user,
        tags,
    })
}
