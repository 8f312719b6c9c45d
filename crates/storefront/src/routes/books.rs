//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::db::BookRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::pagination::CATALOG_PAGE_SIZE;
use crate::models::{ALL_TAGS, Book, BookDetail, BookTag, CurrentUser, PageWindow};
use crate::state::AppState;

/// `?page=` query parameter.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Book list template.
#[derive(Template, WebTemplate)]
#[template(path = "books/list.html")]
pub struct BookListTemplate {
    pub user: Option<CurrentUser>,
    /// `None` when listing every tag.
    pub tag: Option<BookTag>,
    pub books: Vec<Book>,
    pub window: PageWindow,
}

/// Book detail template.
#[derive(Template, WebTemplate)]
#[template(path = "books/detail.html")]
pub struct BookDetailTemplate {
    pub user: Option<CurrentUser>,
    pub detail: BookDetail,
}

/// List active books, five per page, optionally filtered by tag.
///
/// GET /books/{tag}/
#[instrument(skip(state, user, query))]
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(tag): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<BookListTemplate> {
    let books = BookRepository::new(state.pool());

    let tag = if tag == ALL_TAGS {
        None
    } else {
        let found = books
            .get_tag(&tag)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("tag {tag}")))?;
        Some(found)
    };

    let total = books.count_active(tag.as_ref()).await?;
    let window = PageWindow::resolve(query.page.as_deref(), CATALOG_PAGE_SIZE, total)
        .map_err(|e| AppError::NotFound(e.to_string()))?;
    let page = books.list_active(tag.as_ref(), window).await?;

    Ok(BookListTemplate {
        user,
        tag,
        books: page,
        window,
    })
}

/// Show one book with its tags and images.
///
/// GET /book/{slug}/
#[instrument(skip(state, user))]
pub async fn detail(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<BookDetailTemplate> {
    let detail = BookRepository::new(state.pool())
        .get_detail(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {slug}")))?;

    Ok(BookDetailTemplate { user, detail })
}
