//! Basket route handlers.
//!
//! The basket id lives in the session; see [`BasketService`].

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ebookstore_core::BookId;

use crate::db::BookRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{BasketContents, CurrentUser, LineUpdate};
use crate::services::basket::BasketService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Add-to-basket form data.
#[derive(Debug, Deserialize)]
pub struct AddToBasketForm {
    pub book_id: i32,
}

/// Field holding a line's new quantity.
fn quantity_field(line_id: impl std::fmt::Display) -> String {
    format!("quantity_{line_id}")
}

/// Checkbox asking for a line to be removed.
fn delete_field(line_id: impl std::fmt::Display) -> String {
    format!("delete_{line_id}")
}

// =============================================================================
// Templates
// =============================================================================

/// Basket page template.
#[derive(Template, WebTemplate)]
#[template(path = "basket.html")]
pub struct BasketTemplate {
    pub user: Option<CurrentUser>,
    /// `None` when the visitor has no open basket.
    pub basket: Option<BasketContents>,
    pub errors: Vec<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Add one unit of a book to the visitor's basket.
///
/// POST /add-to-basket/
#[instrument(skip(state, session, user), fields(book_id = form.book_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<AddToBasketForm>,
) -> Result<Redirect> {
    let book = BookRepository::new(state.pool())
        .get_by_id(BookId::new(form.book_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {}", form.book_id)))?;

    BasketService::new(state.pool(), &session)
        .add_book(book.id, user.map(|u| u.id))
        .await?;

    Ok(Redirect::to(&format!("/book/{}/", book.slug)))
}

/// Display the basket.
///
/// GET /basket/
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<BasketTemplate> {
    let basket = BasketService::new(state.pool(), &session)
        .current_contents()
        .await?;

    Ok(BasketTemplate {
        user,
        basket,
        errors: Vec::new(),
    })
}

/// Apply submitted quantities.
///
/// POST /basket/
///
/// Each line posts `quantity_<line id>` and optionally `delete_<line id>`.
/// Zero or a ticked delete box removes the line. If any quantity is
/// invalid nothing is changed and the basket is shown with the errors.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response> {
    let service = BasketService::new(state.pool(), &session);
    let Some(contents) = service.current_contents().await? else {
        return Ok(Redirect::to("/basket/").into_response());
    };

    let mut updates = Vec::with_capacity(contents.lines.len());
    let mut errors = Vec::new();
    for line in &contents.lines {
        let Some(quantity) = fields.get(&quantity_field(line.id)) else {
            continue;
        };
        let delete = fields.contains_key(&delete_field(line.id));
        match LineUpdate::from_form(quantity, delete) {
            Ok(update) => updates.push((line.id, update)),
            Err(err) => errors.push(format!("{}: {err}", line.book_name)),
        }
    }

    if !errors.is_empty() {
        return Ok(BasketTemplate {
            user,
            basket: Some(contents),
            errors,
        }
        .into_response());
    }

    service.update_lines(&updates).await?;
    Ok(Redirect::to("/basket/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebookstore_core::BasketLineId;

    #[test]
    fn line_fields_are_keyed_by_line_id() {
        let id = BasketLineId::new(17);
        assert_eq!(quantity_field(id), "quantity_17");
        assert_eq!(delete_field(id), "delete_17");
    }
}
