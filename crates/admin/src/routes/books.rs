//! Book list and editing.
//!
//! Which fields are editable depends on the site; see [`BookFields`].

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use ebookstore_core::{BookId, Price, Slug};
use ebookstore_storefront::db::{BookRepository, RepositoryError};
use ebookstore_storefront::models::{Book, BookChanges, User};

use crate::error::{AppError, Result};
use crate::middleware::SiteStaff;
use crate::site::{BookFields, Site};
use crate::state::AppState;

/// Longest accepted book name.
pub const MAX_NAME_LENGTH: usize = 50;

/// Book edit form. Unchecked checkboxes are absent from the body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    pub active: Option<String>,
    pub in_stock: Option<String>,
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            name: book.name.clone(),
            slug: book.slug.to_string(),
            description: book.description.clone(),
            price: book.price.amount().to_string(),
            active: book.active.then(|| "on".to_string()),
            in_stock: book.in_stock.then(|| "on".to_string()),
        }
    }
}

impl BookForm {
    /// Read the fields `allowed` lets this site change; ignore the rest.
    ///
    /// An empty slug is derived from the name.
    ///
    /// # Errors
    ///
    /// Returns one message per invalid field.
    pub fn changes(&self, allowed: BookFields) -> std::result::Result<BookChanges, Vec<String>> {
        let mut errors = Vec::new();
        let mut changes = BookChanges::default();

        if allowed.name {
            let name = self.name.trim();
            if name.is_empty() {
                errors.push("Name is required.".to_string());
            } else if name.chars().count() > MAX_NAME_LENGTH {
                errors.push(format!("Name must be at most {MAX_NAME_LENGTH} characters."));
            } else {
                changes.name = Some(name.to_string());
            }
        }

        if allowed.slug {
            let raw = self.slug.trim();
            let slug = if raw.is_empty() {
                Slug::slugify(self.name.trim())
            } else {
                Slug::parse(raw)
            };
            match slug {
                Ok(slug) => changes.slug = Some(slug),
                Err(e) => errors.push(format!("Slug: {e}.")),
            }
        }

        if allowed.description {
            changes.description = Some(self.description.trim().to_string());
        }

        if allowed.price {
            match self.price.parse::<Price>() {
                Ok(price) => changes.price = Some(price),
                Err(e) => errors.push(format!("Price: {e}.")),
            }
        }

        if allowed.active {
            changes.active = Some(self.active.is_some());
        }
        if allowed.in_stock {
            changes.in_stock = Some(self.in_stock.is_some());
        }

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

/// Stock toggle posted from the list.
#[derive(Debug, Deserialize)]
pub struct StockForm {
    pub in_stock: Option<String>,
}

/// Book list template.
#[derive(Template, WebTemplate)]
#[template(path = "books/list.html")]
pub struct BookListTemplate {
    pub site: Site,
    pub user: User,
    pub books: Vec<Book>,
}

/// Book edit template.
#[derive(Template, WebTemplate)]
#[template(path = "books/edit.html")]
pub struct BookEditTemplate {
    pub site: Site,
    pub user: User,
    pub book: Book,
    pub form: BookForm,
    pub fields: BookFields,
    pub errors: Vec<String>,
}

/// Build the books router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{site}/books/", get(list))
        .route("/{site}/books/{id}/", get(edit_page).post(edit))
        .route("/{site}/books/{id}/stock/", post(set_stock))
}

async fn load_book(state: &AppState, id: BookId) -> Result<Book> {
    BookRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("book {id}")))
}

fn list_url(site: Site) -> String {
    format!("{}books/", site.prefix())
}

/// GET /{site}/books/
#[instrument(skip(state, staff), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn list(State(state): State<AppState>, staff: SiteStaff) -> Result<BookListTemplate> {
    let books = BookRepository::new(state.pool()).list_all().await?;

    Ok(BookListTemplate {
        site: staff.site,
        user: staff.user,
        books,
    })
}

/// GET /{site}/books/{id}/
#[instrument(skip(state, staff), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn edit_page(
    State(state): State<AppState>,
    staff: SiteStaff,
    Path((_, id)): Path<(String, i32)>,
) -> Result<BookEditTemplate> {
    let book = load_book(&state, BookId::new(id)).await?;

    Ok(BookEditTemplate {
        site: staff.site,
        user: staff.user,
        form: BookForm::from(&book),
        book,
        fields: staff.site.book_fields(),
        errors: Vec::new(),
    })
}

/// POST /{site}/books/{id}/
#[instrument(skip(state, staff, form), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn edit(
    State(state): State<AppState>,
    staff: SiteStaff,
    Path((_, id)): Path<(String, i32)>,
    Form(form): Form<BookForm>,
) -> Result<Response> {
    let book = load_book(&state, BookId::new(id)).await?;
    let fields = staff.site.book_fields();

    let rerender = |staff: SiteStaff, book: Book, form: BookForm, errors: Vec<String>| {
        BookEditTemplate {
            site: staff.site,
            user: staff.user,
            book,
            form,
            fields,
            errors,
        }
        .into_response()
    };

    let changes = match form.changes(fields) {
        Ok(changes) => changes,
        Err(errors) => return Ok(rerender(staff, book, form, errors)),
    };

    match BookRepository::new(state.pool()).update(book.id, &changes).await {
        Ok(updated) => {
            tracing::info!(book_id = %updated.id, slug = %updated.slug, "book updated");
            Ok(Redirect::to(&list_url(staff.site)).into_response())
        }
        Err(RepositoryError::Conflict(_)) => Ok(rerender(
            staff,
            book,
            form,
            vec!["A book with this slug already exists.".to_string()],
        )),
        Err(e) => Err(e.into()),
    }
}

/// POST /{site}/books/{id}/stock/
#[instrument(skip(state, staff, form), fields(user_id = %staff.user.id, site = %staff.site))]
pub async fn set_stock(
    State(state): State<AppState>,
    staff: SiteStaff,
    Path((_, id)): Path<(String, i32)>,
    Form(form): Form<StockForm>,
) -> Result<Redirect> {
    let changes = BookChanges {
        in_stock: Some(form.in_stock.is_some()),
        ..BookChanges::default()
    };
    let updated = BookRepository::new(state.pool())
        .update(BookId::new(id), &changes)
        .await?;
    tracing::info!(book_id = %updated.id, in_stock = updated.in_stock, "stock flag changed");

    Ok(Redirect::to(&list_url(staff.site)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> BookForm {
        BookForm {
            name: "  Things Fall Apart ".to_string(),
            slug: String::new(),
            description: "A classic.".to_string(),
            price: "850.00".to_string(),
            active: Some("on".to_string()),
            in_stock: None,
        }
    }

    #[test]
    fn owners_change_everything_and_slug_follows_name() {
        let changes = form().changes(Site::Owners.book_fields()).unwrap();
        assert_eq!(changes.name.as_deref(), Some("Things Fall Apart"));
        assert_eq!(changes.slug.unwrap().as_str(), "things-fall-apart");
        assert_eq!(changes.price.unwrap().to_string(), "KSh 850.00");
        assert_eq!(changes.active, Some(true));
        assert_eq!(changes.in_stock, Some(false));
    }

    #[test]
    fn central_office_cannot_rename() {
        let mut input = form();
        input.name = String::new();
        input.slug = "renamed".to_string();
        let changes = input.changes(Site::CentralOffice.book_fields()).unwrap();
        assert!(changes.name.is_none());
        assert!(changes.slug.is_none());
        assert!(changes.price.is_some());
    }

    #[test]
    fn dispatch_only_touches_stock() {
        let mut input = form();
        input.price = "not a price".to_string();
        input.in_stock = Some("on".to_string());
        let changes = input.changes(Site::Dispatch.book_fields()).unwrap();
        assert_eq!(changes.in_stock, Some(true));
        assert!(changes.price.is_none());
        assert!(changes.active.is_none());
        assert!(changes.description.is_none());
    }

    #[test]
    fn invalid_fields_are_reported_together() {
        let mut input = form();
        input.name = String::new();
        input.slug = "Bad Slug".to_string();
        input.price = "-1".to_string();
        let errors = input.changes(Site::Owners.book_fields()).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn long_names_are_rejected() {
        let mut input = form();
        input.name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(input.changes(Site::Owners.book_fields()).is_err());
    }
}
