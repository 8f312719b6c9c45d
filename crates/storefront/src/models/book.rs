//! Catalog types: books, tags and images.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ebookstore_core::{BookId, BookImageId, BookTagId, Price, Slug};

/// Tag value meaning "no tag filter" in `/books/{tag}/`.
pub const ALL_TAGS: &str = "all";

/// A category label attached to books.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BookTag {
    pub id: BookTagId,
    pub name: String,
    /// Natural key.
    pub slug: Slug,
    pub description: String,
    pub active: bool,
}

/// A book in the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub slug: Slug,
    pub active: bool,
    pub in_stock: bool,
    pub date_updated: DateTime<Utc>,
}

/// A cover or preview image.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BookImage {
    pub id: BookImageId,
    pub book_id: BookId,
    /// Path relative to the media root.
    pub image: String,
    pub thumbnail: Option<String>,
}

impl BookImage {
    /// Thumbnail when one was generated, otherwise the full image.
    #[must_use]
    pub fn preview(&self) -> &str {
        self.thumbnail.as_deref().unwrap_or(&self.image)
    }
}

/// A book with its tags and images, for the detail page.
#[derive(Debug, Clone)]
pub struct BookDetail {
    pub book: Book,
    pub tags: Vec<BookTag>,
    pub images: Vec<BookImage>,
}

/// Fields an editor may change on a book.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub name: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub active: Option<bool>,
    pub in_stock: Option<bool>,
}

impl BookChanges {
    /// Whether nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.active.is_none()
            && self.in_stock.is_none()
    }
}
