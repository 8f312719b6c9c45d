//! Seed the catalog from a YAML fixture.
//!
//! Tags and books are upserted by slug, so running the same fixture twice
//! leaves the catalog unchanged. A book without a slug gets one from its
//! name. Image paths are relative to the fixture file; each image is copied
//! into the media root with a generated thumbnail.
//!
//! ```yaml
//! tags:
//!   - name: Fiction
//!     slug: fiction
//! books:
//!   - name: The River Between
//!     price: "650.00"
//!     tags: [fiction]
//!     images: [covers/the-river-between.png]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use ebookstore_core::{Price, PriceError, Slug, SlugError};
use ebookstore_storefront::db::books::BookUpsert;
use ebookstore_storefront::db::{BookRepository, RepositoryError};
use ebookstore_storefront::services::images::{self, ImageError};

use super::{ConnectError, connect};

/// Errors from seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("fixture not found: {0}")]
    NotFound(String),

    #[error("could not read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("book {name:?}: {source}")]
    Slug { name: String, source: SlugError },

    #[error("book {name:?}: {source}")]
    Price { name: String, source: PriceError },

    #[error("book {book:?} refers to unknown tag {tag:?}")]
    UnknownTag { book: String, tag: String },

    #[error("book {book:?}: image {path}: {source}")]
    Image {
        book: String,
        path: String,
        source: ImageError,
    },

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Catalog fixture file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub tags: Vec<TagFixture>,
    #[serde(default)]
    pub books: Vec<BookFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagFixture {
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookFixture {
    pub name: String,
    pub slug: Option<Slug>,
    #[serde(default)]
    pub description: String,
    /// Decimal string, e.g. `"650.00"`.
    pub price: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub tags: Vec<Slug>,
    /// Image files, relative to the fixture.
    #[serde(default)]
    pub images: Vec<PathBuf>,
}

const fn default_true() -> bool {
    true
}

/// A book ready to upsert.
#[derive(Debug)]
pub struct SeedBook {
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub price: Price,
    pub active: bool,
    pub in_stock: bool,
    pub tags: Vec<Slug>,
    pub images: Vec<PathBuf>,
}

impl Fixture {
    /// Parse a fixture from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` for malformed input.
    pub fn from_yaml(text: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Validate every book.
    ///
    /// When the fixture declares tags, every book tag must be one of them.
    /// A fixture without tags may refer to tags already in the database.
    ///
    /// # Errors
    ///
    /// Returns the first invalid book.
    pub fn books(&self) -> Result<Vec<SeedBook>, SeedError> {
        self.books
            .iter()
            .map(|book| {
                let slug = match &book.slug {
                    Some(slug) => slug.clone(),
                    None => Slug::slugify(&book.name).map_err(|source| SeedError::Slug {
                        name: book.name.clone(),
                        source,
                    })?,
                };
                let price = book.price.parse::<Price>().map_err(|source| SeedError::Price {
                    name: book.name.clone(),
                    source,
                })?;

                let undeclared = book
                    .tags
                    .iter()
                    .find(|tag| !self.tags.iter().any(|t| &t.slug == *tag));
                if let (false, Some(tag)) = (self.tags.is_empty(), undeclared) {
                    return Err(SeedError::UnknownTag {
                        book: book.name.clone(),
                        tag: tag.to_string(),
                    });
                }

                Ok(SeedBook {
                    name: book.name.trim().to_string(),
                    slug,
                    description: book.description.clone(),
                    price,
                    active: book.active,
                    in_stock: book.in_stock,
                    tags: book.tags.clone(),
                    images: book.images.clone(),
                })
            })
            .collect()
    }
}

/// Last component of a fixture image path.
fn image_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load a fixture and upsert its tags, books and book images.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, an image cannot be
/// read or stored, or a database operation fails. Validation happens before
/// connecting.
pub async fn catalog(file_path: &str, media_root: &Path) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::NotFound(file_path.to_string()));
    }

    tracing::info!(path = %file_path, "Loading catalog fixture");
    let content = tokio::fs::read_to_string(path).await?;
    let fixture = Fixture::from_yaml(&content)?;
    let books = fixture.books()?;
    tracing::info!(tags = fixture.tags.len(), books = books.len(), "Fixture validated");

    let pool = connect().await?;
    let repo = BookRepository::new(&pool);

    for tag in &fixture.tags {
        repo.upsert_tag(&tag.slug, tag.name.trim(), &tag.description, tag.active)
            .await?;
    }

    let fixture_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut image_count = 0;

    for book in &books {
        let upsert = BookUpsert {
            name: &book.name,
            slug: &book.slug,
            description: &book.description,
            price: book.price,
            active: book.active,
            in_stock: book.in_stock,
            tags: &book.tags,
        };
        let stored = repo.upsert_book(&upsert).await.map_err(|e| match e {
            RepositoryError::NotFound => SeedError::UnknownTag {
                book: book.name.clone(),
                tag: book
                    .tags
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            other => SeedError::Repository(other),
        })?;

        for image in &book.images {
            let image_error = |source: ImageError| SeedError::Image {
                book: book.name.clone(),
                path: image.display().to_string(),
                source,
            };
            let bytes = tokio::fs::read(fixture_dir.join(image))
                .await
                .map_err(|e| image_error(ImageError::Io(e)))?;
            let paths = images::store(media_root, &image_file_name(image), &bytes)
                .await
                .map_err(image_error)?;
            repo.add_image(stored.id, &paths.image, Some(&paths.thumbnail))
                .await?;
            image_count += 1;
        }
    }

    tracing::info!(
        "Seeding complete! Tags processed={}, books processed={}, images processed={}",
        fixture.tags.len(),
        books.len(),
        image_count
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
tags:
  - name: Fiction
    slug: fiction
  - name: Poetry
    slug: poetry
    active: false
books:
  - name: The River Between
    price: "650.00"
    tags: [fiction]
  - name: Song of Lawino
    slug: lawino
    price: "480"
    in_stock: false
    tags: [poetry]
"#;

    #[test]
    fn parses_tags_and_books_with_defaults() {
        let fixture = Fixture::from_yaml(FIXTURE).unwrap();
        assert_eq!(fixture.tags.len(), 2);
        assert!(fixture.tags[0].active);
        assert!(!fixture.tags[1].active);

        let books = fixture.books().unwrap();
        assert_eq!(books[0].slug.as_str(), "the-river-between");
        assert!(books[0].active && books[0].in_stock);
        assert_eq!(books[1].slug.as_str(), "lawino");
        assert!(!books[1].in_stock);
        assert_eq!(books[1].price.to_string(), "KSh 480.00");
    }

    #[test]
    fn book_with_undeclared_tag_is_rejected() {
        let text = r#"
tags:
  - name: Fiction
    slug: fiction
books:
  - name: Weep Not, Child
    price: "700.00"
    tags: [history]
"#;
        let err = Fixture::from_yaml(text).unwrap().books().unwrap_err();
        assert!(matches!(err, SeedError::UnknownTag { tag, .. } if tag == "history"));
    }

    #[test]
    fn bad_price_names_the_book() {
        let text = r#"
books:
  - name: Petals of Blood
    price: "-3"
"#;
        let err = Fixture::from_yaml(text).unwrap().books().unwrap_err();
        assert!(err.to_string().contains("Petals of Blood"));
    }

    #[test]
    fn images_are_kept_relative_to_the_fixture() {
        let text = r#"
books:
  - name: Weep Not, Child
    price: "700.00"
    images: [covers/weep-not-child.png]
"#;
        let books = Fixture::from_yaml(text).unwrap().books().unwrap();
        assert_eq!(books[0].images, vec![PathBuf::from("covers/weep-not-child.png")]);
        assert_eq!(image_file_name(&books[0].images[0]), "weep-not-child.png");
    }

    #[test]
    fn sample_catalog_covers_make_thumbnails() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let text = std::fs::read_to_string(dir.join("catalog.yaml")).unwrap();
        let books = Fixture::from_yaml(&text).unwrap().books().unwrap();

        let covers: Vec<&PathBuf> = books.iter().flat_map(|b| &b.images).collect();
        assert_eq!(covers.len(), 2);
        for cover in covers {
            let bytes = std::fs::read(dir.join(cover)).unwrap();
            assert!(images::make_thumbnail(&bytes).is_ok(), "{}", cover.display());
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Fixture::from_yaml("books: []\nauthors: []\n").is_err());
    }
}
