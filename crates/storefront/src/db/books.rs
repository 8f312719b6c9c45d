//! Catalog repository: books, tags and images.

use sqlx::PgPool;

use ebookstore_core::{BookId, Price, Slug};

use super::RepositoryError;
use crate::models::book::{Book, BookChanges, BookDetail, BookImage, BookTag};
use crate::models::pagination::PageWindow;

const BOOK_COLUMNS: &str =
    "b.id, b.name, b.description, b.price, b.slug, b.active, b.in_stock, b.date_updated";

/// Fields for inserting or replacing a book by slug.
#[derive(Debug, Clone)]
pub struct BookUpsert<'a> {
    pub name: &'a str,
    pub slug: &'a Slug,
    pub description: &'a str,
    pub price: Price,
    pub active: bool,
    pub in_stock: bool,
    pub tags: &'a [Slug],
}

/// Repository for catalog queries.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up an active tag by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_tag(&self, slug: &str) -> Result<Option<BookTag>, RepositoryError> {
        let tag = sqlx::query_as::<_, BookTag>(
            "SELECT id, name, slug, description, active FROM bookstore.book_tag WHERE slug = $1 AND active",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(tag)
    }

    /// All tags ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_tags(&self) -> Result<Vec<BookTag>, RepositoryError> {
        let tags = sqlx::query_as::<_, BookTag>(
            "SELECT id, name, slug, description, active FROM bookstore.book_tag ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(tags)
    }

    /// Count active books, optionally restricted to one tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active(&self, tag: Option<&BookTag>) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM bookstore.book b
            WHERE b.active
              AND ($1::int IS NULL OR EXISTS (
                  SELECT 1 FROM bookstore.book_tags bt WHERE bt.book_id = b.id AND bt.tag_id = $1))
            ",
        )
        .bind(tag.map(|t| t.id))
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// One page of active books ordered by name, optionally restricted to one tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(
        &self,
        tag: Option<&BookTag>,
        window: PageWindow,
    ) -> Result<Vec<Book>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {BOOK_COLUMNS} FROM bookstore.book b
            WHERE b.active
              AND ($1::int IS NULL OR EXISTS (
                  SELECT 1 FROM bookstore.book_tags bt WHERE bt.book_id = b.id AND bt.tag_id = $1))
            ORDER BY b.name, b.id
            LIMIT $2 OFFSET $3
            "
        );
        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(tag.map(|t| t.id))
            .bind(window.limit())
            .bind(window.offset())
            .fetch_all(self.pool)
            .await?;
        Ok(books)
    }

    /// Every book, active or not, ordered by name (back office).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Book>, RepositoryError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM bookstore.book b ORDER BY b.name, b.id");
        let books = sqlx::query_as::<_, Book>(&sql).fetch_all(self.pool).await?;
        Ok(books)
    }

    /// Get a book by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM bookstore.book b WHERE b.id = $1");
        let book = sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(book)
    }

    /// Get an active book by slug, with its tags and images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(&self, slug: &str) -> Result<Option<BookDetail>, RepositoryError> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM bookstore.book b WHERE b.slug = $1 AND b.active");
        let Some(book) = sqlx::query_as::<_, Book>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let tags = sqlx::query_as::<_, BookTag>(
            r"
            SELECT t.id, t.name, t.slug, t.description, t.active
            FROM bookstore.book_tag t
            JOIN bookstore.book_tags bt ON bt.tag_id = t.id
            WHERE bt.book_id = $1 AND t.active
            ORDER BY t.name
            ",
        )
        .bind(book.id)
        .fetch_all(self.pool)
        .await?;

        let images = sqlx::query_as::<_, BookImage>(
            "SELECT id, book_id, image, thumbnail FROM bookstore.book_image WHERE book_id = $1 ORDER BY id",
        )
        .bind(book.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(BookDetail { book, tags, images }))
    }

    /// Attach an image to a book. Storing the same image again only
    /// replaces its thumbnail.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book does not exist.
    pub async fn add_image(
        &self,
        book_id: BookId,
        image: &str,
        thumbnail: Option<&str>,
    ) -> Result<BookImage, RepositoryError> {
        sqlx::query_as::<_, BookImage>(
            r"
            INSERT INTO bookstore.book_image (book_id, image, thumbnail)
            VALUES ($1, $2, $3)
            ON CONFLICT (book_id, image) DO UPDATE SET thumbnail = EXCLUDED.thumbnail
            RETURNING id, book_id, image, thumbnail
            ",
        )
        .bind(book_id)
        .bind(image)
        .bind(thumbnail)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => RepositoryError::NotFound,
            other => other.into(),
        })
    }

    /// Apply an edit to a book and bump `date_updated`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the book does not exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(&self, id: BookId, changes: &BookChanges) -> Result<Book, RepositoryError> {
        let sql = format!(
            r"
            UPDATE bookstore.book b SET
                name = COALESCE($2, b.name),
                slug = COALESCE($3, b.slug),
                description = COALESCE($4, b.description),
                price = COALESCE($5, b.price),
                active = COALESCE($6, b.active),
                in_stock = COALESCE($7, b.in_stock),
                date_updated = NOW()
            WHERE b.id = $1
            RETURNING {BOOK_COLUMNS}
            "
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .bind(changes.name.as_deref())
            .bind(changes.slug.as_ref().map(Slug::as_str))
            .bind(changes.description.as_deref())
            .bind(changes.price)
            .bind(changes.active)
            .bind(changes.in_stock)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_insert(e, "slug"))?
            .ok_or(RepositoryError::NotFound)
    }

    /// Insert or update a tag by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_tag(
        &self,
        slug: &Slug,
        name: &str,
        description: &str,
        active: bool,
    ) -> Result<BookTag, RepositoryError> {
        let tag = sqlx::query_as::<_, BookTag>(
            r"
            INSERT INTO bookstore.book_tag (name, slug, description, active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE
                SET name = EXCLUDED.name, description = EXCLUDED.description, active = EXCLUDED.active
            RETURNING id, name, slug, description, active
            ",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(active)
        .fetch_one(self.pool)
        .await?;
        Ok(tag)
    }

    /// Insert or update a book by its slug and replace its tags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a tag slug is unknown.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn upsert_book(&self, book: &BookUpsert<'_>) -> Result<Book, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r"
            INSERT INTO bookstore.book AS b (name, slug, description, price, active, in_stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (slug) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                active = EXCLUDED.active,
                in_stock = EXCLUDED.in_stock,
                date_updated = NOW()
            RETURNING {BOOK_COLUMNS}
            "
        );
        let stored = sqlx::query_as::<_, Book>(&sql)
            .bind(book.name)
            .bind(book.slug)
            .bind(book.description)
            .bind(book.price)
            .bind(book.active)
            .bind(book.in_stock)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM bookstore.book_tags WHERE book_id = $1")
            .bind(stored.id)
            .execute(&mut *tx)
            .await?;

        for tag in book.tags {
            let inserted = sqlx::query(
                r"
                INSERT INTO bookstore.book_tags (book_id, tag_id)
                SELECT $1, t.id FROM bookstore.book_tag t WHERE t.slug = $2
                ",
            )
            .bind(stored.id)
            .bind(tag)
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
        }

        tx.commit().await?;
        Ok(stored)
    }
}
