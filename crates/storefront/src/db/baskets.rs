//! Basket repository.

use sqlx::PgPool;

use ebookstore_core::{BasketId, BasketLineId, BasketStatus, BookId, UserId};

use super::RepositoryError;
use crate::models::basket::{Basket, BasketContents, BasketLine};

/// Repository for basket database operations.
pub struct BasketRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BasketRepository<'a> {
    /// Create a new basket repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an open basket, optionally linked to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user_id: Option<UserId>) -> Result<Basket, RepositoryError> {
        let basket = sqlx::query_as::<_, Basket>(
            "INSERT INTO bookstore.basket (user_id) VALUES ($1) RETURNING id, user_id, status",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(basket)
    }

    /// Get a basket by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BasketId) -> Result<Option<Basket>, RepositoryError> {
        let basket = sqlx::query_as::<_, Basket>(
            "SELECT id, user_id, status FROM bookstore.basket WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(basket)
    }

    /// The user's most recent open basket.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_open_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Basket>, RepositoryError> {
        let basket = sqlx::query_as::<_, Basket>(
            r"
            SELECT id, user_id, status FROM bookstore.basket
            WHERE user_id = $1 AND status = $2
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .bind(user_id)
        .bind(BasketStatus::Open)
        .fetch_optional(self.pool)
        .await?;
        Ok(basket)
    }

    /// Load a basket's lines, ordered by book name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contents(&self, basket: Basket) -> Result<BasketContents, RepositoryError> {
        let lines = sqlx::query_as::<_, BasketLine>(
            r"
            SELECT l.id, l.book_id, b.name AS book_name, b.slug AS book_slug, b.price, l.quantity
            FROM bookstore.basket_line l
            JOIN bookstore.book b ON b.id = l.book_id
            WHERE l.basket_id = $1
            ORDER BY b.name, l.id
            ",
        )
        .bind(basket.id)
        .fetch_all(self.pool)
        .await?;
        Ok(BasketContents { basket, lines })
    }

    /// Add one unit of a book, creating the line if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add_book(&self, basket_id: BasketId, book_id: BookId) -> Result<i32, RepositoryError> {
        let quantity = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO bookstore.basket_line (basket_id, book_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (basket_id, book_id)
                DO UPDATE SET quantity = bookstore.basket_line.quantity + 1
            RETURNING quantity
            ",
        )
        .bind(basket_id)
        .bind(book_id)
        .fetch_one(self.pool)
        .await?;
        Ok(quantity)
    }

    /// Set a line's quantity (must be at least one).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the basket.
    pub async fn set_quantity(
        &self,
        basket_id: BasketId,
        line_id: BasketLineId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE bookstore.basket_line SET quantity = $3 WHERE id = $1 AND basket_id = $2",
        )
        .bind(line_id)
        .bind(basket_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a line from a basket.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_line(
        &self,
        basket_id: BasketId,
        line_id: BasketLineId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM bookstore.basket_line WHERE id = $1 AND basket_id = $2")
            .bind(line_id)
            .bind(basket_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Link an anonymous basket to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn assign_user(&self, basket_id: BasketId, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE bookstore.basket SET user_id = $2 WHERE id = $1")
            .bind(basket_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Move every line of `source` into `target`, summing quantities of the
    /// same book, then delete `source`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// changed in that case.
    pub async fn merge_into(&self, source: BasketId, target: BasketId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO bookstore.basket_line (basket_id, book_id, quantity)
            SELECT $2, book_id, quantity FROM bookstore.basket_line WHERE basket_id = $1
            ON CONFLICT (basket_id, book_id)
                DO UPDATE SET quantity = bookstore.basket_line.quantity + EXCLUDED.quantity
            ",
        )
        .bind(source)
        .bind(target)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM bookstore.basket WHERE id = $1")
            .bind(source)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
