//! Address book repository.
//!
//! Every query is scoped to the owning user, so another customer's address
//! reads as missing.

use sqlx::PgPool;

use ebookstore_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::address::{Address, AddressInput};

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, Address>(
            "SELECT id, user_id, name, address, town, county FROM bookstore.address WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, Address>(
            "SELECT id, user_id, name, address, town, county FROM bookstore.address WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Create an address for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO bookstore.address (user_id, name, address, town, county)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, address, town, county
            ",
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.town)
        .bind(input.county)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Update one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not belong to the user.
    pub async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>(
            r"
            UPDATE bookstore.address
            SET name = $3, address = $4, town = $5, county = $6
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, address, town, county
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.town)
        .bind(input.county)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete one of a user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not belong to the user.
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bookstore.address WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
