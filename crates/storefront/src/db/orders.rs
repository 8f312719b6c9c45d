//! Order repository.

use sqlx::PgPool;

use ebookstore_core::{BasketId, BasketStatus, OrderId, OrderLineId, OrderLineStatus, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::basket::BasketContents;
use crate::models::order::{AddressSnapshot, Order, OrderFilter, OrderLine, OrderLineFilter};
use crate::models::pagination::PageWindow;

const ORDER_COLUMNS: &str = r"
    o.id, o.user_id, o.status,
    o.billing_name, o.billing_address, o.billing_town, o.billing_county,
    o.shipping_name, o.shipping_address, o.shipping_town, o.shipping_county,
    o.date_added, o.date_updated, o.last_spoken_to
";

const LINE_COLUMNS: &str = "l.id, l.order_id, l.book_id, b.name AS book_name, l.status";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Turn an open basket into an order in one transaction.
    ///
    /// Creates one order line per unit and marks the basket submitted.
    /// Callers check that the basket is non-empty and owned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the basket is no longer open.
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create_from_basket(
        &self,
        user_id: UserId,
        contents: &BasketContents,
        billing: &AddressSnapshot,
        shipping: &AddressSnapshot,
    ) -> Result<(Order, usize), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let status = sqlx::query_scalar::<_, BasketStatus>(
            "SELECT status FROM bookstore.basket WHERE id = $1 FOR UPDATE",
        )
        .bind(contents.basket.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if status != BasketStatus::Open {
            return Err(RepositoryError::Conflict("basket already submitted".to_owned()));
        }

        let sql = format!(
            r#"
            INSERT INTO bookstore."order" AS o (
                user_id,
                billing_name, billing_address, billing_town, billing_county,
                shipping_name, shipping_address, shipping_town, shipping_county)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ORDER_COLUMNS}
            "#
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(&billing.name)
            .bind(&billing.address)
            .bind(&billing.town)
            .bind(billing.county)
            .bind(&shipping.name)
            .bind(&shipping.address)
            .bind(&shipping.town)
            .bind(shipping.county)
            .fetch_one(&mut *tx)
            .await?;

        let units: Vec<i32> = contents.units().iter().map(|b| b.as_i32()).collect();
        sqlx::query(
            "INSERT INTO bookstore.order_line (order_id, book_id) SELECT $1, UNNEST($2::int[])",
        )
        .bind(order.id)
        .bind(&units)
        .execute(&mut *tx)
        .await?;

        mark_submitted(&mut tx, contents.basket.id).await?;

        tx.commit().await?;
        Ok((order, units.len()))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(r#"SELECT {ORDER_COLUMNS} FROM bookstore."order" o WHERE o.id = $1"#);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }

    /// Count orders matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: OrderFilter) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookstore."order" o
            WHERE ($1::smallint IS NULL OR o.status = $1)
              AND ($2::int IS NULL OR o.user_id = $2)
            "#,
        )
        .bind(filter.status)
        .bind(filter.user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Orders matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: OrderFilter,
        window: PageWindow,
    ) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM bookstore."order" o
            WHERE ($1::smallint IS NULL OR o.status = $1)
              AND ($2::int IS NULL OR o.user_id = $2)
            ORDER BY o.date_added DESC, o.id DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(filter.status)
            .bind(filter.user_id)
            .bind(window.limit())
            .bind(window.offset())
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
    }

    /// Lines of one order, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_order(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {LINE_COLUMNS} FROM bookstore.order_line l
            JOIN bookstore.book b ON b.id = l.book_id
            WHERE l.order_id = $1
            ORDER BY l.id
            "
        );
        let lines = sqlx::query_as::<_, OrderLine>(&sql)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?;
        Ok(lines)
    }

    /// Count order lines matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_lines(&self, filter: OrderLineFilter) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookstore.order_line l
            JOIN bookstore."order" o ON o.id = l.order_id
            WHERE ($1::int IS NULL OR l.order_id = $1)
              AND ($2::smallint IS NULL OR l.status = $2)
              AND ($3::smallint IS NULL OR o.status = $3)
            "#,
        )
        .bind(filter.order_id)
        .bind(filter.status)
        .bind(filter.order_status)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Order lines matching a filter, newest order first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(
        &self,
        filter: OrderLineFilter,
        window: PageWindow,
    ) -> Result<Vec<OrderLine>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {LINE_COLUMNS} FROM bookstore.order_line l
            JOIN bookstore."order" o ON o.id = l.order_id
            JOIN bookstore.book b ON b.id = l.book_id
            WHERE ($1::int IS NULL OR l.order_id = $1)
              AND ($2::smallint IS NULL OR l.status = $2)
              AND ($3::smallint IS NULL OR o.status = $3)
            ORDER BY o.date_added DESC, l.id
            LIMIT $4 OFFSET $5
            "#
        );
        let lines = sqlx::query_as::<_, OrderLine>(&sql)
            .bind(filter.order_id)
            .bind(filter.status)
            .bind(filter.order_status)
            .bind(window.limit())
            .bind(window.offset())
            .fetch_all(self.pool)
            .await?;
        Ok(lines)
    }

    /// Get one order line, optionally requiring its order to have a status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_line(
        &self,
        id: OrderLineId,
        order_status: Option<OrderStatus>,
    ) -> Result<Option<OrderLine>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {LINE_COLUMNS} FROM bookstore.order_line l
            JOIN bookstore."order" o ON o.id = l.order_id
            JOIN bookstore.book b ON b.id = l.book_id
            WHERE l.id = $1 AND ($2::smallint IS NULL OR o.status = $2)
            "#
        );
        let line = sqlx::query_as::<_, OrderLine>(&sql)
            .bind(id)
            .bind(order_status)
            .fetch_optional(self.pool)
            .await?;
        Ok(line)
    }

    /// Record the staff member who opened the chat for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn set_last_spoken_to(
        &self,
        id: OrderId,
        staff: UserId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE bookstore."order" SET last_spoken_to = $2, date_updated = NOW() WHERE id = $1"#,
        )
        .bind(id)
        .bind(staff)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Change an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE bookstore."order" SET status = $2, date_updated = NOW() WHERE id = $1"#,
        )
        .bind(id)
        .bind(status)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Change an order line's status, optionally only when its order has
    /// `order_status`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no matching line exists.
    pub async fn update_line_status(
        &self,
        id: OrderLineId,
        status: OrderLineStatus,
        order_status: Option<OrderStatus>,
    ) -> Result<OrderId, RepositoryError> {
        sqlx::query_scalar::<_, OrderId>(
            r#"
            UPDATE bookstore.order_line l SET status = $2
            FROM bookstore."order" o
            WHERE l.id = $1 AND o.id = l.order_id
              AND ($3::smallint IS NULL OR o.status = $3)
            RETURNING l.order_id
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(order_status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

async fn mark_submitted(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    basket_id: BasketId,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE bookstore.basket SET status = $2 WHERE id = $1")
        .bind(basket_id)
        .bind(BasketStatus::Submitted)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
