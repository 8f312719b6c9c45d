//! Shopping basket types.

use rust_decimal::Decimal;
use serde::Serialize;

use ebookstore_core::{BasketId, BasketLineId, BasketStatus, BookId, Price, Slug, UserId};

/// A basket header row.
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct Basket {
    pub id: BasketId,
    /// `None` for anonymous visitors.
    pub user_id: Option<UserId>,
    pub status: BasketStatus,
}

impl Basket {
    /// Whether lines can still be added.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == BasketStatus::Open
    }
}

/// One book in a basket with its quantity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BasketLine {
    pub id: BasketLineId,
    pub book_id: BookId,
    pub book_name: String,
    pub book_slug: Slug,
    pub price: Price,
    pub quantity: i32,
}

impl BasketLine {
    /// Price times quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.price.times(self.quantity.unsigned_abs())
    }
}

/// A basket with its lines loaded.
#[derive(Debug, Clone, Serialize)]
pub struct BasketContents {
    pub basket: Basket,
    pub lines: Vec<BasketLine>,
}

impl BasketContents {
    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }

    /// Whether the basket has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(BasketLine::total).sum()
    }

    /// Book ids to create order lines for: one entry per unit.
    #[must_use]
    pub fn units(&self) -> Vec<BookId> {
        self.lines
            .iter()
            .flat_map(|line| {
                std::iter::repeat_n(line.book_id, usize::try_from(line.quantity).unwrap_or(0))
            })
            .collect()
    }
}

/// What a quantity update should do to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineUpdate {
    /// Keep the line with this quantity.
    Set(i32),
    /// Remove the line.
    Remove,
}

/// Errors from basket edits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasketError {
    /// A quantity below zero was submitted.
    #[error("quantity must not be negative")]
    NegativeQuantity,
    /// Submitted value was not a number.
    #[error("quantity must be a whole number")]
    InvalidQuantity,
    /// The basket has no lines.
    #[error("basket is empty")]
    Empty,
    /// The basket is not linked to a user.
    #[error("basket has no owner")]
    NoUser,
    /// The basket was already turned into an order.
    #[error("basket was already submitted")]
    NotOpen,
}

impl LineUpdate {
    /// Interpret a submitted quantity field. Zero or `delete` removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error for negative or non-numeric quantities.
    pub fn from_form(quantity: &str, delete: bool) -> Result<Self, BasketError> {
        if delete {
            return Ok(Self::Remove);
        }
        let quantity: i32 = quantity
            .trim()
            .parse()
            .map_err(|_| BasketError::InvalidQuantity)?;
        match quantity {
            q if q < 0 => Err(BasketError::NegativeQuantity),
            0 => Ok(Self::Remove),
            q => Ok(Self::Set(q)),
        }
    }
}
