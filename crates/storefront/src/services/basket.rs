//! Session-bound basket operations and checkout.
//!
//! The visitor's open basket id lives in the session under
//! [`session_keys::BASKET_ID`]. Anonymous baskets are merged into the user's
//! open basket when they sign in.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;

use ebookstore_core::{BasketId, BookId, UserId};

use crate::db::{BasketRepository, OrderRepository, RepositoryError};
use crate::models::{
    AddressSnapshot, Basket, BasketContents, BasketError, LineUpdate, Order, session_keys,
};

/// Errors from basket and checkout operations.
#[derive(Debug, Error)]
pub enum BasketServiceError {
    #[error(transparent)]
    Basket(#[from] BasketError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Basket operations for one request.
pub struct BasketService<'a> {
    pool: &'a PgPool,
    session: &'a Session,
}

impl<'a> BasketService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, session: &'a Session) -> Self {
        Self { pool, session }
    }

    const fn baskets(&self) -> BasketRepository<'a> {
        BasketRepository::new(self.pool)
    }

    /// The session's basket, if it still exists and is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or database cannot be read.
    pub async fn current(&self) -> Result<Option<Basket>, BasketServiceError> {
        let Some(id) = self.session.get::<BasketId>(session_keys::BASKET_ID).await? else {
            return Ok(None);
        };
        let basket = self.baskets().get(id).await?;
        Ok(basket.filter(Basket::is_open))
    }

    /// The session's basket with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or database cannot be read.
    pub async fn current_contents(&self) -> Result<Option<BasketContents>, BasketServiceError> {
        match self.current().await? {
            Some(basket) => Ok(Some(self.baskets().contents(basket).await?)),
            None => Ok(None),
        }
    }

    /// Add one unit of a book, creating the basket on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or database cannot be updated.
    pub async fn add_book(
        &self,
        book_id: BookId,
        user_id: Option<UserId>,
    ) -> Result<Basket, BasketServiceError> {
        let basket = match self.current().await? {
            Some(basket) => basket,
            None => {
                let basket = self.baskets().create(user_id).await?;
                self.session
                    .insert(session_keys::BASKET_ID, basket.id)
                    .await?;
                basket
            }
        };

        let quantity = self.baskets().add_book(basket.id, book_id).await?;
        tracing::debug!(basket_id = %basket.id, book_id = %book_id, quantity, "book added to basket");
        Ok(basket)
    }

    /// Apply quantity updates to the current basket's lines.
    ///
    /// # Errors
    ///
    /// Returns `BasketError::NotOpen` if there is no open basket.
    pub async fn update_lines(
        &self,
        updates: &[(ebookstore_core::BasketLineId, LineUpdate)],
    ) -> Result<(), BasketServiceError> {
        let basket = self.current().await?.ok_or(BasketError::NotOpen)?;
        let baskets = self.baskets();

        for (line_id, update) in updates {
            match update {
                LineUpdate::Set(quantity) => {
                    baskets.set_quantity(basket.id, *line_id, *quantity).await?;
                }
                LineUpdate::Remove => baskets.remove_line(basket.id, *line_id).await?,
            }
        }
        Ok(())
    }

    /// Reconcile the session basket with a user who just signed in.
    ///
    /// See [`merge_plan`] for the cases.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or database cannot be updated.
    pub async fn merge_on_login(&self, user_id: UserId) -> Result<(), BasketServiceError> {
        let baskets = self.baskets();
        let existing = baskets.get_open_for_user(user_id).await?;
        let session = self.current().await?;

        match merge_plan(session, existing, user_id) {
            MergePlan::Keep => {}
            MergePlan::Adopt(basket_id) => {
                self.session.insert(session_keys::BASKET_ID, basket_id).await?;
            }
            MergePlan::Assign(basket_id) => {
                baskets.assign_user(basket_id, user_id).await?;
                tracing::debug!(user_id = %user_id, basket_id = %basket_id, "assigned basket to user");
            }
            MergePlan::Merge { from, into } => {
                baskets.merge_into(from, into).await?;
                self.session.insert(session_keys::BASKET_ID, into).await?;
                tracing::info!(
                    user_id = %user_id,
                    from = %from,
                    into = %into,
                    "merged anonymous basket"
                );
            }
            MergePlan::Forget => self.forget().await?,
        }
        Ok(())
    }

    /// Forget the session's basket.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be updated.
    pub async fn forget(&self) -> Result<(), BasketServiceError> {
        self.session
            .remove::<BasketId>(session_keys::BASKET_ID)
            .await?;
        Ok(())
    }

    /// Turn the basket into an order and detach it from the session.
    ///
    /// # Errors
    ///
    /// Returns `BasketError::NoUser` if the basket has no owner,
    /// `BasketError::Empty` if it has no lines and
    /// `BasketError::NotOpen` if it was submitted concurrently.
    pub async fn create_order(
        &self,
        contents: &BasketContents,
        billing: &AddressSnapshot,
        shipping: &AddressSnapshot,
    ) -> Result<Order, BasketServiceError> {
        let user_id = check_orderable(contents)?;

        let (order, line_count) = OrderRepository::new(self.pool)
            .create_from_basket(user_id, contents, billing, shipping)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => BasketServiceError::Basket(BasketError::NotOpen),
                other => other.into(),
            })?;

        tracing::info!(
            order_id = %order.id,
            basket_id = %contents.basket.id,
            lines = line_count,
            "created order from basket"
        );

        self.forget().await?;
        Ok(order)
    }
}

/// What signing in does to the session's basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePlan {
    /// Leave the session as it is.
    Keep,
    /// Make the user's open basket the session's basket.
    Adopt(BasketId),
    /// Give the anonymous session basket to the user.
    Assign(BasketId),
    /// Sum `from`'s lines into `into`, delete `from` and make `into` current.
    Merge { from: BasketId, into: BasketId },
    /// Drop the session's basket.
    Forget,
}

/// Decide how to reconcile the session basket with the open basket of a
/// user who just signed in.
///
/// An anonymous basket is merged into the user's open basket, or assigned
/// to the user when they have none. A basket left behind by another
/// account on the same browser is never merged: the user's own basket
/// replaces it, or the session forgets it.
#[must_use]
pub fn merge_plan(session: Option<Basket>, existing: Option<Basket>, user: UserId) -> MergePlan {
    let Some(session) = session else {
        return existing.map_or(MergePlan::Keep, |e| MergePlan::Adopt(e.id));
    };

    match (session.user_id, existing) {
        (Some(owner), _) if owner == user => MergePlan::Keep,
        (None, Some(existing)) => MergePlan::Merge {
            from: session.id,
            into: existing.id,
        },
        (None, None) => MergePlan::Assign(session.id),
        (Some(_), Some(existing)) => MergePlan::Adopt(existing.id),
        (Some(_), None) => MergePlan::Forget,
    }
}

/// Checks that a basket can become an order and returns its owner.
///
/// # Errors
///
/// Returns the first rule the basket breaks.
pub fn check_orderable(contents: &BasketContents) -> Result<UserId, BasketError> {
    if !contents.basket.is_open() {
        return Err(BasketError::NotOpen);
    }
    let user_id = contents.basket.user_id.ok_or(BasketError::NoUser)?;
    if contents.is_empty() {
        return Err(BasketError::Empty);
    }
    Ok(user_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ebookstore_core::{BasketLineId, BasketStatus, Price, Slug};

    use crate::models::BasketLine;

    fn contents(user: Option<i32>, status: BasketStatus, lines: usize) -> BasketContents {
        BasketContents {
            basket: Basket {
                id: BasketId::new(1),
                user_id: user.map(UserId::new),
                status,
            },
            lines: (0..lines)
                .map(|i| BasketLine {
                    id: BasketLineId::new(i32::try_from(i).unwrap()),
                    book_id: BookId::new(7),
                    book_name: "Kifo Kisimani".to_string(),
                    book_slug: Slug::parse("kifo-kisimani").unwrap(),
                    price: Price::from_cents(45_000).unwrap(),
                    quantity: 2,
                })
                .collect(),
        }
    }

    #[test]
    fn anonymous_basket_cannot_be_ordered() {
        assert_eq!(
            check_orderable(&contents(None, BasketStatus::Open, 1)),
            Err(BasketError::NoUser)
        );
    }

    #[test]
    fn empty_basket_cannot_be_ordered() {
        assert_eq!(
            check_orderable(&contents(Some(3), BasketStatus::Open, 0)),
            Err(BasketError::Empty)
        );
    }

    #[test]
    fn submitted_basket_cannot_be_ordered_twice() {
        assert_eq!(
            check_orderable(&contents(Some(3), BasketStatus::Submitted, 1)),
            Err(BasketError::NotOpen)
        );
    }

    #[test]
    fn owned_non_empty_basket_is_orderable() {
        assert_eq!(
            check_orderable(&contents(Some(3), BasketStatus::Open, 1)),
            Ok(UserId::new(3))
        );
    }

    fn open(id: i32, user: Option<i32>) -> Basket {
        Basket {
            id: BasketId::new(id),
            user_id: user.map(UserId::new),
            status: BasketStatus::Open,
        }
    }

    #[test]
    fn anonymous_basket_merges_into_users_open_basket() {
        assert_eq!(
            merge_plan(Some(open(8, None)), Some(open(2, Some(5))), UserId::new(5)),
            MergePlan::Merge {
                from: BasketId::new(8),
                into: BasketId::new(2)
            }
        );
    }

    #[test]
    fn anonymous_basket_is_assigned_when_user_has_none() {
        assert_eq!(
            merge_plan(Some(open(8, None)), None, UserId::new(5)),
            MergePlan::Assign(BasketId::new(8))
        );
    }

    #[test]
    fn basket_of_another_account_is_replaced_not_merged() {
        assert_eq!(
            merge_plan(Some(open(8, Some(9))), Some(open(2, Some(5))), UserId::new(5)),
            MergePlan::Adopt(BasketId::new(2))
        );
        assert_eq!(
            merge_plan(Some(open(8, Some(9))), None, UserId::new(5)),
            MergePlan::Forget
        );
    }

    #[test]
    fn without_session_basket_users_basket_becomes_current() {
        assert_eq!(
            merge_plan(None, Some(open(2, Some(5))), UserId::new(5)),
            MergePlan::Adopt(BasketId::new(2))
        );
        assert_eq!(merge_plan(None, None, UserId::new(5)), MergePlan::Keep);
    }

    #[test]
    fn users_own_basket_is_kept() {
        assert_eq!(
            merge_plan(Some(open(2, Some(5))), Some(open(2, Some(5))), UserId::new(5)),
            MergePlan::Keep
        );
    }
}
