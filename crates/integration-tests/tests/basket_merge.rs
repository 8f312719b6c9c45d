//! Signing in with an anonymous basket, against a real database.
//!
//! ```bash
//! STOREFRONT_DATABASE_URL=postgres://localhost/ebookstore_test \
//!     cargo test -p ebookstore-integration-tests --test basket_merge -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;
use uuid::Uuid;

use ebookstore_core::{BookId, Email, Price, Slug, UserId};
use ebookstore_storefront::db::books::BookUpsert;
use ebookstore_storefront::db::users::NewUser;
use ebookstore_storefront::db::{BasketRepository, BookRepository, UserRepository};
use ebookstore_storefront::services::basket::{MergePlan, merge_plan};

async fn pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::migrate!("../storefront/migrations").run(&pool).await.unwrap();
    pool
}

async fn book(pool: &PgPool, name: &str) -> BookId {
    let slug = Slug::slugify(&format!("{name} {}", Uuid::new_v4().simple())).unwrap();
    let upsert = BookUpsert {
        name,
        slug: &slug,
        description: "",
        price: Price::from_cents(52_000).unwrap(),
        active: true,
        in_stock: true,
        tags: &[],
    };
    BookRepository::new(pool).upsert_book(&upsert).await.unwrap().id
}

async fn customer(pool: &PgPool) -> UserId {
    let email = Email::parse(&format!("reader-{}@example.com", Uuid::new_v4().simple())).unwrap();
    let new = NewUser {
        email: &email,
        password_hash: "unused",
        first_name: "Njeri",
        last_name: "",
        is_staff: false,
        is_superuser: false,
        groups: &[],
    };
    UserRepository::new(pool).create(&new).await.unwrap().id
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn anonymous_basket_is_summed_into_users_basket() {
    let pool = pool().await;
    let baskets = BasketRepository::new(&pool);
    let shared = book(&pool, "Coming to Birth").await;
    let only_anonymous = book(&pool, "Mine Boy").await;
    let user = customer(&pool).await;

    let existing = baskets.create(Some(user)).await.unwrap();
    baskets.add_book(existing.id, shared).await.unwrap();

    let anonymous = baskets.create(None).await.unwrap();
    baskets.add_book(anonymous.id, shared).await.unwrap();
    baskets.add_book(anonymous.id, shared).await.unwrap();
    baskets.add_book(anonymous.id, only_anonymous).await.unwrap();

    let plan = merge_plan(
        Some(anonymous),
        baskets.get_open_for_user(user).await.unwrap(),
        user,
    );
    let MergePlan::Merge { from, into } = plan else {
        panic!("expected a merge, got {plan:?}");
    };
    assert_eq!((from, into), (anonymous.id, existing.id));
    baskets.merge_into(from, into).await.unwrap();

    assert!(baskets.get(anonymous.id).await.unwrap().is_none());

    let merged = baskets.contents(existing).await.unwrap();
    let quantity = |book: BookId| {
        merged
            .lines
            .iter()
            .find(|l| l.book_id == book)
            .map(|l| l.quantity)
    };
    assert_eq!(merged.lines.len(), 2);
    assert_eq!(quantity(shared), Some(3));
    assert_eq!(quantity(only_anonymous), Some(1));
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn anonymous_basket_is_assigned_to_user_without_one() {
    let pool = pool().await;
    let baskets = BasketRepository::new(&pool);
    let user = customer(&pool).await;

    let anonymous = baskets.create(None).await.unwrap();
    let plan = merge_plan(
        Some(anonymous),
        baskets.get_open_for_user(user).await.unwrap(),
        user,
    );
    assert_eq!(plan, MergePlan::Assign(anonymous.id));

    baskets.assign_user(anonymous.id, user).await.unwrap();
    let stored = baskets.get_open_for_user(user).await.unwrap().unwrap();
    assert_eq!(stored.id, anonymous.id);
    assert_eq!(stored.user_id, Some(user));
}
