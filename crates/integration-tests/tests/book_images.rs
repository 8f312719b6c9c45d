//! Attaching cover images to books, against a real database.
//!
//! ```bash
//! STOREFRONT_DATABASE_URL=postgres://localhost/ebookstore_test \
//!     cargo test -p ebookstore-integration-tests --test book_images -- --ignored
//! ```

#![allow(clippy::unwrap_used)]

use std::path::Path;

use sqlx::PgPool;
use uuid::Uuid;

use ebookstore_core::{Price, Slug};
use ebookstore_storefront::db::BookRepository;
use ebookstore_storefront::db::books::BookUpsert;
use ebookstore_storefront::services::images;

async fn pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.unwrap();
    sqlx::migrate!("../storefront/migrations").run(&pool).await.unwrap();
    pool
}

#[tokio::test]
#[ignore = "Requires a PostgreSQL database"]
async fn stored_cover_appears_on_the_detail_page_once() {
    let pool = pool().await;
    let books = BookRepository::new(&pool);
    let slug = Slug::slugify(&format!("river between {}", Uuid::new_v4().simple())).unwrap();
    let book = books
        .upsert_book(&BookUpsert {
            name: "The River Between",
            slug: &slug,
            description: "",
            price: Price::from_cents(65_000).unwrap(),
            active: true,
            in_stock: true,
            tags: &[],
        })
        .await
        .unwrap();

    let cover = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../cli/fixtures/covers/the-river-between.png");
    let bytes = tokio::fs::read(cover).await.unwrap();
    let media = tempfile::tempdir().unwrap();
    let stored = images::store(media.path(), &format!("{slug}.png"), &bytes)
        .await
        .unwrap();

    let first = books
        .add_image(book.id, &stored.image, Some(&stored.thumbnail))
        .await
        .unwrap();
    let again = books
        .add_image(book.id, &stored.image, Some(&stored.thumbnail))
        .await
        .unwrap();
    assert_eq!(first.id, again.id);

    let detail = books.get_detail(slug.as_str()).await.unwrap().unwrap();
    assert_eq!(detail.images.len(), 1);
    assert_eq!(detail.images[0].preview(), stored.thumbnail);
    assert!(media.path().join(&stored.thumbnail).exists());
}
