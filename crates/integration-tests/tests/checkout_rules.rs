//! Basket-to-order rules and the listing pagination shared by the
//! storefront, the REST API and the back office.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;

use ebookstore_core::{BasketId, BasketLineId, BasketStatus, BookId, Price, Slug, UserId};
use ebookstore_storefront::models::{
    ApiPage, Basket, BasketContents, BasketError, BasketLine, LineUpdate, PageWindow,
};
use ebookstore_storefront::services::basket::check_orderable;

fn line(id: i32, book: i32, cents: i64, quantity: i32) -> BasketLine {
    BasketLine {
        id: BasketLineId::new(id),
        book_id: BookId::new(book),
        book_name: format!("Book {book}"),
        book_slug: Slug::parse(&format!("book-{book}")).unwrap(),
        price: Price::from_cents(cents).unwrap(),
        quantity,
    }
}

fn basket(user: Option<i32>, status: BasketStatus, lines: Vec<BasketLine>) -> BasketContents {
    BasketContents {
        basket: Basket {
            id: BasketId::new(1),
            user_id: user.map(UserId::new),
            status,
        },
        lines,
    }
}

#[test]
fn each_unit_becomes_its_own_order_line() {
    let contents = basket(
        Some(4),
        BasketStatus::Open,
        vec![line(1, 10, 65_000, 2), line(2, 11, 48_000, 1)],
    );

    assert_eq!(check_orderable(&contents).unwrap(), UserId::new(4));
    assert_eq!(contents.count(), 3);
    assert_eq!(
        contents.units(),
        vec![BookId::new(10), BookId::new(10), BookId::new(11)]
    );
    assert_eq!(contents.total(), Decimal::new(178_000, 2));
}

#[test]
fn anonymous_empty_and_submitted_baskets_cannot_be_ordered() {
    let anonymous = basket(None, BasketStatus::Open, vec![line(1, 10, 100, 1)]);
    assert_eq!(check_orderable(&anonymous), Err(BasketError::NoUser));

    let empty = basket(Some(4), BasketStatus::Open, vec![]);
    assert_eq!(check_orderable(&empty), Err(BasketError::Empty));

    let submitted = basket(Some(4), BasketStatus::Submitted, vec![line(1, 10, 100, 1)]);
    assert_eq!(check_orderable(&submitted), Err(BasketError::NotOpen));
}

#[test]
fn quantity_form_sets_or_removes_lines() {
    assert_eq!(LineUpdate::from_form("3", false), Ok(LineUpdate::Set(3)));
    assert_eq!(LineUpdate::from_form(" 0 ", false), Ok(LineUpdate::Remove));
    assert_eq!(LineUpdate::from_form("3", true), Ok(LineUpdate::Remove));
    assert_eq!(
        LineUpdate::from_form("-1", false),
        Err(BasketError::NegativeQuantity)
    );
    assert_eq!(
        LineUpdate::from_form("two", false),
        Err(BasketError::InvalidQuantity)
    );
}

#[test]
fn api_pages_link_forward_and_back() {
    let first = PageWindow::resolve(None, 100, 250).unwrap();
    let page: ApiPage<i32> = ApiPage::new(vec![], first, "http://testserver/api/orders/", &[]);
    assert_eq!(page.count, 250);
    assert_eq!(page.next.as_deref(), Some("http://testserver/api/orders/?page=2"));
    assert_eq!(page.previous, None);

    let second = PageWindow::resolve(Some("2"), 100, 250).unwrap();
    let page: ApiPage<i32> = ApiPage::new(vec![], second, "http://testserver/api/orders/", &[]);
    assert_eq!(page.previous.as_deref(), Some("http://testserver/api/orders/"));

    let last = PageWindow::resolve(Some("last"), 100, 250).unwrap();
    assert_eq!(last.number, 3);
    assert_eq!(last.offset(), 200);
    assert!(!last.has_next());
}

#[test]
fn listing_pages_out_of_range_are_rejected() {
    assert!(PageWindow::resolve(Some("4"), 100, 250).is_err());
    assert!(PageWindow::resolve(Some("0"), 5, 1).is_err());
    assert!(PageWindow::resolve(None, 25, 0).is_ok());
}
