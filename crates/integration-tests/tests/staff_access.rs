//! Who may do what: chat roles on the storefront and site access in the
//! back office, checked against the same accounts.

#![allow(clippy::unwrap_used)]

use ebookstore_admin::site::Site;
use ebookstore_core::{OrderStatus, StaffGroup, UserId};
use ebookstore_integration_tests::{customer, order, user};
use ebookstore_storefront::chat::{ChatRole, role_for};

#[test]
fn order_owner_chats_as_client_and_has_no_back_office() {
    let wanjiku = customer(10, "wanjiku@example.com");
    let mine = order(1, wanjiku.id, OrderStatus::New);
    let theirs = order(2, UserId::new(11), OrderStatus::New);

    assert_eq!(role_for(&wanjiku, &mine), Some(ChatRole::Client));
    assert_eq!(role_for(&wanjiku, &theirs), None);
    assert!(Site::available_to(&wanjiku).is_empty());
}

#[test]
fn employee_chats_on_any_order_and_works_in_central_office() {
    let otieno = user(20, "otieno@ebookstore.co.ke", true, false, &[StaffGroup::Employees]);
    let any = order(3, UserId::new(10), OrderStatus::Paid);

    assert_eq!(role_for(&otieno, &any), Some(ChatRole::Employee));
    assert_eq!(Site::available_to(&otieno), vec![Site::CentralOffice]);
}

#[test]
fn employee_role_wins_on_their_own_order() {
    let otieno = user(20, "otieno@ebookstore.co.ke", true, false, &[StaffGroup::Employees]);
    let own = order(4, otieno.id, OrderStatus::New);
    assert_eq!(role_for(&otieno, &own), Some(ChatRole::Employee));
}

#[test]
fn dispatcher_cannot_chat_as_staff() {
    let baraka = user(30, "baraka@ebookstore.co.ke", true, false, &[StaffGroup::Dispatchers]);
    let other = order(5, UserId::new(10), OrderStatus::Paid);

    assert_eq!(role_for(&baraka, &other), None);
    assert_eq!(Site::available_to(&baraka), vec![Site::Dispatch]);
    assert_eq!(Site::Dispatch.order_scope(), Some(OrderStatus::Paid));
}

#[test]
fn group_without_staff_flag_grants_nothing() {
    let lapsed = user(40, "lapsed@ebookstore.co.ke", false, false, &[StaffGroup::Employees]);
    let other = order(6, UserId::new(10), OrderStatus::New);

    assert_eq!(role_for(&lapsed, &other), None);
    assert!(Site::available_to(&lapsed).is_empty());
}

#[test]
fn deactivated_owner_loses_every_site() {
    let mut owner = user(50, "owner@ebookstore.co.ke", true, true, &[]);
    assert_eq!(Site::available_to(&owner), Site::ALL.to_vec());

    owner.is_active = false;
    assert!(Site::available_to(&owner).is_empty());
    assert_eq!(role_for(&owner, &order(7, UserId::new(10), OrderStatus::New)), None);
}

#[test]
fn editable_book_fields_narrow_from_owners_to_dispatch() {
    let owners = Site::Owners.book_fields();
    let office = Site::CentralOffice.book_fields();
    let dispatch = Site::Dispatch.book_fields();

    assert!(owners.name && owners.slug && owners.price && owners.in_stock);
    assert!(!office.name && !office.slug && office.price && office.in_stock);
    assert!(!dispatch.price && !dispatch.active && dispatch.in_stock);
}
