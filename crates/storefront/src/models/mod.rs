//! Domain models for the storefront.

pub mod address;
pub mod basket;
pub mod book;
pub mod order;
pub mod pagination;
pub mod session;
pub mod user;

pub use address::{Address, AddressForm, AddressInput};
pub use basket::{Basket, BasketContents, BasketError, BasketLine, LineUpdate};
pub use book::{ALL_TAGS, Book, BookChanges, BookDetail, BookImage, BookTag};
pub use order::{AddressSnapshot, Order, OrderDetail, OrderFilter, OrderLine, OrderLineFilter};
pub use pagination::{ApiPage, InvalidPage, PageWindow};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
