//! ebookstore back office library.
//!
//! Three sites share one binary, each behind its own role check:
//!
//! - `/owners/` - shop owners (active superusers), every field editable
//! - `/central-office/` - employees, no renaming of books
//! - `/dispatch/` - dispatchers, paid orders and stock flags only
//!
//! Repositories and the password service come from the storefront crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod site;
pub mod state;
