//! ebookstore core - shared domain types.
//!
//! This crate provides the types used across all ebookstore components:
//! - `storefront` - Public shop, basket, checkout and customer-service chat
//! - `admin` - Back office for owners, central office and dispatch
//! - `cli` - Command-line tools for migrations, users and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. The `postgres` feature adds `sqlx` encode/decode impls.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, slugs, counties and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
