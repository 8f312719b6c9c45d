//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password registration and sign-in
//! - `basket` - Session basket, login merge and checkout
//! - `contact` - Contact form validation and delivery
//! - `images` - Book image storage and thumbnails

pub mod auth;
pub mod basket;
pub mod contact;
pub mod images;
