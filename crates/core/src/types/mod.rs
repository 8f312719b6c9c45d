//! Core types for the ebookstore.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod county;
pub mod email;
pub mod id;
pub mod price;
pub mod slug;
pub mod status;

pub use county::{County, CountyError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use slug::{Slug, SlugError};
pub use status::*;
