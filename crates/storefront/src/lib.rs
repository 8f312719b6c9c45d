//! ebookstore storefront library.
//!
//! This crate provides the public bookstore site as a library so the
//! back office, the CLI and the integration tests can reuse its
//! repositories, services and chat relay.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
