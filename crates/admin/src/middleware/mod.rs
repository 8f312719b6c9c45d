//! HTTP middleware for the back office.
//!
//! Request ids, security headers and rate limiting come from the storefront
//! crate. This module adds the back office's own session cookie and the
//! per-site access guard.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing with status and latency)
//! 3. Request ID
//! 4. Session layer (`SameSite=Strict`, 24 hour expiry)
//! 5. Security headers
//! 6. Rate limiting on the login form

pub mod auth;
pub mod session;

pub use auth::{SiteRejection, SiteStaff, StaffUser};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
