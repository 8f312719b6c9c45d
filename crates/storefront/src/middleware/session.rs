//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` (`tower_sessions.session`) and carry the
//! signed-in user and the visitor's basket id. The session id cookie is
//! signed with a key derived from the site's session secret, so a tampered
//! id is dropped before the store is queried.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ebookstore_session";

/// Session expiry time in seconds (14 days of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 14 * 24 * 60 * 60;

/// Derive the cookie signing key from a session secret.
///
/// SHA-512 yields the 64 bytes `Key` needs from a secret of any length.
#[must_use]
pub fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `cookie_name` - Cookie name, distinct per site sharing a domain
/// * `secret` - Session secret the cookie is signed with
/// * `secure` - Send the cookie over HTTPS only
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    cookie_name: &'static str,
    secret: &SecretString,
    secure: bool,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // The sessions table is created by migration, not by the store
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(cookie_name)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(secret))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::cookie::{Cookie, CookieJar};

    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn same_secret_derives_same_key() {
        let a = signing_key(&secret("k7Qm2vX9pL4rT8wZ1nB6cF3hJ5dS0gY"));
        let b = signing_key(&secret("k7Qm2vX9pL4rT8wZ1nB6cF3hJ5dS0gY"));
        let other = signing_key(&secret("Zq8Wn3Lr6Tb1Yx4Pc9Vm2Hs7Jd5Kf0G"));
        assert_eq!(a.signing(), b.signing());
        assert_ne!(a.signing(), other.signing());
    }

    #[test]
    fn cookie_signed_with_another_secret_is_rejected() {
        let ours = signing_key(&secret("k7Qm2vX9pL4rT8wZ1nB6cF3hJ5dS0gY"));
        let theirs = signing_key(&secret("Zq8Wn3Lr6Tb1Yx4Pc9Vm2Hs7Jd5Kf0G"));

        let mut outgoing = CookieJar::new();
        outgoing
            .signed_mut(&ours)
            .add(Cookie::new(SESSION_COOKIE_NAME, "session-id"));
        let sent = outgoing.get(SESSION_COOKIE_NAME).unwrap().clone();
        assert_ne!(sent.value(), "session-id");

        let mut incoming = CookieJar::new();
        incoming.add_original(sent);
        assert_eq!(
            incoming.signed(&ours).get(SESSION_COOKIE_NAME).unwrap().value(),
            "session-id"
        );
        assert!(incoming.signed(&theirs).get(SESSION_COOKIE_NAME).is_none());
    }
}
