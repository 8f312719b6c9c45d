//! Short-lived liveness flags written by chat heartbeats.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

/// Key-value store of liveness flags with per-key expiry.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Mark `key` alive for `ttl`, replacing any earlier expiry.
    async fn mark_alive(&self, key: &str, ttl: Duration);

    /// Whether `key` was marked alive and has not expired.
    async fn is_alive(&self, key: &str) -> bool;
}

/// Expires each entry after the TTL stored as its value.
struct TtlExpiry;

impl Expiry<String, Duration> for TtlExpiry {
    fn expire_after_create(&self, _key: &String, ttl: &Duration, _created_at: Instant) -> Option<Duration> {
        Some(*ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        ttl: &Duration,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(*ttl)
    }
}

/// In-process presence store backed by `moka`.
#[derive(Clone)]
pub struct MemoryPresence {
    cache: Cache<String, Duration>,
}

impl MemoryPresence {
    /// Create a store holding at most `max_entries` flags.
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(TtlExpiry)
            .build();
        Self { cache }
    }
}

impl Default for MemoryPresence {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl PresenceStore for MemoryPresence {
    async fn mark_alive(&self, key: &str, ttl: Duration) {
        self.cache.insert(key.to_string(), ttl).await;
    }

    async fn is_alive(&self, key: &str) -> bool {
        self.cache.get(key).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_key_is_not_alive() {
        let presence = MemoryPresence::default();
        assert!(!presence.is_alive("customer-service_1_a@example.com").await);
    }

    #[tokio::test]
    async fn marked_key_is_alive_until_ttl_passes() {
        let presence = MemoryPresence::default();
        let key = "customer-service_4_staff@example.com";

        presence.mark_alive(key, Duration::from_millis(150)).await;
        assert!(presence.is_alive(key).await);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!presence.is_alive(key).await);
    }

    #[tokio::test]
    async fn heartbeat_extends_expiry() {
        let presence = MemoryPresence::default();
        let key = "customer-service_5_staff@example.com";

        presence.mark_alive(key, Duration::from_millis(300)).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        presence.mark_alive(key, Duration::from_millis(300)).await;
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(presence.is_alive(key).await);
    }
}
