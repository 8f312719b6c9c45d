//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::chat::{ChatHub, MemoryPresence, PresenceStore};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    chat_hub: ChatHub,
    presence: Arc<dyn PresenceStore>,
}

impl AppState {
    /// Create a new application state with an in-process presence store.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        Self::with_presence(config, pool, Arc::new(MemoryPresence::default()))
    }

    /// Create a new application state with the given presence store.
    #[must_use]
    pub fn with_presence(
        config: StorefrontConfig,
        pool: PgPool,
        presence: Arc<dyn PresenceStore>,
    ) -> Self {
        let chat_hub = ChatHub::new(config.chat.channel_capacity);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                chat_hub,
                presence,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Chat groups of open customer-service connections.
    #[must_use]
    pub fn chat_hub(&self) -> &ChatHub {
        &self.inner.chat_hub
    }

    /// Heartbeat presence flags.
    #[must_use]
    pub fn presence(&self) -> &dyn PresenceStore {
        self.inner.presence.as_ref()
    }
}
