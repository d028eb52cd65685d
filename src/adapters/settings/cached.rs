//! TTL read-through cache over the provider settings store.
//!
//! The settings record is read on every generation call, so reads go
//! through a short-lived cache. A stale read for one call is acceptable;
//! refresh never blocks writers, and admin writes invalidate the cache
//! explicitly via [`CachedSettings::update`]. When a refresh fails but a
//! previous value exists, the previous value is served.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::ports::{ProviderSettings, ProviderSettingsStore, SettingsError};

/// Read-through settings cache with a bounded TTL.
pub struct CachedSettings {
    store: Arc<dyn ProviderSettingsStore>,
    ttl: Duration,
    cached: RwLock<Option<(ProviderSettings, Instant)>>,
}

impl CachedSettings {
    /// Creates a cache over the given store.
    pub fn new(store: Arc<dyn ProviderSettingsStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Returns the current settings, serving the cached value while fresh.
    pub async fn get(&self) -> Result<ProviderSettings, SettingsError> {
        if let Some((settings, loaded_at)) = *self.cached.read().await {
            if loaded_at.elapsed() < self.ttl {
                return Ok(settings);
            }
        }

        match self.store.load().await {
            Ok(settings) => {
                *self.cached.write().await = Some((settings, Instant::now()));
                Ok(settings)
            }
            Err(err) => {
                // Serve the last known value through store outages
                if let Some((settings, _)) = *self.cached.read().await {
                    tracing::warn!(error = %err, "settings refresh failed, serving stale value");
                    return Ok(settings);
                }
                Err(err)
            }
        }
    }

    /// Writes new settings and refreshes the cache immediately so the
    /// admin sees their own write.
    pub async fn update(&self, settings: ProviderSettings) -> Result<(), SettingsError> {
        self.store.save(settings).await?;
        *self.cached.write().await = Some((settings, Instant::now()));
        Ok(())
    }

    /// Drops the cached value; the next read hits the store.
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}
