//! In-memory provider settings store.
//!
//! Holds the single active settings record behind an async RwLock. The
//! production deployment backs this port with the managed data store; the
//! orchestration core only ever sees the port.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{ProviderSettings, ProviderSettingsStore, SettingsError};

/// In-memory settings store holding exactly one record.
pub struct InMemorySettingsStore {
    record: RwLock<ProviderSettings>,
    fail_loads: RwLock<bool>,
}

impl InMemorySettingsStore {
    /// Creates a store seeded with the given settings.
    pub fn new(initial: ProviderSettings) -> Self {
        Self {
            record: RwLock::new(initial),
            fail_loads: RwLock::new(false),
        }
    }

    /// Makes subsequent loads fail, for resilience testing.
    pub async fn set_fail_loads(&self, fail: bool) {
        *self.fail_loads.write().await = fail;
    }
}

#[async_trait]
impl ProviderSettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<ProviderSettings, SettingsError> {
        if *self.fail_loads.read().await {
            return Err(SettingsError::storage("simulated load failure"));
        }
        Ok(*self.record.read().await)
    }

    async fn save(&self, settings: ProviderSettings) -> Result<(), SettingsError> {
        *self.record.write().await = settings;
        Ok(())
    }
}
