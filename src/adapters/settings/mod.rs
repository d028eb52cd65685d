//! Settings adapters - the in-memory store and the TTL read-through cache.

mod cached;
mod in_memory;

pub use cached::CachedSettings;
pub use in_memory::InMemorySettingsStore;
