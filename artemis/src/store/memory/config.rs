use std::sync::Arc;
use std::time::Duration;

/// Configuration of a [MemoryStore](crate::store::MemoryStore).
///
/// Cheap to clone; clones share the same settings.
#[derive(Default, Clone)]
pub struct MemoryStoreConfig {
    inner: Arc<MemoryStoreConfigInner>,
}

impl MemoryStoreConfig {
    pub fn new() -> MemoryStoreConfig {
        MemoryStoreConfig::default()
    }

    /// Time to live applied to records saved without one.
    pub fn with_default_ttl(default_ttl: Duration) -> MemoryStoreConfig {
        MemoryStoreConfig {
            inner: Arc::new(MemoryStoreConfigInner {
                default_ttl: Some(default_ttl),
            }),
        }
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.inner.default_ttl
    }
}

#[derive(Default)]
struct MemoryStoreConfigInner {
    default_ttl: Option<Duration>,
}
