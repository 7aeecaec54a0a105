use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use driftwatch_cache::{CacheHandle, InMemoryStateCache};
use driftwatch_core::traits::{ILogSink, IStateCache};

use crate::measurables::MeasurableRegistry;

/// Shared collaborators handed to every monitor at construction.
#[derive(Clone)]
pub struct MonitorContext {
    pub sink: Arc<dyn ILogSink>,
    pub cache: Arc<dyn IStateCache>,
    /// Base directory for relative reference dataset paths.
    pub data_dir: PathBuf,
    pub registry: MeasurableRegistry,
}

impl MonitorContext {
    pub fn new(sink: Arc<dyn ILogSink>, cache: Arc<dyn IStateCache>) -> Self {
        Self {
            sink,
            cache,
            data_dir: PathBuf::from("."),
            registry: MeasurableRegistry::new(),
        }
    }

    /// A context over a fresh in-memory state cache.
    pub fn in_memory(sink: Arc<dyn ILogSink>) -> Self {
        Self::new(sink, Arc::new(InMemoryStateCache::new()))
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_registry(mut self, registry: MeasurableRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Absolute paths pass through, relative ones resolve against `data_dir`.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    /// A cache handle bound to `namespace`.
    pub fn cache_handle(&self, namespace: &str) -> CacheHandle {
        CacheHandle::new(Arc::clone(&self.cache), namespace)
    }
}

impl fmt::Debug for MonitorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorContext")
            .field("data_dir", &self.data_dir)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
