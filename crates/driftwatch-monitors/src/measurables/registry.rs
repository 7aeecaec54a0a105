use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use driftwatch_core::traits::IMeasurable;

/// Caller-registered measurables, referenced from config as `custom { name }`.
#[derive(Clone, Default)]
pub struct MeasurableRegistry {
    entries: HashMap<String, Arc<dyn IMeasurable>>,
}

impl MeasurableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `measurable` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, measurable: Arc<dyn IMeasurable>) {
        self.entries.insert(name.into(), measurable);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn IMeasurable>> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MeasurableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("MeasurableRegistry")
            .field("names", &names)
            .finish()
    }
}
