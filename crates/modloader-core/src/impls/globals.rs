//! GlobalScope implementations.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::ports::GlobalScope;

/// Scope with no globals at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGlobals;

impl GlobalScope for NoGlobals {
    fn lookup_global(&self, _key: &str) -> Option<Value> {
        None
    }
}

/// Writable global namespace, used where legacy resources assign globals.
#[derive(Debug, Default)]
pub struct InMemoryGlobals {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryGlobals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.values.write().insert(key.into(), value);
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.values.write().remove(key)
    }
}

impl GlobalScope for InMemoryGlobals {
    fn lookup_global(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }
}
