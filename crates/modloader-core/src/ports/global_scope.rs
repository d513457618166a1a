//! GlobalScope port - legacy modules publish a global value instead of
//! calling `define`.

use serde_json::Value;

pub trait GlobalScope: Send + Sync {
    fn lookup_global(&self, key: &str) -> Option<Value>;
}
