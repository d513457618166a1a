//! Module implementation values.
//!
//! Implementations are dynamic values (`serde_json::Value`). `Value::Null`
//! stands for an explicitly undefined implementation.

use serde_json::{Map, Value};

/// Key under which a `module` carrier exposes its exports.
pub const EXPORTS_KEY: &str = "exports";

/// Truthiness used when choosing between a factory result and its carrier.
///
/// `null`, `false`, `0`, `NaN` and `""` are falsy; arrays and objects are
/// always truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Fresh value handed to a factory for the reserved `exports` dependency.
pub fn exports_carrier() -> Value {
    Value::Object(Map::new())
}

/// Fresh value handed to a factory for the reserved `module` dependency.
pub fn module_carrier() -> Value {
    let mut carrier = Map::new();
    carrier.insert(EXPORTS_KEY.to_string(), exports_carrier());
    Value::Object(carrier)
}

/// Implementation derived from a carrier after the factory ran.
///
/// A truthy `exports` field wins (the `module` carrier case); otherwise the
/// carrier itself is the implementation (the `exports` carrier case).
pub fn carrier_implementation(carrier: Value) -> Value {
    match carrier {
        Value::Object(mut fields) => match fields.get(EXPORTS_KEY) {
            Some(exports) if is_truthy(exports) => fields.remove(EXPORTS_KEY).unwrap_or_default(),
            _ => Value::Object(fields),
        },
        other => other,
    }
}
