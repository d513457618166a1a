//! Module records held by the registry.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use super::state::ModuleState;
use super::value::is_truthy;

/// Reserved dependency name: receives a fresh exports carrier.
pub const EXPORTS: &str = "exports";

/// Reserved dependency name: receives a fresh `{ exports: {} }` carrier.
pub const MODULE: &str = "module";

/// Reserved names are never resolved, fetched or waited for.
pub fn is_reserved(name: &str) -> bool {
    name == EXPORTS || name == MODULE
}

/// Factory invoked with the positional implementations of a module's dependencies.
///
/// Carriers for `exports` / `module` are passed by mutable reference so the
/// factory can populate them instead of returning a value.
pub type Factory = Arc<dyn Fn(&mut [Value]) -> Value + Send + Sync>;

/// What a definition supplied as the module body.
#[derive(Clone)]
pub enum PendingImplementation {
    Factory(Factory),
    Value(Value),
}

impl PendingImplementation {
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn(&mut [Value]) -> Value + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }

    pub fn value(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Value> for PendingImplementation {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Debug for PendingImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Test deciding whether a conditional module joins a resolution.
#[derive(Clone)]
pub enum ConditionTest {
    Predicate(Arc<dyn Fn() -> bool + Send + Sync>),
    /// Legacy textual form coming from configuration files.
    ///
    /// Only literal sources (`true`, `1`, `"x"`, ...) are understood; they are
    /// combined with a `false` baseline. Anything else evaluates to `false`.
    Expression(String),
}

impl ConditionTest {
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    pub fn evaluate(&self) -> bool {
        match self {
            Self::Predicate(predicate) => predicate(),
            Self::Expression(source) => match serde_json::from_str::<Value>(source.trim()) {
                Ok(literal) => is_truthy(&literal),
                Err(_) => {
                    warn!(%source, "unsupported condition expression, treating as false");
                    false
                }
            },
        }
    }
}

impl fmt::Debug for ConditionTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Expression(source) => f.debug_tuple("Expression").field(source).finish(),
        }
    }
}

impl<'de> Deserialize<'de> for ConditionTest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Expression)
    }
}

/// Conditional inclusion: the module joins any resolution that visits `trigger`
/// when `test` passes.
#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub trigger: String,
    pub test: ConditionTest,
}

impl Condition {
    pub fn new(trigger: impl Into<String>, test: ConditionTest) -> Self {
        Self {
            trigger: trigger.into(),
            test,
        }
    }
}

/// Partial module description merged into the registry by `add_module`.
///
/// Only the fields that are `Some` overwrite the stored module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOptions {
    #[serde(default)]
    pub name: String,
    pub dependencies: Option<Vec<String>>,
    pub path: Option<String>,
    pub full_path: Option<String>,
    pub exports: Option<String>,
    pub condition: Option<Condition>,
    #[serde(skip)]
    pub pending_implementation: Option<PendingImplementation>,
}

impl ModuleOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Registry entry for a module that is referenced but not described yet.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::named(name).with_dependencies(Vec::<String>::new())
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = Some(dependencies.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_full_path(mut self, full_path: impl Into<String>) -> Self {
        self.full_path = Some(full_path.into());
        self
    }

    pub fn with_exports(mut self, exports: impl Into<String>) -> Self {
        self.exports = Some(exports.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_implementation(mut self, implementation: PendingImplementation) -> Self {
        self.pending_implementation = Some(implementation);
        self
    }
}

/// A registry entry.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    /// Absolute names; may contain `exports` / `module`.
    pub dependencies: Vec<String>,
    pub path: Option<String>,
    pub full_path: Option<String>,
    /// Global key of a legacy module that has no factory.
    pub exports: Option<String>,
    pub condition: Option<Condition>,
    pub pending_implementation: Option<PendingImplementation>,
    /// Set at most once. `Some(Value::Null)` is an explicitly undefined implementation.
    pub implementation: Option<Value>,
    /// A fetch was initiated for this module. Never reset.
    pub requested: bool,
}

impl Module {
    pub fn from_options(options: ModuleOptions) -> Self {
        let mut module = Self {
            name: options.name.clone(),
            ..Self::default()
        };
        module.merge(options);
        module
    }

    /// Shallow merge: every supplied field replaces the stored one.
    pub fn merge(&mut self, options: ModuleOptions) {
        let ModuleOptions {
            name: _,
            dependencies,
            path,
            full_path,
            exports,
            condition,
            pending_implementation,
        } = options;

        if let Some(dependencies) = dependencies {
            self.dependencies = dependencies;
        }
        if path.is_some() {
            self.path = path;
        }
        if full_path.is_some() {
            self.full_path = full_path;
        }
        if exports.is_some() {
            self.exports = exports;
        }
        if condition.is_some() {
            self.condition = condition;
        }
        if pending_implementation.is_some() {
            self.pending_implementation = pending_implementation;
        }
    }

    pub fn is_implemented(&self) -> bool {
        self.implementation.is_some()
    }

    /// Lifecycle position derived from the stored fields.
    pub fn state(&self) -> ModuleState {
        if self.implementation.is_some() {
            ModuleState::Implemented
        } else if self.pending_implementation.is_some() {
            ModuleState::Delivered
        } else if self.requested {
            ModuleState::Requested
        } else if self.exports.is_some() || self.path.is_some() || self.full_path.is_some() {
            ModuleState::Defined
        } else {
            ModuleState::Referenced
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_only_overwrites_supplied_fields() {
        let mut module = Module::from_options(
            ModuleOptions::named("a")
                .with_dependencies(["b"])
                .with_path("lib/a.js"),
        );

        module.merge(ModuleOptions::named("a").with_exports("A"));

        assert_eq!(module.dependencies, vec!["b".to_string()]);
        assert_eq!(module.path.as_deref(), Some("lib/a.js"));
        assert_eq!(module.exports.as_deref(), Some("A"));
    }

    #[test]
    fn state_follows_the_lifecycle() {
        let mut module = Module::from_options(ModuleOptions::placeholder("a"));
        assert_eq!(module.state(), ModuleState::Referenced);

        module.requested = true;
        assert_eq!(module.state(), ModuleState::Requested);

        module.pending_implementation = Some(json!(1).into());
        assert_eq!(module.state(), ModuleState::Delivered);

        module.implementation = Some(json!(1));
        assert_eq!(module.state(), ModuleState::Implemented);
    }

    #[test]
    fn predicate_condition_is_called() {
        let test = ConditionTest::predicate(|| true);
        assert!(test.evaluate());
    }

    #[test]
    fn expression_condition_understands_literals_only() {
        assert!(ConditionTest::Expression("true".into()).evaluate());
        assert!(!ConditionTest::Expression("false".into()).evaluate());
        assert!(!ConditionTest::Expression("function () { return true; }".into()).evaluate());
    }

    #[test]
    fn options_deserialize_from_config_shape() {
        let options: ModuleOptions = serde_json::from_str(
            r#"{
                "dependencies": ["b"],
                "fullPath": "http://cdn/a.js",
                "condition": { "trigger": "b", "test": "true" }
            }"#,
        )
        .expect("deserialize");

        assert_eq!(options.full_path.as_deref(), Some("http://cdn/a.js"));
        let condition = options.condition.expect("condition");
        assert_eq!(condition.trigger, "b");
        assert!(condition.test.evaluate());
    }
}
