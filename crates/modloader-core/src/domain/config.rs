//! Loader configuration.
//!
//! Field names follow the JSON configuration object (`basePath`,
//! `waitTimeout`, ...). `maps` and `paths` keep their declaration order, which
//! decides which rule wins when several match.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::module::ModuleOptions;
use crate::error::ConfigError;

/// Timeout applied to a `require` when the configuration does not set one.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 7000;

/// Transform applied to names that no explicit rule matched (the `*` map).
pub type WildcardMap = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Name-remapping rules.
#[derive(Clone, Default)]
pub struct ModuleMaps {
    rules: Vec<(String, String)>,
    wildcard: Option<WildcardMap>,
}

impl ModuleMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rules.push((from.into(), to.into()));
        self
    }

    pub fn with_wildcard<F>(mut self, wildcard: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.wildcard = Some(Arc::new(wildcard));
        self
    }

    pub fn rules(&self) -> &[(String, String)] {
        &self.rules
    }

    pub fn wildcard(&self) -> Option<&WildcardMap> {
        self.wildcard.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.wildcard.is_none()
    }
}

impl fmt::Debug for ModuleMaps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleMaps")
            .field("rules", &self.rules)
            .field("wildcard", &self.wildcard.as_ref().map(|_| ".."))
            .finish()
    }
}

impl<'de> Deserialize<'de> for ModuleMaps {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rules = ordered_pairs(deserializer)?;
        Ok(Self {
            rules,
            wildcard: None,
        })
    }
}

/// Global loader configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Prefix for relative module paths. Normalized to end with `/` when used.
    #[serde(default)]
    pub base_path: String,

    /// Prefix for every generated request URL.
    #[serde(default)]
    pub url: String,

    /// Group relative modules into combined requests.
    #[serde(default)]
    pub combine: bool,

    /// Milliseconds before a `require` fails. `0` disables the timeout.
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout: u64,

    #[serde(default)]
    pub maps: ModuleMaps,

    /// Path aliases: prefix -> replacement.
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub paths: Vec<(String, String)>,

    /// Registry seed.
    #[serde(default, deserialize_with = "module_seed")]
    pub modules: Vec<ModuleOptions>,
}

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            url: String::new(),
            combine: false,
            wait_timeout: DEFAULT_WAIT_TIMEOUT_MS,
            maps: ModuleMaps::default(),
            paths: Vec::new(),
            modules: Vec::new(),
        }
    }
}

impl LoaderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// `None` when the timeout is disabled.
    pub fn wait_timeout(&self) -> Option<Duration> {
        (self.wait_timeout > 0).then(|| Duration::from_millis(self.wait_timeout))
    }

    /// `base_path` with the trailing slash applied.
    pub fn normalized_base_path(&self) -> String {
        if self.base_path.is_empty() || self.base_path.ends_with('/') {
            self.base_path.clone()
        } else {
            format!("{}/", self.base_path)
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_combine(mut self, combine: bool) -> Self {
        self.combine = combine;
        self
    }

    pub fn with_wait_timeout(mut self, millis: u64) -> Self {
        self.wait_timeout = millis;
        self
    }

    pub fn with_maps(mut self, maps: ModuleMaps) -> Self {
        self.maps = maps;
        self
    }

    pub fn with_path_alias(mut self, prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.paths.push((prefix.into(), replacement.into()));
        self
    }

    pub fn with_module(mut self, module: ModuleOptions) -> Self {
        self.modules.push(module);
        self
    }
}

fn ordered_pairs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, String)>, D::Error> {
    let entries = Map::<String, Value>::deserialize(deserializer)?;
    entries
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(target) => Ok((key, target)),
            other => Err(D::Error::custom(format!(
                "expected a string for '{key}', found {other}"
            ))),
        })
        .collect()
}

fn module_seed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ModuleOptions>, D::Error> {
    let entries = Map::<String, Value>::deserialize(deserializer)?;
    entries
        .into_iter()
        .map(|(name, value)| {
            let mut options = ModuleOptions::deserialize(value)
                .map_err(|e| D::Error::custom(format!("module '{name}': {e}")))?;
            options.name = name;
            Ok(options)
        })
        .collect()
}
