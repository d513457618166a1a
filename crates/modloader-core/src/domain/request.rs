//! Call descriptors crossing the loader boundary.
//!
//! `define` and `require` accept several call shapes. Each shape is turned
//! into one of these descriptors once, at the boundary, so the pipeline never
//! inspects argument types.

use serde::Serialize;
use serde_json::Value;

use super::module::{ModuleOptions, PendingImplementation, EXPORTS, MODULE};
use crate::error::RequireFailure;

/// Arguments of one `define` call.
///
/// Anonymous definitions (no name) and definitions without a body are
/// ignored by the loader.
#[derive(Debug, Clone, Default)]
pub struct ModuleDefinition {
    pub name: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub implementation: Option<PendingImplementation>,
    pub options: ModuleOptions,
}

/// A definition that passed normalization.
#[derive(Debug, Clone)]
pub struct NormalizedDefinition {
    pub name: String,
    pub dependencies: Vec<String>,
    pub implementation: PendingImplementation,
    pub options: ModuleOptions,
}

impl ModuleDefinition {
    /// `define(name, dependencies, implementation)`
    pub fn new<I, S>(
        name: impl Into<String>,
        dependencies: I,
        implementation: impl Into<PendingImplementation>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            dependencies: Some(dependencies.into_iter().map(Into::into).collect()),
            implementation: Some(implementation.into()),
            options: ModuleOptions::default(),
        }
    }

    /// `define(name, implementation)`: dependencies default to `[module, exports]`.
    pub fn named(name: impl Into<String>, implementation: impl Into<PendingImplementation>) -> Self {
        Self {
            name: Some(name.into()),
            dependencies: None,
            implementation: Some(implementation.into()),
            options: ModuleOptions::default(),
        }
    }

    /// `define(dependencies, implementation)` without a name.
    pub fn anonymous<I, S>(dependencies: I, implementation: impl Into<PendingImplementation>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            dependencies: Some(dependencies.into_iter().map(Into::into).collect()),
            implementation: Some(implementation.into()),
            options: ModuleOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ModuleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn normalize(self) -> Option<NormalizedDefinition> {
        let name = self.name?;
        let implementation = self.implementation?;
        let dependencies = self
            .dependencies
            .unwrap_or_else(|| vec![MODULE.to_string(), EXPORTS.to_string()]);
        Some(NormalizedDefinition {
            name,
            dependencies,
            implementation,
            options: self.options,
        })
    }
}

/// Callback receiving the implementations of the requested modules, in order.
pub type SuccessCallback = Box<dyn FnOnce(Vec<Value>) + Send>;

/// Callback receiving the failure report.
pub type FailureCallback = Box<dyn FnOnce(RequireFailure) + Send>;

/// One positional argument of the variadic `require` form.
pub enum RequireArg {
    Name(String),
    Names(Vec<String>),
    Callback(SuccessCallback),
    Errback(FailureCallback),
}

/// Arguments of one `require` call.
#[derive(Default)]
pub struct RequireRequest {
    modules: Vec<String>,
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

impl RequireRequest {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            on_success: None,
            on_failure: None,
        }
    }

    /// Builds a request from the variadic form: module names (single or
    /// grouped) followed by an optional success callback and an optional
    /// failure callback.
    pub fn from_args(args: impl IntoIterator<Item = RequireArg>) -> Self {
        let mut request = Self::default();
        for arg in args {
            match arg {
                RequireArg::Name(name) => request.modules.push(name),
                RequireArg::Names(names) => request.modules.extend(names),
                RequireArg::Callback(callback) if request.on_success.is_none() => {
                    request.on_success = Some(callback);
                }
                RequireArg::Callback(_) => {}
                RequireArg::Errback(errback) if request.on_failure.is_none() => {
                    request.on_failure = Some(errback);
                }
                RequireArg::Errback(_) => {}
            }
        }
        request
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Vec<Value>) + Send + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(RequireFailure) + Send + 'static,
    {
        self.on_failure = Some(Box::new(callback));
        self
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Option<SuccessCallback>, Option<FailureCallback>) {
        (self.modules, self.on_success, self.on_failure)
    }
}

impl From<&str> for RequireRequest {
    fn from(name: &str) -> Self {
        Self::new([name])
    }
}

impl From<Vec<String>> for RequireRequest {
    fn from(modules: Vec<String>) -> Self {
        Self::new(modules)
    }
}

impl<const N: usize> From<[&str; N]> for RequireRequest {
    fn from(modules: [&str; N]) -> Self {
        Self::new(modules)
    }
}

/// One network request produced by the URL builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRequest {
    pub modules: Vec<String>,
    pub url: String,
}

impl ModuleRequest {
    pub fn new(modules: Vec<String>, url: impl Into<String>) -> Self {
        Self {
            modules,
            url: url.into(),
        }
    }
}
