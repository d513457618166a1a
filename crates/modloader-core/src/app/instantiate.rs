//! Turning delivered definitions into implementations.

use serde_json::Value;
use tracing::debug;

use super::loader::Loader;
use crate::domain::value::{EXPORTS_KEY, carrier_implementation, exports_carrier, module_carrier};
use crate::domain::{EXPORTS, MODULE, PendingImplementation, is_truthy};
use crate::registry::ConfigParser;

/// What instantiating one module requires, captured under the registry lock.
enum Plan {
    Skip,
    Global(String),
    Evaluate {
        body: PendingImplementation,
        arguments: Vec<Value>,
        carriers: Carriers,
    },
}

/// Argument positions of the `module` / `exports` carriers.
#[derive(Debug, Default, Clone, Copy)]
struct Carriers {
    module: Option<usize>,
    exports: Option<usize>,
}

impl Carriers {
    /// Implementation taken from the carriers after the factory returned a
    /// falsy value.
    ///
    /// A `module` carrier whose `exports` was replaced wins; otherwise the
    /// `exports` carrier; otherwise the untouched `module` carrier.
    fn take_implementation(self, arguments: &mut [Value]) -> Option<Value> {
        if let Some(index) = self.module
            && arguments[index].get(EXPORTS_KEY) != Some(&exports_carrier())
        {
            return Some(carrier_implementation(std::mem::take(&mut arguments[index])));
        }
        self.exports
            .or(self.module)
            .map(|index| carrier_implementation(std::mem::take(&mut arguments[index])))
    }
}

impl Loader {
    /// Instantiates `names` in order. Modules that already have an
    /// implementation, or have no definition yet, are left alone.
    pub(crate) fn set_module_implementations(&self, names: &[String]) {
        let _pass = self.inner.instantiation.lock();
        for name in names {
            self.instantiate(name);
        }
    }

    fn instantiate(&self, name: &str) {
        let plan = plan_for(&self.inner.registry.lock(), name);

        let implementation = match plan {
            Plan::Skip => return,
            Plan::Global(key) => {
                let value = self.inner.globals.lookup_global(&key).unwrap_or(Value::Null);
                let mut registry = self.inner.registry.lock();
                if let Some(module) = registry.module_mut(name)
                    && module.implementation.is_none()
                {
                    module.pending_implementation = Some(PendingImplementation::Value(value.clone()));
                    module.implementation = Some(value);
                }
                return;
            }
            Plan::Evaluate {
                body,
                mut arguments,
                carriers,
            } => {
                let result = match body {
                    PendingImplementation::Factory(factory) => factory(arguments.as_mut_slice()),
                    PendingImplementation::Value(value) => value,
                };
                if is_truthy(&result) {
                    result
                } else {
                    carriers
                        .take_implementation(&mut arguments)
                        .unwrap_or(Value::Null)
                }
            }
        };

        debug!(module = %name, "module implemented");
        let mut registry = self.inner.registry.lock();
        if let Some(module) = registry.module_mut(name)
            && module.implementation.is_none()
        {
            module.implementation = Some(implementation);
        }
    }
}

fn plan_for(registry: &ConfigParser, name: &str) -> Plan {
    let Some(module) = registry.module(name) else {
        return Plan::Skip;
    };
    if module.is_implemented() {
        return Plan::Skip;
    }
    if let Some(key) = &module.exports {
        return Plan::Global(key.clone());
    }
    let Some(body) = module.pending_implementation.clone() else {
        debug!(module = %name, "no definition to instantiate yet");
        return Plan::Skip;
    };

    let mut carriers = Carriers::default();
    let arguments: Vec<Value> = module
        .dependencies
        .iter()
        .enumerate()
        .map(|(index, dependency)| match dependency.as_str() {
            EXPORTS => {
                carriers.exports = Some(index);
                exports_carrier()
            }
            MODULE => {
                carriers.module = Some(index);
                module_carrier()
            }
            other => registry
                .module(&registry.map_module(other))
                .and_then(|dependency| dependency.implementation.clone())
                .unwrap_or(Value::Null),
        })
        .collect();

    Plan::Evaluate {
        body,
        arguments,
        carriers,
    }
}
