//! Domain model (modules, configuration, events, call descriptors).

pub mod config;
pub mod events;
pub mod ids;
pub mod module;
pub mod request;
pub mod state;
pub mod value;

pub use config::{DEFAULT_WAIT_TIMEOUT_MS, LoaderConfig, ModuleMaps, WildcardMap};
pub use events::LoaderEvent;
pub use ids::{ListenerId, RequireId};
pub use module::{
    Condition, ConditionTest, EXPORTS, Factory, MODULE, Module, ModuleOptions,
    PendingImplementation, is_reserved,
};
pub use request::{
    FailureCallback, ModuleDefinition, ModuleRequest, NormalizedDefinition, RequireArg,
    RequireRequest, SuccessCallback,
};
pub use state::ModuleState;
pub use value::is_truthy;
