//! Module lifecycle.

use serde::{Deserialize, Serialize};

/// Where a module stands in the loader.
///
/// Transitions only move forward:
/// - Referenced -> Requested -> Delivered -> Implemented
/// - Defined (configured path/exports) -> Requested -> Delivered -> Implemented
/// - Delivered may be reached directly when a definition arrives unrequested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleState {
    /// Known only as a dependency placeholder.
    Referenced,

    /// Described by configuration but not requested yet.
    Defined,

    /// A fetch of its resource was started.
    Requested,

    /// Its definition has registered; not instantiated.
    Delivered,

    /// Implementation realized.
    Implemented,
}

impl ModuleState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, ModuleState::Implemented)
    }

    /// Has the module's definition been registered?
    pub fn is_delivered(self) -> bool {
        matches!(self, ModuleState::Delivered | ModuleState::Implemented)
    }
}
