//! ModuleRegistrar port - fetched code registers its modules through this.

use crate::domain::ModuleDefinition;

pub trait ModuleRegistrar: Send + Sync {
    /// Registers a definition. Returns `false` when it was ignored
    /// (anonymous or incomplete).
    fn define(&self, definition: ModuleDefinition) -> bool;
}
