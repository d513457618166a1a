//! Status - registry の集計ビュー

use serde::{Deserialize, Serialize};

use super::loader::Loader;
use crate::domain::ModuleState;

/// Number of modules in each lifecycle state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCounts {
    pub referenced: usize,
    pub defined: usize,
    pub requested: usize,
    pub delivered: usize,
    pub implemented: usize,
}

impl RegistryCounts {
    pub fn record(&mut self, state: ModuleState) {
        match state {
            ModuleState::Referenced => self.referenced += 1,
            ModuleState::Defined => self.defined += 1,
            ModuleState::Requested => self.requested += 1,
            ModuleState::Delivered => self.delivered += 1,
            ModuleState::Implemented => self.implemented += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.referenced + self.defined + self.requested + self.delivered + self.implemented
    }
}

impl FromIterator<ModuleState> for RegistryCounts {
    fn from_iter<I: IntoIterator<Item = ModuleState>>(states: I) -> Self {
        let mut counts = Self::default();
        for state in states {
            counts.record(state);
        }
        counts
    }
}

impl Loader {
    pub fn counts_by_state(&self) -> RegistryCounts {
        self.inner
            .registry
            .lock()
            .modules()
            .values()
            .map(|module| module.state())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModuleDefinition, ModuleOptions};
    use crate::impls::ScriptedFetcher;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn counts_follow_module_states() {
        let loader = Loader::builder()
            .fetcher(Arc::new(ScriptedFetcher::new()))
            .build()
            .unwrap();
        loader.add_module(ModuleOptions::placeholder("a"));
        loader.add_module(ModuleOptions::named("b").with_path("b.js"));
        loader.define(ModuleDefinition::named("c", json!(1)));

        let counts = loader.counts_by_state();

        assert_eq!(
            counts,
            RegistryCounts {
                referenced: 1,
                defined: 1,
                requested: 0,
                delivered: 1,
                implemented: 0,
            }
        );
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn counts_serialize_as_flat_object() {
        let counts: RegistryCounts = [ModuleState::Implemented, ModuleState::Implemented]
            .into_iter()
            .collect();
        let value = serde_json::to_value(&counts).unwrap();
        assert_eq!(value["implemented"], json!(2));
        assert_eq!(value["referenced"], json!(0));
    }
}
