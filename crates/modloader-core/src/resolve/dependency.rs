//! Dependency-ordered resolution of a requested module set.
//!
//! Design:
//! - Depth-first post-order over the registry, rooted at each requested name
//! - Work queue may grow while resolving (conditional modules)
//! - Visit marks live in a per-pass state map, never on the modules, so a
//!   failed pass leaves nothing behind

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::path::PathResolver;
use crate::domain::{ModuleOptions, is_reserved};
use crate::error::LoaderError;
use crate::registry::ConfigParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Produces, for a set of requested names, every module they transitively
/// need, dependencies first, each exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyBuilder {
    path_resolver: PathResolver,
}

impl DependencyBuilder {
    pub fn new(path_resolver: PathResolver) -> Self {
        Self { path_resolver }
    }

    /// Resolves `requested` (already mapped names) into load order.
    ///
    /// Unknown names get placeholder registry entries. Fails with
    /// [`LoaderError::Cycle`] naming the first module reached twice on the
    /// current path.
    pub fn resolve_dependencies(
        &self,
        parser: &mut ConfigParser,
        requested: &[String],
    ) -> Result<Vec<String>, LoaderError> {
        let mut pass = ResolutionPass {
            parser,
            path_resolver: &self.path_resolver,
            marks: HashMap::new(),
            conditionals_processed: HashSet::new(),
            queue: requested.to_vec(),
            result: Vec::new(),
        };
        pass.run()?;
        debug!(requested = ?requested, order = ?pass.result, "dependencies resolved");
        Ok(pass.result)
    }
}

/// State of one `resolve_dependencies` call. Dropped when the call returns.
struct ResolutionPass<'a> {
    parser: &'a mut ConfigParser,
    path_resolver: &'a PathResolver,
    marks: HashMap<String, Mark>,
    conditionals_processed: HashSet<String>,
    queue: Vec<String>,
    result: Vec<String>,
}

impl ResolutionPass<'_> {
    fn run(&mut self) -> Result<(), LoaderError> {
        let mut index = 0;
        while index < self.queue.len() {
            let name = self.queue[index].clone();
            self.parser.ensure_module(&name);
            if self.marks.get(&name) != Some(&Mark::Done) {
                self.visit(&name)?;
            }
            index += 1;
        }
        Ok(())
    }

    fn visit(&mut self, name: &str) -> Result<(), LoaderError> {
        if self.marks.get(name) == Some(&Mark::InProgress) {
            return Err(LoaderError::Cycle(name.to_string()));
        }

        self.process_conditional_modules(name);

        if self.marks.get(name) == Some(&Mark::Done) {
            return Ok(());
        }

        self.marks.insert(name.to_string(), Mark::InProgress);

        let dependencies = self
            .parser
            .module(name)
            .map(|module| module.dependencies.clone())
            .unwrap_or_default();

        for dependency in dependencies.iter().filter(|d| !is_reserved(d)) {
            let resolved = self.path_resolver.resolve(name, dependency);
            let mapped = self.parser.map_module(&resolved);
            if self.parser.module(&mapped).is_none() {
                self.parser.add_module(ModuleOptions::placeholder(&mapped));
            }
            self.visit(&mapped)?;
        }

        self.marks.insert(name.to_string(), Mark::Done);
        self.result.push(name.to_string());
        Ok(())
    }

    /// Enqueues the modules conditioned on `name` whose test passes.
    /// Runs at most once per trigger per pass.
    fn process_conditional_modules(&mut self, name: &str) {
        if self.conditionals_processed.contains(name) {
            return;
        }
        let Some(dependents) = self.parser.conditional_modules().get(name).cloned() else {
            return;
        };

        for dependent in dependents {
            if self.queue.contains(&dependent) {
                continue;
            }
            let passes = self
                .parser
                .module(&dependent)
                .and_then(|module| module.condition.as_ref())
                .is_some_and(|condition| condition.test.evaluate());
            if passes {
                debug!(trigger = %name, module = %dependent, "conditional module included");
                self.queue.push(dependent);
            }
        }

        self.conditionals_processed.insert(name.to_string());
    }
}
