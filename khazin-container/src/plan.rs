//! Resolution planning.
//!
//! Before anything is constructed for a request, the planner walks the
//! dependency graph below the requested name:
//! - Checks that every required name has a binding
//! - Detects circular dependencies
//! - Orders the unresolved bindings so each comes after its dependencies
//!
//! Only when the whole walk succeeds does the resolver build closures and
//! materialize singletons, so a missing dependency deep in the graph fails
//! the request before any of its objects exist.

use std::collections::HashMap;
use std::sync::Arc;

use khazin_support::rendering::{ChainEntry, suggest_similar};
use tracing::{debug, instrument, warn};

use crate::error::{ContainerError, CyclicDependencyError, NotFoundError, Result};
use crate::key::DependencyKey;
use crate::registry::{Binding, Registry};

/// How many "did you mean?" names an error carries.
const MAX_SUGGESTIONS: usize = 3;

/// Per-walk visit state. Absent from the map means unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Outcome of planning one request.
#[derive(Debug)]
pub(crate) struct Plan {
    /// The requested binding, as found while planning.
    pub root: Arc<Binding>,
    /// Unresolved bindings in dependency order; ends with `root` unless it
    /// was already resolved.
    pub steps: Vec<Arc<Binding>>,
}

/// Depth-first walk over the bindings reachable from one name.
///
/// # Algorithm
/// Left-to-right DFS over constructor parameters. A binding is marked
/// in-progress while its parameters are visited; meeting an in-progress
/// binding again means the current path is a cycle. Already-resolved
/// bindings are leaves: their closures captured everything below them.
pub(crate) struct Planner<'a> {
    registry: &'a Registry,
    marks: HashMap<DependencyKey, Mark>,
    /// Current DFS path (for error reporting)
    path: Vec<DependencyKey>,
    /// Unresolved bindings in dependency order
    steps: Vec<Arc<Binding>>,
}

impl<'a> Planner<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            marks: HashMap::new(),
            path: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Finds the unresolved bindings needed by `root`, dependencies first.
    ///
    /// # Errors
    /// - [`ContainerError::NotFound`]: `root` or something below it is unbound
    /// - [`ContainerError::CyclicDependency`]: the graph below `root` loops
    #[instrument(skip_all, fields(root = %root), name = "resolution_plan")]
    pub fn plan(mut self, root: &DependencyKey) -> Result<Plan> {
        let root = self.visit(root, None)?;
        debug!(steps = self.steps.len(), "Resolution plan ready");
        Ok(Plan {
            root,
            steps: self.steps,
        })
    }

    fn visit(&mut self, key: &DependencyKey, required_by: Option<&DependencyKey>) -> Result<Arc<Binding>> {
        let binding = self
            .registry
            .lookup(key.canonical())
            .ok_or_else(|| not_found(self.registry, key, required_by))?;

        if binding.is_resolved() {
            return Ok(binding);
        }

        match self.marks.get(key) {
            Some(Mark::Done) => return Ok(binding),
            Some(Mark::InProgress) => return Err(self.cycle(key)),
            None => {}
        }

        self.marks.insert(key.clone(), Mark::InProgress);
        self.path.push(key.clone());

        for parameter in binding.parameters() {
            self.visit(&DependencyKey::new(parameter.as_str()), Some(&binding.key))?;
        }

        self.path.pop();
        self.marks.insert(key.clone(), Mark::Done);
        self.steps.push(Arc::clone(&binding));
        Ok(binding)
    }

    fn cycle(&self, key: &DependencyKey) -> ContainerError {
        let start = self.path.iter().position(|k| k == key).unwrap_or(0);
        let mut chain = self.path[start..].to_vec();
        chain.push(key.clone());

        warn!(cycle = ?chain, "Circular dependency detected!");
        ContainerError::CyclicDependency(CyclicDependencyError { chain })
    }

    /// Lists every binding below `root` (resolved or not) as an indented tree.
    ///
    /// Shared dependencies appear once per consumer.
    pub fn tree(mut self, root: &DependencyKey) -> Result<Vec<ChainEntry>> {
        let mut entries = Vec::new();
        self.walk_tree(root, None, 0, &mut entries)?;
        Ok(entries)
    }

    fn walk_tree(
        &mut self,
        key: &DependencyKey,
        required_by: Option<&DependencyKey>,
        depth: usize,
        entries: &mut Vec<ChainEntry>,
    ) -> Result<()> {
        if self.path.contains(key) {
            return Err(self.cycle(key));
        }

        let binding = self
            .registry
            .lookup(key.canonical())
            .ok_or_else(|| not_found(self.registry, key, required_by))?;

        entries.push(ChainEntry {
            name: binding.key.spelling().to_string(),
            lifetime: binding.lifetime.to_string(),
            depth,
        });

        self.path.push(key.clone());
        for parameter in binding.parameters() {
            let child = DependencyKey::new(parameter.as_str());
            self.walk_tree(&child, Some(&binding.key), depth + 1, entries)?;
        }
        self.path.pop();
        Ok(())
    }
}

/// Builds a not-found error with suggestions from the registry.
pub(crate) fn not_found(
    registry: &Registry,
    key: &DependencyKey,
    required_by: Option<&DependencyKey>,
) -> ContainerError {
    let known = registry.names();
    ContainerError::NotFound(NotFoundError {
        requested: key.clone(),
        required_by: required_by.cloned(),
        suggestions: suggest_similar(key.canonical(), &known, MAX_SUGGESTIONS),
    })
}
