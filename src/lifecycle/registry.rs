//! Dependency registry.
//!
//! Stores, per component, the ordered list of components it depends on and
//! rejects edges that are duplicates or that would close a cycle.

use std::collections::{HashMap, HashSet};

use crate::component::ComponentId;

/// Why an edge was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRejection {
    /// `dependency` already reaches `dependent` (directly or transitively).
    Cycle,
    /// The edge already exists.
    Duplicate,
}

/// Directed dependency graph keyed by component identity.
#[derive(Debug, Default)]
pub struct DependencyRegistry {
    edges: HashMap<ComponentId, Vec<ComponentId>>,
}

impl DependencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `dependent` requires `dependency` to be started first.
    ///
    /// The cycle check runs before the duplicate check. A rejected edge leaves
    /// the graph untouched.
    pub fn register(
        &mut self,
        dependent: ComponentId,
        dependency: ComponentId,
    ) -> Result<(), EdgeRejection> {
        if self.reaches(dependency, dependent) {
            return Err(EdgeRejection::Cycle);
        }
        if self.depends_directly(dependent, dependency) {
            return Err(EdgeRejection::Duplicate);
        }
        self.edges.entry(dependent).or_default().push(dependency);
        Ok(())
    }

    /// Dependencies of `id` in registration order.
    pub fn dependencies_of(&self, id: ComponentId) -> &[ComponentId] {
        self.edges.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn depends_directly(&self, dependent: ComponentId, dependency: ComponentId) -> bool {
        self.dependencies_of(dependent).contains(&dependency)
    }

    /// True if `to` is reachable from `from` by following dependency edges.
    /// A node always reaches itself.
    pub fn reaches(&self, from: ComponentId, to: ComponentId) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![from];
        while let Some(node) = pending.pop() {
            if node == to {
                return true;
            }
            if seen.insert(node) {
                pending.extend(self.dependencies_of(node).iter().copied());
            }
        }
        false
    }

    /// Total number of registered edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
