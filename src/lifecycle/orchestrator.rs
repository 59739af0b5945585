//! Dependency-ordered startup and reverse-order teardown.
//!
//! # Ordering
//! ```text
//! start:  depth-first, dependencies before dependents,
//!         sibling dependencies in registration order,
//!         top-level components in construction order
//! stop:   exact reverse of actual start completion
//! ```
//!
//! Startup is fail-fast with no rollback. Teardown is best-effort: a failing
//! `stop` is logged and the remaining components still stop.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use crate::component::{Component, ComponentId, Context};
use crate::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::closing::ClosingStack;
use crate::lifecycle::registry::{DependencyRegistry, EdgeRejection};
use crate::observability::metrics;

/// Orchestrator-local lifecycle state of a component.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    NotStarted = 0,
    Started = 1,
    Stopped = 2,
}

impl From<u8> for ComponentState {
    fn from(val: u8) -> Self {
        match val {
            1 => ComponentState::Started,
            2 => ComponentState::Stopped,
            _ => ComponentState::NotStarted,
        }
    }
}

/// A component plus the bookkeeping the orchestrator keeps for it.
struct Managed {
    component: Arc<dyn Component>,
    /// Shared with the teardown action so it can record `Stopped`.
    state: Arc<AtomicU8>,
}

impl Managed {
    fn new(component: Arc<dyn Component>) -> Self {
        Self {
            component,
            state: Arc::new(AtomicU8::new(ComponentState::NotStarted as u8)),
        }
    }
}

/// One level of the explicit depth-first walk.
struct Frame {
    id: ComponentId,
    next_dependency: usize,
}

/// Starts components in dependency order and stops them in reverse.
///
/// Single-use per start/stop cycle: after `stop`, a second `start` is a no-op
/// unless `reset` is called first.
pub struct Orchestrator {
    order: Vec<ComponentId>,
    components: HashMap<ComponentId, Managed>,
    registry: DependencyRegistry,
    started: HashSet<ComponentId>,
    start_order: Vec<ComponentId>,
    closing: ClosingStack,
    run_id: Uuid,
}

impl Orchestrator {
    /// Create an orchestrator over `components`, which fixes the top-level
    /// start order for components with no dependency relationship.
    pub fn new(components: Vec<Arc<dyn Component>>) -> Self {
        let mut order = Vec::with_capacity(components.len());
        let mut managed = HashMap::with_capacity(components.len());
        for component in components {
            let id = ComponentId::of(&component);
            if managed.contains_key(&id) {
                continue;
            }
            order.push(id);
            managed.insert(id, Managed::new(component));
        }

        Self {
            order,
            components: managed,
            registry: DependencyRegistry::new(),
            started: HashSet::new(),
            start_order: Vec::new(),
            closing: ClosingStack::new(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Declare that `dependent` must start after `dependency`.
    ///
    /// Either component may be absent from the construction list; it is then
    /// started only as a dependency.
    pub fn register_dependency(
        &mut self,
        dependent: &Arc<dyn Component>,
        dependency: &Arc<dyn Component>,
    ) -> LifecycleResult<()> {
        let a = ComponentId::of(dependent);
        let b = ComponentId::of(dependency);

        self.registry.register(a, b).map_err(|rejection| {
            let dependent = dependent.name().to_string();
            let dependency = dependency.name().to_string();
            tracing::warn!(%dependent, %dependency, ?rejection, "Dependency rejected");
            match rejection {
                EdgeRejection::Cycle => LifecycleError::DependencyCycle { dependent, dependency },
                EdgeRejection::Duplicate => {
                    LifecycleError::AlreadyRegistered { dependent, dependency }
                }
            }
        })?;

        self.components
            .entry(a)
            .or_insert_with(|| Managed::new(dependent.clone()));
        self.components
            .entry(b)
            .or_insert_with(|| Managed::new(dependency.clone()));

        tracing::debug!(
            dependent = dependent.name(),
            dependency = dependency.name(),
            "Dependency registered"
        );
        Ok(())
    }

    /// Start every component, dependencies first.
    ///
    /// Returns the first start failure. Components started before it stay
    /// started; call `stop` to tear them down.
    pub async fn start(&mut self, ctx: &Context) -> LifecycleResult<()> {
        let span = tracing::info_span!("lifecycle", run_id = %self.run_id, phase = "start");
        async {
            tracing::info!(components = self.components.len(), "Starting components");
            let begun = Instant::now();

            for root in self.order.clone() {
                self.start_tree(root, ctx).await?;
            }

            tracing::info!(
                started = self.started.len(),
                elapsed_ms = begun.elapsed().as_millis() as u64,
                "All components started"
            );
            Ok::<(), LifecycleError>(())
        }
        .instrument(span)
        .await
    }

    /// Stop every started component in reverse start order.
    ///
    /// Stop failures are logged, never returned.
    pub async fn stop(&mut self, ctx: &Context) {
        let span = tracing::info_span!("lifecycle", run_id = %self.run_id, phase = "stop");
        async {
            tracing::info!(pending = self.closing.len(), "Stopping components");
            let begun = Instant::now();

            self.closing.drain(ctx).await;
            metrics::set_started_components(0);

            tracing::info!(
                elapsed_ms = begun.elapsed().as_millis() as u64,
                "All components stopped"
            );
        }
        .instrument(span)
        .await
    }

    /// Clear the started set and the closing stack so the instance can run a
    /// fresh start/stop cycle. Pending teardown actions are dropped unrun.
    pub fn reset(&mut self) {
        let dropped = self.closing.clear();
        if dropped > 0 {
            tracing::warn!(dropped, "Reset discarded teardown actions that never ran");
        }
        self.started.clear();
        self.start_order.clear();
        for managed in self.components.values() {
            managed.state.store(ComponentState::NotStarted as u8, Ordering::SeqCst);
        }
        self.run_id = Uuid::new_v4();
    }

    /// Lifecycle state of `component`; unknown components are `NotStarted`.
    pub fn state_of(&self, component: &Arc<dyn Component>) -> ComponentState {
        self.components
            .get(&ComponentId::of(component))
            .map(|m| ComponentState::from(m.state.load(Ordering::SeqCst)))
            .unwrap_or(ComponentState::NotStarted)
    }

    pub fn is_started(&self, component: &Arc<dyn Component>) -> bool {
        self.started.contains(&ComponentId::of(component))
    }

    pub fn started_count(&self) -> usize {
        self.started.len()
    }

    /// Names of started components in the order their start completed.
    pub fn start_order(&self) -> Vec<&str> {
        self.start_order
            .iter()
            .filter_map(|id| self.components.get(id))
            .map(|m| m.component.name())
            .collect()
    }

    /// Number of teardown actions waiting for `stop`.
    pub fn pending_teardown(&self) -> usize {
        self.closing.len()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Start `root` and everything it transitively depends on.
    ///
    /// Walks with an explicit stack so deep graphs cannot overflow the call
    /// stack; the registry guarantees the graph is acyclic.
    async fn start_tree(&mut self, root: ComponentId, ctx: &Context) -> LifecycleResult<()> {
        if self.started.contains(&root) {
            return Ok(());
        }

        let mut frames = vec![Frame { id: root, next_dependency: 0 }];
        while let Some(frame) = frames.last_mut() {
            let id = frame.id;
            let next = self.registry.dependencies_of(id).get(frame.next_dependency).copied();
            if let Some(dependency) = next {
                frame.next_dependency += 1;
                if !self.started.contains(&dependency) {
                    frames.push(Frame { id: dependency, next_dependency: 0 });
                }
                continue;
            }

            frames.pop();
            if self.started.contains(&id) {
                tracing::debug!(component = %id, "Already started");
                continue;
            }
            self.start_one(id, ctx).await?;
        }
        Ok(())
    }

    async fn start_one(&mut self, id: ComponentId, ctx: &Context) -> LifecycleResult<()> {
        let Some(managed) = self.components.get(&id) else {
            tracing::error!(component = %id, "Dependency graph references an unmanaged component");
            return Err(LifecycleError::UnknownComponent(id));
        };
        let component = managed.component.clone();
        let state = managed.state.clone();
        let name = component.name().to_string();

        tracing::debug!(component = %name, "Starting component");
        let begun = Instant::now();

        if let Err(source) = component.start(ctx).await {
            metrics::record_start(&name, false, begun.elapsed());
            tracing::error!(component = %name, error = %source, "Component failed to start");
            return Err(LifecycleError::StartFailed { component: name, source });
        }

        let elapsed = begun.elapsed();
        metrics::record_start(&name, true, elapsed);
        tracing::info!(
            component = %name,
            elapsed_ms = elapsed.as_millis() as u64,
            "Component started"
        );

        // Pushed in completion order, so draining stops dependents before
        // their dependencies.
        let teardown_name = name.clone();
        let teardown_state = state.clone();
        self.closing.push(name, move |ctx: Context| async move {
            let begun = Instant::now();
            match component.stop(&ctx).await {
                Ok(()) => {
                    metrics::record_stop(&teardown_name, true);
                    tracing::info!(
                        component = %teardown_name,
                        elapsed_ms = begun.elapsed().as_millis() as u64,
                        "Component stopped"
                    );
                }
                Err(e) => {
                    metrics::record_stop(&teardown_name, false);
                    tracing::error!(
                        component = %teardown_name,
                        error = %e,
                        "Failed to stop component"
                    );
                }
            }
            teardown_state.store(ComponentState::Stopped as u8, Ordering::SeqCst);
        });

        state.store(ComponentState::Started as u8, Ordering::SeqCst);
        self.started.insert(id);
        self.start_order.push(id);
        metrics::set_started_components(self.started.len());
        Ok(())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("run_id", &self.run_id)
            .field("components", &self.components.len())
            .field("edges", &self.registry.edge_count())
            .field("started", &self.started.len())
            .field("closing", &self.closing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::simulated::SimulatedComponent;

    fn sim(name: &str) -> (Arc<SimulatedComponent>, Arc<dyn Component>) {
        let concrete = Arc::new(SimulatedComponent::new(name));
        let erased: Arc<dyn Component> = concrete.clone();
        (concrete, erased)
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let (_, a) = sim("a");
        let mut orch = Orchestrator::new(vec![a.clone()]);
        let ctx = Context::background();

        assert_eq!(orch.state_of(&a), ComponentState::NotStarted);
        orch.start(&ctx).await.unwrap();
        assert_eq!(orch.state_of(&a), ComponentState::Started);
        assert!(orch.is_started(&a));
        assert_eq!(orch.pending_teardown(), 1);

        orch.stop(&ctx).await;
        assert_eq!(orch.state_of(&a), ComponentState::Stopped);
        assert_eq!(orch.pending_teardown(), 0);
    }

    #[tokio::test]
    async fn test_second_start_without_reset_is_noop() {
        let (a_sim, a) = sim("a");
        let mut orch = Orchestrator::new(vec![a]);
        let ctx = Context::background();

        orch.start(&ctx).await.unwrap();
        orch.stop(&ctx).await;
        orch.start(&ctx).await.unwrap();

        assert_eq!(a_sim.start_calls(), 1);
        assert_eq!(orch.pending_teardown(), 0);
    }

    #[tokio::test]
    async fn test_reset_allows_new_cycle() {
        let (a_sim, a) = sim("a");
        let (b_sim, b) = sim("b");
        let mut orch = Orchestrator::new(vec![a.clone(), b.clone()]);
        orch.register_dependency(&a, &b).unwrap();
        let ctx = Context::background();
        let first_run = orch.run_id();

        orch.start(&ctx).await.unwrap();
        orch.stop(&ctx).await;
        orch.reset();

        assert_ne!(orch.run_id(), first_run);
        assert_eq!(orch.state_of(&a), ComponentState::NotStarted);
        assert_eq!(orch.started_count(), 0);

        orch.start(&ctx).await.unwrap();
        assert_eq!(orch.start_order(), vec!["b", "a"]);
        orch.stop(&ctx).await;

        assert_eq!(a_sim.start_calls(), 2);
        assert_eq!(b_sim.stop_calls(), 2);
    }

    #[tokio::test]
    async fn test_reset_drops_pending_teardown() {
        let (a_sim, a) = sim("a");
        let mut orch = Orchestrator::new(vec![a]);
        orch.start(&Context::background()).await.unwrap();

        orch.reset();
        assert_eq!(orch.pending_teardown(), 0);
        assert_eq!(a_sim.stop_calls(), 0);
    }

    #[tokio::test]
    async fn test_dependency_outside_construction_list_is_started() {
        let (_, a) = sim("a");
        let (b_sim, b) = sim("b");
        let mut orch = Orchestrator::new(vec![a.clone()]);
        orch.register_dependency(&a, &b).unwrap();

        orch.start(&Context::background()).await.unwrap();
        assert_eq!(b_sim.start_calls(), 1);
        assert_eq!(orch.start_order(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_duplicate_construction_entries_start_once() {
        let (a_sim, a) = sim("a");
        let mut orch = Orchestrator::new(vec![a.clone(), a]);
        orch.start(&Context::background()).await.unwrap();
        assert_eq!(a_sim.start_calls(), 1);
    }

    #[tokio::test]
    async fn test_start_one_rejects_unmanaged_component() {
        let (_, a) = sim("a");
        let (stray_sim, stray) = sim("stray");
        let mut orch = Orchestrator::new(vec![a]);

        let err = orch
            .start_one(ComponentId::of(&stray), &Context::background())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::UnknownComponent(id) if id == ComponentId::of(&stray)
        ));
        assert_eq!(stray_sim.start_calls(), 0);
        assert_eq!(orch.started_count(), 0);
        assert_eq!(orch.pending_teardown(), 0);
    }

    #[test]
    fn test_state_from_u8() {
        assert_eq!(ComponentState::from(0), ComponentState::NotStarted);
        assert_eq!(ComponentState::from(1), ComponentState::Started);
        assert_eq!(ComponentState::from(2), ComponentState::Stopped);
        assert_eq!(ComponentState::from(9), ComponentState::NotStarted);
    }
}
