//! Assembly of an orchestrator from a configuration plan.
//!
//! # Responsibilities
//! - Validate the plan (names unique, dependencies known)
//! - Build one component per `[[components]]` entry
//! - Register every `depends_on` edge in declaration order
//! - Surface cycles with the edge that closed them
//!
//! # Design Decisions
//! - Top-level start order follows the order components appear in the file
//! - Assembly is pure wiring: nothing is started here

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::component::simulated::SimulatedComponent;
use crate::component::{Component, Context};
use crate::config::validation::{validate_config, ValidationError};
use crate::config::LifecycleConfig;
use crate::error::LifecycleError;
use crate::lifecycle::Orchestrator;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid plan: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// An assembled, not yet started, orchestrator plus handles to its components.
pub struct Plan {
    pub orchestrator: Orchestrator,
    pub components: Vec<Arc<SimulatedComponent>>,
    start_timeout: Duration,
    stop_timeout: Duration,
}

impl Plan {
    /// Context for the start phase, bounded by `timeouts.start_secs`.
    pub fn start_context(&self, parent: &Context) -> Context {
        parent.with_timeout(self.start_timeout)
    }

    /// Context for the stop phase, bounded by `timeouts.stop_secs`.
    pub fn stop_context(&self, parent: &Context) -> Context {
        parent.with_timeout(self.stop_timeout)
    }
}

/// Build an orchestrator for the components described in `config`.
pub fn assemble(config: &LifecycleConfig) -> Result<Plan, PlanError> {
    validate_config(config).map_err(PlanError::Invalid)?;

    let concrete: Vec<Arc<SimulatedComponent>> = config
        .components
        .iter()
        .map(|c| Arc::new(SimulatedComponent::from_config(c)))
        .collect();

    let erased: Vec<Arc<dyn Component>> = concrete
        .iter()
        .map(|c| c.clone() as Arc<dyn Component>)
        .collect();

    let by_name: HashMap<&str, &Arc<dyn Component>> = config
        .components
        .iter()
        .map(|c| c.name.as_str())
        .zip(erased.iter())
        .collect();

    let mut orchestrator = Orchestrator::new(erased.clone());
    for (component, handle) in config.components.iter().zip(erased.iter()) {
        for dep in &component.depends_on {
            let dependency = by_name.get(dep.as_str()).ok_or_else(|| {
                PlanError::Invalid(vec![ValidationError::UnknownDependency {
                    component: component.name.clone(),
                    missing: dep.clone(),
                }])
            })?;
            orchestrator.register_dependency(handle, dependency)?;
        }
    }

    tracing::info!(components = concrete.len(), "Lifecycle plan assembled");

    Ok(Plan {
        orchestrator,
        components: concrete,
        start_timeout: Duration::from_secs(config.timeouts.start_secs),
        stop_timeout: Duration::from_secs(config.timeouts.stop_secs),
    })
}
