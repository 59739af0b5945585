//! Component contract.
//!
//! # Responsibilities
//! - Define the start/stop capability every managed unit exposes
//! - Provide identity for components held as trait objects
//! - Ship reusable component building blocks (background tasks, simulations)
//!
//! # Design Decisions
//! - Components are held as `Arc<dyn Component>`; identity is the allocation,
//!   not the value, so two equal-looking components are still distinct
//! - `start` must not return until the component is ready, even if it leaves
//!   background work running
//! - `stop` must not return until the component is fully stopped

pub mod context;
pub mod simulated;
pub mod task;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

pub use context::Context;

use crate::error::BoxError;

/// A unit of startable/stoppable behavior.
#[async_trait]
pub trait Component: Send + Sync {
    /// Perform setup. An error aborts the orchestrator's start sequence.
    async fn start(&self, ctx: &Context) -> Result<(), BoxError>;

    /// Perform teardown. An error is logged; remaining components still stop.
    async fn stop(&self, ctx: &Context) -> Result<(), BoxError>;

    /// Label used in logs, metrics and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Identity of a component held by an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(usize);

impl ComponentId {
    /// Identity of the allocation behind `component`.
    ///
    /// Only stable while some `Arc` to the component is alive.
    pub fn of(component: &Arc<dyn Component>) -> Self {
        Self(Arc::as_ptr(component) as *const () as usize)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}
