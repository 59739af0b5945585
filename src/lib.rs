//! Dependency-aware component lifecycle orchestrator.
//!
//! Starts components so every declared dependency is fully started before its
//! dependents, and stops them in exact reverse start order.
//!
//! ```no_run
//! use std::sync::Arc;
//! use lifecycle_orchestrator::{Component, Context, Orchestrator};
//! use lifecycle_orchestrator::component::simulated::SimulatedComponent;
//!
//! # async fn run() -> Result<(), lifecycle_orchestrator::LifecycleError> {
//! let client: Arc<dyn Component> = Arc::new(SimulatedComponent::new("client"));
//! let subscription: Arc<dyn Component> = Arc::new(SimulatedComponent::new("subscription"));
//!
//! let mut orchestrator = Orchestrator::new(vec![client.clone(), subscription.clone()]);
//! orchestrator.register_dependency(&subscription, &client)?;
//!
//! let ctx = Context::background();
//! orchestrator.start(&ctx).await?;
//! orchestrator.stop(&ctx).await;
//! # Ok(())
//! # }
//! ```

pub mod component;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use component::{Component, ComponentId, Context};
pub use error::{BoxError, LifecycleError, LifecycleResult};
pub use lifecycle::{ClosingStack, ComponentState, Orchestrator};
