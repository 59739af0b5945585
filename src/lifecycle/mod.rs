//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (registry.rs):
//!     Orchestrator::new(components) → register_dependency(a, b)...
//!
//! Startup (orchestrator.rs):
//!     depth-first walk → Component::start → push teardown (closing.rs)
//!
//! Shutdown (orchestrator.rs, closing.rs):
//!     drain closing stack newest-first → Component::stop
//!
//! Process wiring (startup.rs, signals.rs):
//!     config plan → assembled orchestrator; SIGTERM/SIGINT → stop
//! ```
//!
//! # Design Decisions
//! - Fail fast: the first start error aborts startup, nothing is rolled back
//! - Teardown is best-effort: stop errors are logged, draining continues
//! - One thread of control: configuration, then start, then stop

pub mod closing;
pub mod orchestrator;
pub mod registry;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use closing::ClosingStack;
pub use orchestrator::{ComponentState, Orchestrator};
pub use registry::DependencyRegistry;
pub use shutdown::Shutdown;
