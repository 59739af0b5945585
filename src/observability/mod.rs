//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator and components produce:
//!     → logging.rs (structured log events, one span per start/stop run)
//!     → metrics.rs (start/stop counters, start latency, started gauge)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Run ID flows through every event of a start or stop phase
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
