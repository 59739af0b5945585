//! Simulated component with configurable latency and failure injection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::component::{Component, Context};
use crate::config::schema::ComponentConfig;
use crate::error::BoxError;

/// A component that sleeps to simulate setup/teardown work.
#[derive(Debug)]
pub struct SimulatedComponent {
    name: String,
    start_delay: Duration,
    stop_delay: Duration,
    fail_on_start: bool,
    fail_on_stop: bool,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl SimulatedComponent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_delay: Duration::ZERO,
            stop_delay: Duration::ZERO,
            fail_on_start: false,
            fail_on_stop: false,
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &ComponentConfig) -> Self {
        Self::new(config.name.clone())
            .with_delays(
                Duration::from_millis(config.start_delay_ms),
                Duration::from_millis(config.stop_delay_ms),
            )
            .with_failures(config.fail_on_start, config.fail_on_stop)
    }

    pub fn with_delays(mut self, start: Duration, stop: Duration) -> Self {
        self.start_delay = start;
        self.stop_delay = stop;
        self
    }

    pub fn with_failures(mut self, on_start: bool, on_stop: bool) -> Self {
        self.fail_on_start = on_start;
        self.fail_on_stop = on_stop;
        self
    }

    /// Number of times `start` has been called.
    pub fn start_calls(&self) -> usize {
        self.starts.load(Ordering::Relaxed)
    }

    /// Number of times `stop` has been called.
    pub fn stop_calls(&self) -> usize {
        self.stops.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Component for SimulatedComponent {
    async fn start(&self, ctx: &Context) -> Result<(), BoxError> {
        self.starts.fetch_add(1, Ordering::Relaxed);
        if !ctx.sleep(self.start_delay).await {
            return Err(format!("{} start interrupted by context", self.name).into());
        }
        if self.fail_on_start {
            return Err(format!("{} configured to fail on start", self.name).into());
        }
        Ok(())
    }

    async fn stop(&self, ctx: &Context) -> Result<(), BoxError> {
        self.stops.fetch_add(1, Ordering::Relaxed);
        if !ctx.sleep(self.stop_delay).await {
            return Err(format!("{} stop interrupted by context", self.name).into());
        }
        if self.fail_on_stop {
            return Err(format!("{} configured to fail on stop", self.name).into());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
