//! Shared utilities for lifecycle integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lifecycle_orchestrator::{BoxError, Component, Context};

/// A start or stop call observed by the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StartBegin(String),
    StartEnd(String),
    Stop(String),
}

/// Ordered record of lifecycle calls shared by every component in a test.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// Names of components whose start completed, in order.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::StartEnd(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Names of components whose start began, in order.
    #[allow(dead_code)]
    pub fn start_attempts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::StartBegin(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Stop(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }
}

/// Component that records its calls and can be told to fail.
pub struct Recording {
    name: String,
    journal: Journal,
    start_delay: Duration,
    fail_start: bool,
    fail_stop: bool,
}

impl Recording {
    pub fn new(name: &str, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            journal: journal.clone(),
            start_delay: Duration::ZERO,
            fail_start: false,
            fail_stop: false,
        }
    }

    #[allow(dead_code)]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    #[allow(dead_code)]
    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    #[allow(dead_code)]
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn into_component(self) -> Arc<dyn Component> {
        Arc::new(self)
    }
}

#[async_trait]
impl Component for Recording {
    async fn start(&self, _ctx: &Context) -> Result<(), BoxError> {
        self.journal.push(Event::StartBegin(self.name.clone()));
        if !self.start_delay.is_zero() {
            tokio::time::sleep(self.start_delay).await;
        }
        if self.fail_start {
            return Err(format!("{} refused to start", self.name).into());
        }
        self.journal.push(Event::StartEnd(self.name.clone()));
        Ok(())
    }

    async fn stop(&self, _ctx: &Context) -> Result<(), BoxError> {
        self.journal.push(Event::Stop(self.name.clone()));
        if self.fail_stop {
            return Err(format!("{} refused to stop", self.name).into());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build a recording component named `name`.
pub fn component(name: &str, journal: &Journal) -> Arc<dyn Component> {
    Recording::new(name, journal).into_component()
}
