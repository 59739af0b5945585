//! Background task component.
//!
//! Wraps a long-running async loop (a subscriber, a poller) as a component:
//! `start` spawns the loop and returns once it is running, `stop` signals it
//! and waits for it to exit.

use std::future::Future;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::component::{Component, Context};
use crate::error::BoxError;
use crate::lifecycle::shutdown::Shutdown;

type TaskFactory = Box<dyn Fn(broadcast::Receiver<()>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Component that owns a spawned tokio task.
pub struct BackgroundTask {
    name: String,
    factory: TaskFactory,
    shutdown: Mutex<Option<Shutdown>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundTask {
    /// Create a component that runs `f(shutdown_rx)` while started.
    ///
    /// The future should exit promptly once the receiver yields.
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(broadcast::Receiver<()>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(move |rx| f(rx).boxed()),
            shutdown: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    /// True while the spawned task has not finished.
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .map(|h| h.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Component for BackgroundTask {
    async fn start(&self, _ctx: &Context) -> Result<(), BoxError> {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        let handle = tokio::spawn((self.factory)(rx));

        *self.shutdown.lock().map_err(|_| "shutdown lock poisoned")? = Some(shutdown);
        *self.handle.lock().map_err(|_| "task handle lock poisoned")? = Some(handle);

        tracing::debug!(component = %self.name, "Background task spawned");
        Ok(())
    }

    async fn stop(&self, ctx: &Context) -> Result<(), BoxError> {
        let shutdown = self.shutdown.lock().map_err(|_| "shutdown lock poisoned")?.take();
        let handle = self.handle.lock().map_err(|_| "task handle lock poisoned")?.take();

        let (Some(shutdown), Some(mut handle)) = (shutdown, handle) else {
            return Ok(());
        };
        shutdown.trigger();
        // Let a task that exits on the signal finish before the deadline is checked.
        tokio::task::yield_now().await;

        tokio::select! {
            biased;
            res = &mut handle => {
                res.map_err(|e| format!("background task {} panicked: {}", self.name, e))?;
                return Ok(());
            }
            _ = ctx.done() => {}
        }

        // Abort only takes effect at the task's next yield point; wait for it.
        handle.abort();
        match handle.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_cancelled() => Err(format!(
                "background task {} did not exit before the stop deadline",
                self.name
            )
            .into()),
            Err(e) => Err(format!("background task {} panicked: {}", self.name, e).into()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_task_runs_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let t = ticks.clone();
        let task = BackgroundTask::new("ticker", move |mut shutdown| {
            let t = t.clone();
            async move {
                let mut interval = tokio::time::interval(Duration::from_millis(5));
                loop {
                    tokio::select! {
                        _ = interval.tick() => { t.fetch_add(1, Ordering::SeqCst); }
                        _ = shutdown.recv() => break,
                    }
                }
            }
        });

        let ctx = Context::background();
        task.start(&ctx).await.unwrap();
        assert!(task.is_running());

        tokio::time::sleep(Duration::from_millis(30)).await;
        task.stop(&ctx).await.unwrap();
        assert!(!task.is_running());

        let seen = ticks.load(Ordering::SeqCst);
        assert!(seen > 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let task = BackgroundTask::new("idle", |_rx| async {});
        assert!(task.stop(&Context::background()).await.is_ok());
        assert_eq!(task.name(), "idle");
    }

    #[tokio::test]
    async fn test_stuck_task_reports_error_at_deadline() {
        let task = BackgroundTask::new("stuck", |_rx| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        task.start(&Context::background()).await.unwrap();

        let ctx = Context::background().with_timeout(Duration::from_millis(20));
        let err = task.stop(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("stop deadline"));
        assert!(!task.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_waits_for_task_past_deadline() {
        let entered = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let (e, f) = (entered.clone(), finished.clone());
        let task = BackgroundTask::new("busy", move |_rx| {
            let (e, f) = (e.clone(), f.clone());
            async move {
                e.store(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(200));
                f.store(1, Ordering::SeqCst);
            }
        });
        task.start(&Context::background()).await.unwrap();
        while entered.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        let _ = task.stop(&ctx).await;
        assert_eq!(finished.load(Ordering::SeqCst), 1, "task body outlived stop");
        assert!(!task.is_running());
    }

    #[tokio::test]
    async fn test_prompt_exit_with_expired_context_is_clean_stop() {
        for _ in 0..50 {
            let task = BackgroundTask::new("listener", |mut rx| async move {
                let _ = rx.recv().await;
            });
            task.start(&Context::background()).await.unwrap();

            let ctx = Context::background();
            ctx.cancel();
            assert!(task.stop(&ctx).await.is_ok());
        }
    }
}
