//! LIFO stack of deferred teardown actions.

use std::fmt;
use std::future::Future;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::component::Context;

type CloseFn = Box<dyn FnOnce(Context) -> BoxFuture<'static, ()> + Send>;

/// A named teardown action.
struct CloseAction {
    name: String,
    action: CloseFn,
}

/// Teardown actions, run most-recent-first when drained.
///
/// Actions handle their own failures; the drain loop never stops early.
#[derive(Default)]
pub struct ClosingStack {
    actions: Vec<CloseAction>,
}

impl ClosingStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named action to the top of the stack.
    pub fn push<F, Fut>(&mut self, name: impl Into<String>, f: F)
    where
        F: FnOnce(Context) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.actions.push(CloseAction {
            name: name.into(),
            action: Box::new(move |ctx| f(ctx).boxed()),
        });
    }

    /// Pop and run every action, newest first, until the stack is empty.
    pub async fn drain(&mut self, ctx: &Context) {
        while let Some(CloseAction { name, action }) = self.actions.pop() {
            tracing::debug!(
                action = %name,
                remaining = self.actions.len(),
                "Running teardown action"
            );
            action(ctx.clone()).await;
        }
    }

    /// Drop every pending action without running it. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.actions.len();
        self.actions.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action names in push order.
    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }
}

impl fmt::Debug for ClosingStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosingStack")
            .field("actions", &self.names())
            .finish()
    }
}
