//! Task ownership for screens
//!
//! Background work (permission prompts, location feeds, network calls, tile
//! downloads) runs on a tokio runtime. Each screen owns a [`Lifetime`]; every
//! task spawned through it races the lifetime's cancellation signal and is
//! aborted when the lifetime ends, so no task outlives the screen it was
//! started for.

use futures::future::{self, Either};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Called from background tasks after they posted a result, so the UI can
/// schedule a repaint
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

/// Handle to a spawned async task
#[derive(Debug)]
pub struct TaskHandle(tokio::task::JoinHandle<()>);

impl TaskHandle {
    /// Check if the task is finished
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }

    /// Cancel the task
    pub fn cancel(&self) {
        self.0.abort();
    }
}

/// Observes a [`Lifetime`]'s cancellation
#[derive(Debug, Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once the lifetime ends (or its owner is gone)
    pub async fn cancelled(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Owner of every task started on behalf of one screen
#[derive(Debug)]
pub struct Lifetime {
    runtime: Handle,
    cancel_tx: watch::Sender<bool>,
    tasks: Vec<TaskHandle>,
}

impl Lifetime {
    pub fn new(runtime: Handle) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            runtime,
            cancel_tx,
            tasks: Vec::new(),
        }
    }

    pub fn token(&self) -> CancelToken {
        CancelToken(self.cancel_tx.subscribe())
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Spawns `future` bound to this lifetime. Ignored once the lifetime ended.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_ended() {
            log::debug!("lifetime ended, dropping task");
            return;
        }

        let mut token = self.token();
        let handle = self.runtime.spawn(async move {
            let work = std::pin::pin!(future);
            let cancelled = std::pin::pin!(token.cancelled());
            if let Either::Right(_) = future::select(work, cancelled).await {
                log::debug!("task cancelled with its lifetime");
            }
        });

        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(TaskHandle(handle));
    }

    /// Ends the lifetime: signals cancellation and aborts every task.
    /// Returns `true` only on the first call.
    pub fn end(&mut self) -> bool {
        let already_ended = self.cancel_tx.send_replace(true);
        for task in self.tasks.drain(..) {
            task.cancel();
        }
        !already_ended
    }

    pub fn is_ended(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Tasks spawned and not yet finished
    pub fn active_tasks(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }
}

impl Drop for Lifetime {
    fn drop(&mut self) {
        self.end();
    }
}
