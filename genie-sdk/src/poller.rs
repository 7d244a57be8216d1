//! Scheduled background tasks with explicit cancellation
//!
//! A [`Poller`] runs a task on its own thread at a fixed interval until its
//! [`CancellationToken`] is cancelled, the task returns
//! [`ControlFlow::Break`], or the `Poller` is dropped. Dropping waits for the
//! thread to finish, so no callback can run after its owner is gone.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct TokenState {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Shared cancellation flag that also wakes a sleeping poller
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let mut cancelled = self.state.cancelled.lock();
        *cancelled = true;
        self.state.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.cancelled.lock()
    }

    /// Sleep for `timeout` or until cancelled; returns true if cancelled
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut cancelled = self.state.cancelled.lock();
        if !*cancelled {
            self.state.wake.wait_for(&mut cancelled, timeout);
        }
        *cancelled
    }
}

/// Handle to a running periodic task
#[derive(Debug)]
pub struct Poller {
    name: String,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Run `task` now and then every `interval` on a new named thread
    pub fn spawn<F>(name: impl Into<String>, interval: Duration, task: F) -> std::io::Result<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        Self::spawn_with_token(name, interval, CancellationToken::new(), task)
    }

    /// Like [`spawn`](Self::spawn), cancelled through an existing token
    pub fn spawn_with_token<F>(
        name: impl Into<String>,
        interval: Duration,
        token: CancellationToken,
        mut task: F,
    ) -> std::io::Result<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let name = name.into();
        let thread_token = token.clone();
        let thread_name = name.clone();

        let handle = thread::Builder::new().name(name.clone()).spawn(move || {
            tracing::debug!("Poller {} started", thread_name);
            while !thread_token.is_cancelled() {
                if task().is_break() {
                    break;
                }
                if thread_token.wait(interval) {
                    break;
                }
            }
            tracing::debug!("Poller {} stopped", thread_name);
        })?;

        Ok(Self {
            name,
            token,
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once the task has stopped for any reason
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            // A task that drops its own poller cannot wait for itself
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                tracing::warn!("Poller {} panicked", self.name);
            }
        }
    }
}
