//! Ties background work to the lifetime of a view.
//!
//! Every fetch a screen starts is spawned through the view's scope. Closing
//! the scope (explicitly, or by dropping it when the view goes away) aborts
//! whatever is still in flight, so a late response never touches state that
//! belongs to a discarded view.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

pub struct ViewScope {
    runtime: Handle,
    closed: AtomicBool,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl ViewScope {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            closed: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Scope on the runtime of the calling task.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Returns false, without spawning, once the scope is closed.
    pub fn spawn<F>(&self, fut: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            return false;
        }
        let handle = self.runtime.spawn(fut);
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle.abort_handle());
        true
    }

    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(|e| e.into_inner()));
        let pending = tasks.iter().filter(|t| !t.is_finished()).count();
        if pending > 0 {
            log::debug!("Closing view scope, aborting {pending} task(s)");
        }
        for task in tasks {
            task.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|t| !t.is_finished())
            .count()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.close();
    }
}
