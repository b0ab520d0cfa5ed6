//! Tokio-backed scheduler.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::scheduler::{Scheduler, Task, TimerId};

#[derive(Default)]
struct TokioInner {
    next_id: u64,
    handles: HashMap<u64, JoinHandle<()>>,
}

/// Scheduler that runs tasks on the current tokio `LocalSet`.
///
/// Tasks are `!Send` (they share the provider's cell), so they are spawned
/// with [`tokio::task::spawn_local`]. Scheduling outside a `LocalSet` panics,
/// as `spawn_local` does.
#[derive(Clone, Default)]
pub struct TokioScheduler {
    inner: Rc<RefCell<TokioInner>>,
}

impl TokioScheduler {
    /// Create a scheduler with no pending tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks that have neither run nor been cancelled.
    pub fn pending(&self) -> usize {
        self.inner.borrow().handles.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            id
        };
        let registry = Rc::clone(&self.inner);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            // Deregister before running so the task can reschedule itself.
            registry.borrow_mut().handles.remove(&id);
            task();
        });
        self.inner.borrow_mut().handles.insert(id, handle);
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) -> bool {
        match self.inner.borrow_mut().handles.remove(&id.0) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
