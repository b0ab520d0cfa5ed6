//! Debounce timers.
//!
//! The engine only needs "run this later, unless cancelled". [`Scheduler`] is
//! that seam; [`ManualScheduler`] drives it on a virtual clock so debounce
//! behavior can be tested deterministically.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Deferred task.
pub type Task = Box<dyn FnOnce()>;

/// Handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

/// Single-threaded deferred execution.
pub trait Scheduler {
    /// Run `task` once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task) -> TimerId;

    /// Cancel a pending task.
    ///
    /// Returns true if the task was still pending and will now never run.
    fn cancel(&self, id: TimerId) -> bool;
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_id: u64,
    /// Keyed by deadline, then by scheduling order.
    tasks: BTreeMap<(Duration, u64), Task>,
}

/// Scheduler on a virtual clock.
///
/// Time only moves when [`advance`](Self::advance) is called. Tasks run in
/// deadline order, ties broken by scheduling order, and the clock reads the
/// task's deadline while it runs. Tasks may schedule or cancel other tasks.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualScheduler {
    /// Create a scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Move the clock forward, running every task that falls due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }
        self.inner.borrow_mut().now = target;
        ran
    }

    /// Run tasks that are already due, without moving the clock.
    pub fn run_due(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Advance until no task is pending. Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.borrow().tasks.keys().next().map(|(at, _)| *at);
            let Some(deadline) = next else {
                return ran;
            };
            let by = deadline.saturating_sub(self.now());
            ran += self.advance(by);
        }
    }

    fn pop_due(&self, target: Duration) -> Option<Task> {
        let mut inner = self.inner.borrow_mut();
        let key = *inner.tasks.keys().next()?;
        if key.0 > target {
            return None;
        }
        inner.now = key.0;
        inner.tasks.remove(&key)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let deadline = inner.now + delay;
        inner.tasks.insert((deadline, id), task);
        TimerId(id)
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let key = inner.tasks.keys().find(|(_, task_id)| *task_id == id.0).copied();
        key.is_some_and(|key| inner.tasks.remove(&key).is_some())
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &inner.now)
            .field("pending", &inner.tasks.len())
            .finish()
    }
}
