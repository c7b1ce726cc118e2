//! Cooperative priority/time scheduler.
//!
//! Every piece of work in the control loop is a one-shot `Action` that gets
//! the shared context and the scheduler itself, so it can submit follow-ups.
//! Long-running behaviour is a chain of actions, each re-submitting its
//! continuation with a delay. Nothing is preempted: `run` executes whole
//! actions, one at a time, on the calling thread.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use plotter_traits::clock::{Clock, MonotonicClock};

use crate::error::Result;

/// Unit of work. Runs exactly once.
pub type Action<C> = Box<dyn FnOnce(&mut C, &mut Scheduler<C>) -> Result<()>>;

/// Smaller value runs first among tasks that are due at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Priority(pub i32);

/// When a task becomes runnable. `Immediate` sorts before every instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Due {
    Immediate,
    At(Instant),
}

struct Task<C> {
    due: Due,
    priority: Priority,
    action: Action<C>,
}

impl<C> Task<C> {
    fn key(&self) -> (Due, Priority) {
        (self.due, self.priority)
    }
}

pub struct Scheduler<C> {
    // sorted by (due, priority); ties keep submission order
    pending: VecDeque<Task<C>>,
    // submitted since the last merge, in submission order
    submitted: Vec<Task<C>>,
    clock: Arc<dyn Clock + Send + Sync>,
    after_step: Option<Box<dyn FnMut(&mut C)>>,
}

impl<C> core::fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending.len())
            .field("submitted", &self.submitted.len())
            .field("after_step", &self.after_step.is_some())
            .finish()
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            pending: VecDeque::new(),
            submitted: Vec::new(),
            clock,
            after_step: None,
        }
    }

    /// Install a hook that runs after every executed action.
    pub fn with_after_step(mut self, hook: impl FnMut(&mut C) + 'static) -> Self {
        self.after_step = Some(Box::new(hook));
        self
    }

    /// Number of tasks not yet executed.
    pub fn pending(&self) -> usize {
        self.pending.len() + self.submitted.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Run `action` as soon as possible with priority 0.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: FnOnce(&mut C, &mut Scheduler<C>) -> Result<()> + 'static,
    {
        self.schedule_with(Priority::default(), Duration::ZERO, action);
    }

    pub fn schedule_with_priority<F>(&mut self, priority: Priority, action: F)
    where
        F: FnOnce(&mut C, &mut Scheduler<C>) -> Result<()> + 'static,
    {
        self.schedule_with(priority, Duration::ZERO, action);
    }

    pub fn schedule_after<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce(&mut C, &mut Scheduler<C>) -> Result<()> + 'static,
    {
        self.schedule_with(Priority::default(), delay, action);
    }

    /// Submit `action` to run `delay` from now. A zero delay is "immediate".
    ///
    /// The task becomes visible to `run` only after the currently executing
    /// action returns.
    pub fn schedule_with<F>(&mut self, priority: Priority, delay: Duration, action: F)
    where
        F: FnOnce(&mut C, &mut Scheduler<C>) -> Result<()> + 'static,
    {
        let due = if delay.is_zero() {
            Due::Immediate
        } else {
            Due::At(self.clock.now() + delay)
        };
        self.submitted.push(Task {
            due,
            priority,
            action: Box::new(action),
        });
    }

    fn merge_submitted(&mut self) {
        if self.submitted.is_empty() {
            return;
        }
        // stable: equal keys keep submission order
        self.submitted.sort_by_key(Task::key);

        let mut old = std::mem::take(&mut self.pending).into_iter().peekable();
        let mut new = self.submitted.drain(..).peekable();
        let mut merged = VecDeque::with_capacity(old.len() + new.len());
        loop {
            // already-pending tasks stay ahead of new ones on equal keys
            let take_old = match (old.peek(), new.peek()) {
                (Some(a), Some(b)) => a.key() <= b.key(),
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            merged.extend(if take_old { old.next() } else { new.next() });
        }
        self.pending = merged;
    }

    /// Execute tasks in `(due, priority)` order until none remain.
    ///
    /// Blocks the thread while the earliest task is not yet due. An action
    /// returning `Err` stops the loop; tasks not yet run stay pending.
    pub fn run(&mut self, ctx: &mut C) -> Result<()> {
        loop {
            self.merge_submitted();
            let Some(task) = self.pending.pop_front() else {
                return Ok(());
            };
            if let Due::At(deadline) = task.due {
                self.clock.sleep_until(deadline);
            }
            tracing::trace!(priority = task.priority.0, pending = self.pending.len(), "run task");

            if let Err(e) = (task.action)(ctx, self) {
                self.merge_submitted();
                tracing::error!(error = %e, pending = self.pending.len(), "scheduled action failed");
                return Err(e);
            }

            if let Some(hook) = self.after_step.as_mut() {
                hook(ctx);
            }
        }
    }
}
