//! Clock and deferred-task plumbing for the ad unit.

use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce()>;

/// Time source and one-shot timer, the equivalent of `Date.now` plus `setTimeout`
pub trait Scheduler {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;

    /// Run `task` once, `delay` from now
    fn schedule_once(&mut self, delay: Duration, task: Task);
}

#[derive(Default)]
struct ManualClock {
    now: Duration,
    next_seq: u64,
    pending: Vec<(Duration, u64, Task)>,
}

/// A virtual clock that only moves when [`ManualScheduler::advance`] is called
///
/// Clones share the same clock, so a test can keep one handle while the ad
/// unit owns another.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward and run every task that has come due
    ///
    /// Tasks run in due order, ties broken by scheduling order. Returns the
    /// number of tasks that ran.
    pub fn advance(&self, by: Duration) -> usize {
        let mut due = {
            let mut clock = self.clock.borrow_mut();
            clock.now += by;
            let now = clock.now;

            let (due, pending): (Vec<_>, Vec<_>) = clock
                .pending
                .drain(..)
                .partition(|(at, _, _)| *at <= now);
            clock.pending = pending;
            due
        };

        due.sort_by_key(|(at, seq, _)| (*at, *seq));
        let count = due.len();

        // The clock borrow is released so tasks may schedule more work
        for (_, _, task) in due {
            task();
        }

        count
    }

    /// Number of tasks still waiting for their deadline
    pub fn pending(&self) -> usize {
        self.clock.borrow().pending.len()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.clock.borrow().now
    }

    fn schedule_once(&mut self, delay: Duration, task: Task) {
        let mut clock = self.clock.borrow_mut();
        let at = clock.now + delay;
        let seq = clock.next_seq;
        clock.next_seq += 1;
        clock.pending.push((at, seq, task));
    }
}

/// Scheduler backed by the Tokio timer
///
/// Tasks are spawned with `spawn_local`, so calls to
/// [`Scheduler::schedule_once`] must happen inside a `tokio::task::LocalSet`.
/// Outside any Tokio runtime the task is dropped with a warning.
pub struct TokioScheduler {
    origin: tokio::time::Instant,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule_once(&mut self, delay: Duration, task: Task) {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("No Tokio runtime, dropping task scheduled in {:?}", delay);
            return;
        }

        debug!("Scheduling task in {:?}", delay);
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}
