#![forbid(unsafe_code)]

//! Cancellable one-shot delayed callbacks.
//!
//! The coalescing filter needs exactly one asynchronous primitive: "run this
//! closure after `delay`, unless cancelled first". [`Scheduler`] abstracts it
//! so the same filter runs against a wall clock in production and a virtual
//! clock in tests.
//!
//! # Implementations
//!
//! - [`ManualScheduler`]: virtual time, advanced explicitly. Deterministic.
//! - [`DeadlineScheduler`]: wall-clock deadlines that the host run loop
//!   drives with [`DeadlineScheduler::poll`]. Polling is independent of input
//!   handling, so timers keep firing while the user drags or scrolls.
//!
//! # Invariants
//!
//! 1. A cancelled timer never fires; `cancel` is synchronous and total.
//! 2. Due timers fire in deadline order; ties fire in scheduling order.
//! 3. No internal borrow is held while a callback runs, so callbacks may
//!    schedule or cancel re-entrantly.
//!
//! # Thread Safety
//!
//! Schedulers are `!Send`. Callbacks run on the thread that drives the
//! scheduler, which must be the thread that owns the view hierarchy.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use web_time::{Duration, Instant};

/// Opaque handle to a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A deferred callback.
pub type TimerCallback = Box<dyn FnOnce()>;

/// Schedules cancellable one-shot callbacks on the owning thread.
pub trait Scheduler {
    /// Run `callback` once, `delay` from now.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a scheduled callback.
    ///
    /// Returns `true` if the callback was still pending. Cancelling an id that
    /// already fired or was already cancelled is a no-op.
    fn cancel(&self, id: TimerId) -> bool;
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        (**self).schedule(delay, callback)
    }

    fn cancel(&self, id: TimerId) -> bool {
        (**self).cancel(id)
    }
}

/// Deadline-ordered timer storage shared by both schedulers.
///
/// Deadlines are offsets from the scheduler's epoch.
#[derive(Default)]
struct TimerQueue {
    next_id: u64,
    entries: BTreeMap<(Duration, TimerId), TimerCallback>,
    deadlines: HashMap<TimerId, Duration>,
}

impl TimerQueue {
    fn insert(&mut self, deadline: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert((deadline, id), callback);
        self.deadlines.insert(id, deadline);
        id
    }

    fn remove(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.entries.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pop the earliest entry if it is due at `limit`.
    fn pop_due(&mut self, limit: Duration) -> Option<(Duration, TimerCallback)> {
        let (&(deadline, id), _) = self.entries.iter().next()?;
        if deadline > limit {
            return None;
        }
        self.deadlines.remove(&id);
        self.entries
            .remove(&(deadline, id))
            .map(|callback| (deadline, callback))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Fire every timer due at `limit`, including ones scheduled by callbacks
/// that are themselves due. `on_fire` sees each deadline before its callback
/// runs.
fn fire_due(queue: &RefCell<TimerQueue>, limit: Duration, mut on_fire: impl FnMut(Duration)) -> usize {
    let mut fired = 0;
    loop {
        // The borrow ends before the callback runs.
        let Some((deadline, callback)) = queue.borrow_mut().pop_due(limit) else {
            break;
        };
        on_fire(deadline);
        callback();
        fired += 1;
    }
    if fired > 0 {
        tracing::trace!(fired, "scheduler fired due timers");
    }
    fired
}

// ---------------------------------------------------------------------------
// ManualScheduler
// ---------------------------------------------------------------------------

/// Scheduler driven by an explicit virtual clock.
///
/// Time only moves when [`advance`](Self::advance) is called. While
/// advancing, the clock steps to each due deadline before its callback runs,
/// so callbacks that reschedule see the time they fired at.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use cscroll_runtime::scheduler::{ManualScheduler, Scheduler};
///
/// let scheduler = ManualScheduler::new();
/// let fired = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&fired);
/// scheduler.schedule(Duration::from_millis(150), Box::new(move || flag.set(true)));
///
/// scheduler.advance(Duration::from_millis(149));
/// assert!(!fired.get());
/// scheduler.advance(Duration::from_millis(1));
/// assert!(fired.get());
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    queue: RefCell<TimerQueue>,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Move the clock forward by `by`, firing everything that becomes due.
    ///
    /// Returns the number of callbacks fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let fired = fire_due(&self.queue, target, |deadline| {
            if deadline > self.now.get() {
                self.now.set(deadline);
            }
        });
        self.now.set(target);
        fired
    }

    /// Advance until no timers remain, firing each in order.
    ///
    /// Stops after `max_timers` callbacks to bound self-rescheduling loops.
    pub fn run_until_idle(&self, max_timers: usize) -> usize {
        let mut fired = 0;
        while fired < max_timers {
            let Some(deadline) = self.queue.borrow().next_deadline() else {
                break;
            };
            let step = deadline.saturating_sub(self.now.get());
            fired += self.advance(step);
        }
        fired
    }

    /// Virtual time at which the next timer fires.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.borrow().next_deadline()
    }

    /// Number of scheduled, unfired timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let deadline = self.now.get() + delay;
        self.queue.borrow_mut().insert(deadline, callback)
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.queue.borrow_mut().remove(id)
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now.get())
            .field("pending", &self.pending_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// DeadlineScheduler
// ---------------------------------------------------------------------------

/// Wall-clock scheduler polled by the host run loop.
///
/// The host calls [`poll`](Self::poll) on every loop iteration (and can use
/// [`time_until_next`](Self::time_until_next) as its wait timeout). Because
/// the poll is not tied to any particular input mode, timers stay on time
/// during continuous touch or scroll input.
pub struct DeadlineScheduler {
    epoch: Instant,
    queue: RefCell<TimerQueue>,
}

impl DeadlineScheduler {
    /// Create a scheduler whose epoch is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            queue: RefCell::new(TimerQueue::default()),
        }
    }

    /// Fire every timer whose deadline has passed.
    ///
    /// Returns the number of callbacks fired.
    pub fn poll(&self) -> usize {
        self.poll_at(Instant::now())
    }

    /// Fire every timer due at `now`.
    pub fn poll_at(&self, now: Instant) -> usize {
        let limit = now.saturating_duration_since(self.epoch);
        fire_due(&self.queue, limit, |_| {})
    }

    /// Instant at which the next timer is due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue
            .borrow()
            .next_deadline()
            .map(|offset| self.epoch + offset)
    }

    /// Time until the next timer is due, zero if one is already overdue.
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Number of scheduled, unfired timers.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl Default for DeadlineScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for DeadlineScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let deadline = self.epoch.elapsed() + delay;
        self.queue.borrow_mut().insert(deadline, callback)
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.queue.borrow_mut().remove(id)
    }
}

impl std::fmt::Debug for DeadlineScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineScheduler")
            .field("epoch", &self.epoch)
            .field("pending", &self.pending_count())
            .finish()
    }
}
