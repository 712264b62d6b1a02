#![forbid(unsafe_code)]

//! Temporal coalescing of a single value.
//!
//! Keyboard notifications arrive in bursts: tapping an AutoFill suggestion
//! that moves focus to a password field can post a hide and two shows within
//! 100 ms, each with a different frame. Animating each one would visibly
//! jerk the layout. [`CoalescingFilter`] collapses such a burst into one
//! settled value that is delivered after a quiet period.
//!
//! # Design
//!
//! Each [`set`](CoalescingFilter::set) of a new raw value (re)starts a single
//! one-shot timer on the injected [`Scheduler`]. When the timer fires, the
//! latest raw value becomes the settled value and the registered observer is
//! called synchronously with it.
//!
//! Suspension exists for size transitions such as rotation: intermediate
//! frames posted during the transition are meaningless, so while suspended
//! no timer runs; the latest value is remembered and a fresh full-delay timer
//! starts on [`resume`](CoalescingFilter::resume).
//!
//! # Invariants
//!
//! 1. At most one timer is outstanding per filter.
//! 2. `set(v)` where `v` equals the previous raw value is a no-op.
//! 3. The observer always receives the most recent raw value at the moment
//!    of firing or flushing, never an intermediate one.
//! 4. `cancel`, `suspend`, and drop never notify the observer.
//!
//! # Failure Modes
//!
//! - **Precondition violations** (`flush` or `suspend` while suspended,
//!   `resume` while not suspended) fail a `debug_assert!`. Release builds log
//!   a warning and ignore the call.
//! - **Re-entrant use**: the observer may call back into the filter; no
//!   internal borrow is held while it runs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{trace, warn};
use web_time::Duration;

use crate::scheduler::{Scheduler, TimerId};

/// Default quiet period before a value settles.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(150);

type Observer<T> = Box<dyn FnMut(&T)>;

struct FilterState<T> {
    /// Last raw value passed to `set`.
    latest: Option<T>,
    /// Last value delivered to the observer (or the initial value).
    settled: T,
    suspended: bool,
    /// A timer was pending at suspend time, or `set` ran while suspended.
    restart_on_resume: bool,
    timer: Option<TimerId>,
}

struct FilterInner<T> {
    state: RefCell<FilterState<T>>,
    observer: RefCell<Option<Observer<T>>>,
    scheduler: Rc<dyn Scheduler>,
    delay: Cell<Duration>,
}

impl<T: Clone> FilterInner<T> {
    fn fire(&self) {
        let value = {
            let mut state = self.state.borrow_mut();
            state.timer = None;
            let Some(latest) = state.latest.clone() else {
                return;
            };
            state.settled = latest.clone();
            latest
        };
        trace!("coalescing filter settled");
        self.notify(&value);
    }

    fn notify(&self, value: &T) {
        // Take the observer out so it can re-enter the filter.
        let Some(mut observer) = self.observer.borrow_mut().take() else {
            return;
        };
        observer(value);
        let mut slot = self.observer.borrow_mut();
        if slot.is_none() {
            *slot = Some(observer);
        }
    }
}

impl<T> Drop for FilterInner<T> {
    fn drop(&mut self) {
        if let Some(id) = self.state.get_mut().timer.take() {
            self.scheduler.cancel(id);
        }
    }
}

/// Debounces a stream of values into settled values.
///
/// # Thread Safety
///
/// `CoalescingFilter` is `!Send`. It must live on the thread that drives its
/// scheduler; the observer runs on that same thread.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use cscroll_runtime::filter::CoalescingFilter;
/// use cscroll_runtime::scheduler::ManualScheduler;
///
/// let scheduler = Rc::new(ManualScheduler::new());
/// let filter = CoalescingFilter::new(0.0_f64, scheduler.clone());
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// filter.on_settle(move |v| sink.borrow_mut().push(*v));
///
/// filter.set(120.0);
/// scheduler.advance(Duration::from_millis(10));
/// filter.set(260.0);
/// scheduler.advance(Duration::from_millis(150));
///
/// assert_eq!(*seen.borrow(), vec![260.0]);
/// ```
pub struct CoalescingFilter<T> {
    inner: Rc<FilterInner<T>>,
}

impl<T: Clone + PartialEq + 'static> CoalescingFilter<T> {
    /// Create a filter whose settled value starts as `initial`.
    #[must_use]
    pub fn new(initial: T, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(FilterInner {
                state: RefCell::new(FilterState {
                    latest: None,
                    settled: initial,
                    suspended: false,
                    restart_on_resume: false,
                    timer: None,
                }),
                observer: RefCell::new(None),
                scheduler,
                delay: Cell::new(DEFAULT_DELAY),
            }),
        }
    }

    /// Set the quiet period. Applies to timers started after this call.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        self.inner.delay.set(delay);
        self
    }

    /// Register the observer, replacing any previous one.
    pub fn on_settle(&self, observer: impl FnMut(&T) + 'static) {
        *self.inner.observer.borrow_mut() = Some(Box::new(observer));
    }

    /// Record a raw value and restart the quiet period.
    ///
    /// A value equal to the previous raw value does not restart the timer.
    pub fn set(&self, value: T) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.latest.as_ref() == Some(&value) {
                trace!("coalescing filter ignored unchanged value");
                return;
            }
            state.latest = Some(value);
        }
        self.start_timer();
    }

    /// Drop any pending timer without notifying. The settled value is kept.
    pub fn cancel(&self) {
        let timer = {
            let mut state = self.inner.state.borrow_mut();
            state.restart_on_resume = false;
            state.timer.take()
        };
        if let Some(id) = timer {
            self.inner.scheduler.cancel(id);
            trace!("coalescing filter cancelled");
        }
    }

    /// Settle the pending value now instead of waiting for the timer.
    ///
    /// Does nothing when no timer is pending. Must not be called while
    /// suspended.
    pub fn flush(&self) {
        let timer = {
            let mut state = self.inner.state.borrow_mut();
            debug_assert!(!state.suspended, "flush is not supported while suspended");
            if state.suspended {
                warn!("coalescing filter flushed while suspended; ignoring");
                return;
            }
            state.timer.take()
        };
        if let Some(id) = timer {
            self.inner.scheduler.cancel(id);
            trace!("coalescing filter flushed");
            self.inner.fire();
        }
    }

    /// Stop the timer until [`resume`](Self::resume), remembering whether
    /// it was running.
    pub fn suspend(&self) {
        let timer = {
            let mut state = self.inner.state.borrow_mut();
            debug_assert!(!state.suspended, "filter is already suspended");
            if state.suspended {
                warn!("coalescing filter suspended twice; ignoring");
                return;
            }
            state.suspended = true;
            state.restart_on_resume = state.timer.is_some();
            state.timer.take()
        };
        if let Some(id) = timer {
            self.inner.scheduler.cancel(id);
        }
        trace!("coalescing filter suspended");
    }

    /// Leave the suspended state, restarting a full-delay timer if a value
    /// is waiting to settle.
    pub fn resume(&self) {
        let restart = {
            let mut state = self.inner.state.borrow_mut();
            debug_assert!(state.suspended, "filter is not suspended");
            if !state.suspended {
                warn!("coalescing filter resumed while not suspended; ignoring");
                return;
            }
            state.suspended = false;
            std::mem::take(&mut state.restart_on_resume)
        };
        trace!(restart, "coalescing filter resumed");
        if restart {
            self.start_timer();
        }
    }

    /// The last value delivered to the observer, or the initial value.
    #[must_use]
    pub fn settled(&self) -> T {
        self.inner.state.borrow().settled.clone()
    }

    /// The last raw value passed to [`set`](Self::set).
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.inner.state.borrow().latest.clone()
    }

    /// Whether a timer is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.state.borrow().timer.is_some()
    }

    /// Whether the filter is suspended.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.inner.state.borrow().suspended
    }

    /// Whether resuming will start a timer.
    #[must_use]
    pub fn has_deferred_restart(&self) -> bool {
        self.inner.state.borrow().restart_on_resume
    }

    /// Current quiet period.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.inner.delay.get()
    }

    fn start_timer(&self) {
        let previous = {
            let mut state = self.inner.state.borrow_mut();
            if state.suspended {
                state.restart_on_resume = true;
                return;
            }
            state.restart_on_resume = false;
            state.timer.take()
        };
        if let Some(id) = previous {
            self.inner.scheduler.cancel(id);
        }

        let weak: Weak<FilterInner<T>> = Rc::downgrade(&self.inner);
        let delay = self.inner.delay.get();
        let id = self.inner.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.fire();
                }
            }),
        );
        self.inner.state.borrow_mut().timer = Some(id);
        trace!(delay_ms = delay.as_millis() as u64, "coalescing filter scheduled");
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for CoalescingFilter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("CoalescingFilter")
            .field("latest", &state.latest)
            .field("settled", &state.settled)
            .field("suspended", &state.suspended)
            .field("restart_on_resume", &state.restart_on_resume)
            .field("pending", &state.timer.is_some())
            .field("delay", &self.inner.delay.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    const MS: Duration = Duration::from_millis(1);

    fn filter_with_log() -> (Rc<ManualScheduler>, CoalescingFilter<f64>, Rc<RefCell<Vec<f64>>>) {
        let scheduler = Rc::new(ManualScheduler::new());
        let filter = CoalescingFilter::new(0.0, scheduler.clone());
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        filter.on_settle(move |v| sink.borrow_mut().push(*v));
        (scheduler, filter, log)
    }

    #[test]
    fn new_filter_is_idle() {
        let (scheduler, filter, log) = filter_with_log();
        assert!(!filter.is_pending());
        assert!(!filter.is_suspended());
        assert_eq!(filter.settled(), 0.0);
        assert_eq!(filter.latest(), None);
        assert_eq!(filter.delay(), DEFAULT_DELAY);
        assert_eq!(scheduler.pending_count(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn burst_settles_once_with_last_value() {
        let (scheduler, filter, log) = filter_with_log();
        filter.set(120.0);
        scheduler.advance(MS * 10);
        filter.set(0.0);
        scheduler.advance(MS * 10);
        filter.set(260.0);

        scheduler.advance(MS * 149);
        assert!(log.borrow().is_empty());
        scheduler.advance(MS);
        assert_eq!(*log.borrow(), vec![260.0]);
        assert_eq!(filter.settled(), 260.0);
        assert!(!filter.is_pending());
    }

    #[test]
    fn spaced_values_each_settle() {
        let (scheduler, filter, log) = filter_with_log();
        filter.set(100.0);
        scheduler.advance(MS * 200);
        filter.set(0.0);
        scheduler.advance(MS * 200);
        assert_eq!(*log.borrow(), vec![100.0, 0.0]);
    }

    #[test]
    fn unchanged_raw_value_does_not_restart_timer() {
        let (scheduler, filter, log) = filter_with_log();
        filter.set(50.0);
        scheduler.advance(MS * 100);
        filter.set(50.0);
        scheduler.advance(MS * 50);
        assert_eq!(*log.borrow(), vec![50.0]);
    }

    #[test]
    fn raw_value_equal_to_settled_still_schedules() {
        let (scheduler, filter, log) = filter_with_log();
        filter.set(0.0);
        assert!(filter.is_pending());
        scheduler.advance(MS * 150);
        assert_eq!(*log.borrow(), vec![0.0]);
    }

    #[test]
    fn flush_fires_synchronously_and_only_once() {
        let (scheduler, filter, log) = filter_with_log();
        filter.set(90.0);
        scheduler.advance(MS * 50);
        filter.flush();
        assert_eq!(*log.borrow(), vec![90.0]);
        assert!(!filter.is_pending());

        scheduler.advance(MS * 500);
        assert_eq!(*log.borrow(), vec![90.0]);
    }

    #[test]
    fn flush_without_pending_timer_is_noop() {
        let (_scheduler, filter, log) = filter_with_log();
        filter.flush();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn cancel_drops_pending_without_notifying() {
        let (scheduler, filter, log) = filter_with_log();
        filter.set(75.0);
        filter.cancel();
        scheduler.advance(MS * 500);
        assert!(log.borrow().is_empty());
        assert_eq!(filter.settled(), 0.0);
        assert_eq!(filter.latest(), Some(75.0));
    }

    #[test]
    fn suspend_resume_without_pending_never_fires() {
        let (scheduler, filter, log) = filter_with_log();
        filter.suspend();
        assert!(!filter.has_deferred_restart());
        filter.resume();
        scheduler.advance(MS * 500);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn resume_restarts_full_delay_for_pending_value() {
        let (scheduler, filter, log) = filter_with_log();
        filter.set(200.0);
        scheduler.advance(MS * 100);
        filter.suspend();
        assert!(filter.has_deferred_restart());
        scheduler.advance(MS * 1000);
        assert!(log.borrow().is_empty());

        filter.resume();
        scheduler.advance(MS * 149);
        assert!(log.borrow().is_empty());
        scheduler.advance(MS);
        assert_eq!(*log.borrow(), vec![200.0]);
    }

    #[test]
    fn set_while_suspended_is_deferred() {
        let (scheduler, filter, log) = filter_with_log();
        filter.suspend();
        filter.set(10.0);
        filter.set(300.0);
        assert!(!filter.is_pending());
        assert_eq!(scheduler.pending_count(), 0);
        scheduler.advance(MS * 1000);
        assert!(log.borrow().is_empty());

        filter.resume();
        scheduler.advance(MS * 150);
        assert_eq!(*log.borrow(), vec![300.0]);
    }

    #[test]
    fn cancel_while_suspended_clears_deferred_restart() {
        let (scheduler, filter, log) = filter_with_log();
        filter.suspend();
        filter.set(10.0);
        filter.cancel();
        filter.resume();
        scheduler.advance(MS * 1000);
        assert!(log.borrow().is_empty());
    }

    #[test]
    #[should_panic(expected = "flush is not supported while suspended")]
    #[cfg(debug_assertions)]
    fn flush_while_suspended_is_a_precondition_failure() {
        let (_scheduler, filter, _log) = filter_with_log();
        filter.suspend();
        filter.flush();
    }

    #[test]
    #[should_panic(expected = "already suspended")]
    #[cfg(debug_assertions)]
    fn double_suspend_is_a_precondition_failure() {
        let (_scheduler, filter, _log) = filter_with_log();
        filter.suspend();
        filter.suspend();
    }

    #[test]
    #[should_panic(expected = "not suspended")]
    #[cfg(debug_assertions)]
    fn resume_without_suspend_is_a_precondition_failure() {
        let (_scheduler, filter, _log) = filter_with_log();
        filter.resume();
    }

    #[test]
    fn custom_delay_is_honored() {
        let scheduler = Rc::new(ManualScheduler::new());
        let filter = CoalescingFilter::new(0_u32, scheduler.clone()).with_delay(MS * 40);
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        filter.on_settle(move |_| sink.set(sink.get() + 1));

        filter.set(1);
        scheduler.advance(MS * 39);
        assert_eq!(hits.get(), 0);
        scheduler.advance(MS);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn dropping_filter_cancels_timer() {
        let (scheduler, filter, log) = filter_with_log();
        filter.set(42.0);
        assert_eq!(scheduler.pending_count(), 1);
        drop(filter);
        assert_eq!(scheduler.pending_count(), 0);
        scheduler.advance(MS * 500);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn observer_may_reenter_filter() {
        let scheduler = Rc::new(ManualScheduler::new());
        let filter = Rc::new(CoalescingFilter::new(0.0_f64, scheduler.clone()));
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let weak = Rc::downgrade(&filter);
        filter.on_settle(move |v| {
            sink.borrow_mut().push(*v);
            if *v > 0.0 {
                if let Some(filter) = weak.upgrade() {
                    filter.set(0.0);
                }
            }
        });

        filter.set(10.0);
        scheduler.advance(MS * 150);
        scheduler.advance(MS * 150);
        assert_eq!(*log.borrow(), vec![10.0, 0.0]);
    }

    #[test]
    fn replacing_observer_inside_callback_keeps_replacement() {
        let scheduler = Rc::new(ManualScheduler::new());
        let filter = Rc::new(CoalescingFilter::new(0_i32, scheduler.clone()));
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let weak = Rc::downgrade(&filter);
        filter.on_settle(move |v| {
            sink.borrow_mut().push(("first", *v));
            if let Some(filter) = weak.upgrade() {
                let sink = Rc::clone(&sink);
                filter.on_settle(move |v| sink.borrow_mut().push(("second", *v)));
            }
        });

        filter.set(1);
        scheduler.advance(MS * 150);
        filter.set(2);
        scheduler.advance(MS * 150);
        assert_eq!(*log.borrow(), vec![("first", 1), ("second", 2)]);
    }
}
