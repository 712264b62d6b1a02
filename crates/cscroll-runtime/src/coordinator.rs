#![forbid(unsafe_code)]

//! Keyboard visibility coordination.
//!
//! [`KeyboardVisibilityCoordinator`] owns the whole pipeline for one scroll
//! surface: it subscribes to an injected event source, turns each keyboard
//! notification into a reconstructed keyboard frame, debounces the frames,
//! and when a frame settles resolves the overlap against the host's current
//! geometry and applies it inside a single animation scope.
//!
//! # State machine
//!
//! ```text
//!   Idle --settle(overlap > 0)--> Adjusting { inset }
//!   Adjusting --settle(overlap > 0)--> Adjusting { inset' }
//!   Adjusting --settle(overlap == 0)--> Idle
//! ```
//!
//! Events only feed the filter; the visible transition happens when the
//! filter settles (or is flushed).
//!
//! # Settle order
//!
//! Inside one `animate` scope:
//! 1. bounce adjustment,
//! 2. strategy mutation,
//! 3. `layout_if_needed`,
//! 4. first-responder scroll, when the overlap is non-zero and enabled.
//!
//! # Ownership
//!
//! The coordinator holds the host weakly and is owned by the embedder.
//! Event handlers and the filter observer hold the coordinator weakly, so
//! dropping it unsubscribes, cancels the pending timer, and breaks every
//! reference cycle.
//!
//! # Failure Modes
//!
//! - **Host gone or view not in a window**: events and settlements are
//!   ignored (logged at `trace`).
//! - **Non-"will" event passed to [`handle_event`]**: `debug_assert!`
//!   failure; ignored with a warning in release builds.
//! - **Host already borrowed** when an event arrives or a frame settles:
//!   the event or settlement is dropped with a warning.
//!
//! [`handle_event`]: KeyboardVisibilityCoordinator::handle_event

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use cscroll_core::event::{KeyboardEvent, KeyboardEventKind, Visibility};
use cscroll_core::geometry::{Point, Rect};
use cscroll_core::resolver::{self, GeometryResolver};
use cscroll_core::scroll::{self, ScrollMetrics};
use tracing::{debug, trace, warn};

use crate::bounce::BounceController;
use crate::config::KeyboardConfig;
use crate::event_source::{KeyboardEventSource, KeyboardHandler, ListenerId};
use crate::filter::CoalescingFilter;
use crate::host::{KeyboardDismissMode, LayoutHost};
use crate::scheduler::Scheduler;
use crate::strategy::InsetAdjustmentStrategy;

/// Observable keyboard adjustment state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum KeyboardState {
    /// No keyboard overlap is applied.
    #[default]
    Idle,
    /// A non-zero overlap is applied.
    Adjusting {
        /// The applied overlap.
        inset: f64,
    },
}

impl KeyboardState {
    /// Applied overlap, `0.0` when idle.
    #[must_use]
    pub const fn inset(&self) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::Adjusting { inset } => *inset,
        }
    }

    /// Whether an overlap is applied.
    #[must_use]
    pub const fn is_adjusting(&self) -> bool {
        matches!(self, Self::Adjusting { .. })
    }

    fn from_overlap(overlap: f64) -> Self {
        if overlap == 0.0 {
            Self::Idle
        } else {
            Self::Adjusting { inset: overlap }
        }
    }
}

/// Scroll state captured when a container size transition begins.
///
/// While the transition runs, keyboard events are held by the suspended
/// filter. Use [`pinned_offset`](Self::pinned_offset) (or
/// [`KeyboardVisibilityCoordinator::pin_content_offset`]) alongside the
/// transition animation, then hand the value back to
/// [`KeyboardVisibilityCoordinator::end_size_transition`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use = "pass the transition to end_size_transition"]
pub struct SizeTransition {
    initial: ScrollMetrics,
}

impl SizeTransition {
    /// Scroll metrics at the start of the transition.
    #[must_use]
    pub const fn initial_metrics(&self) -> &ScrollMetrics {
        &self.initial
    }

    /// Content offset that keeps the content's top-left corner where it was,
    /// clamped into the legal range for `current`.
    #[must_use]
    pub fn pinned_offset(&self, current: &ScrollMetrics) -> Point {
        let pinned = scroll::pin_top_left(
            self.initial.content_offset,
            self.initial.adjusted_inset,
            current.adjusted_inset,
        );
        scroll::constrain_content_offset(pinned, current)
    }
}

struct Attachment {
    source: Rc<dyn KeyboardEventSource>,
    listeners: Vec<ListenerId>,
}

struct Core<H> {
    host: Weak<RefCell<H>>,
    config: KeyboardConfig,
    filter: CoalescingFilter<Option<Rect>>,
    strategy: RefCell<Box<dyn InsetAdjustmentStrategy>>,
    bounce: RefCell<BounceController>,
    state: Cell<KeyboardState>,
    attachment: RefCell<Option<Attachment>>,
}

impl<H: LayoutHost + 'static> Core<H> {
    fn handle_event(&self, event: &KeyboardEvent) {
        debug_assert!(
            event.visibility().is_some(),
            "unexpected keyboard event kind {:?}",
            event.kind
        );
        let Some(visibility) = event.visibility() else {
            warn!(kind = ?event.kind, "ignoring unclassified keyboard event");
            return;
        };
        let Some(host) = self.host.upgrade() else {
            trace!("host dropped; ignoring keyboard event");
            return;
        };

        let (frame, flush_now) = {
            let Ok(mut host) = host.try_borrow_mut() else {
                warn!("host is borrowed; dropping keyboard event");
                return;
            };
            let Some(geometry) = host.view_geometry() else {
                trace!("view not in a window; ignoring keyboard event");
                return;
            };
            // Keeps focused text from animating in from a stale frame.
            host.layout_without_animation();

            let frame = resolver::keyboard_frame(
                visibility,
                event.end_frame.standardized().size(),
                geometry.window_height(),
            );
            let flush_now = visibility == Visibility::Hiding
                && host.keyboard_dismiss_mode() != KeyboardDismissMode::None
                && host.is_interactive_dismiss_in_progress();
            (frame, flush_now)
        };

        debug!(
            target: "cscroll.keyboard",
            visibility = ?visibility,
            keyboard_height = frame.height,
            "keyboard event queued"
        );
        self.filter.set(Some(frame));

        if flush_now && !self.filter.is_suspended() {
            debug!(target: "cscroll.keyboard", "interactive dismiss; settling immediately");
            self.filter.flush();
        }
    }

    fn settle(&self, frame: Option<Rect>) {
        let Some(frame) = frame else {
            return;
        };
        let Some(host) = self.host.upgrade() else {
            trace!("host dropped; ignoring settled keyboard frame");
            return;
        };
        let Ok(mut host) = host.try_borrow_mut() else {
            warn!("host is borrowed; dropping settled keyboard frame");
            return;
        };
        let Some(geometry) = host.view_geometry() else {
            trace!("view not in a window; ignoring settled keyboard frame");
            return;
        };

        let overlap = GeometryResolver::resolve(frame, &geometry);
        let mut strategy = self.strategy.borrow_mut();
        let mut bounce = self.bounce.borrow_mut();
        let _span = tracing::debug_span!(
            "keyboard.settle",
            overlap = overlap,
            strategy = %strategy.name(),
        )
        .entered();

        let scroll_to_responder = overlap != 0.0 && self.config.scroll_first_responder_to_visible;
        let margin = self.config.visibility_scroll_margin;

        host.animate(self.config.animation_spec(), &mut |host: &mut H| {
            bounce.update(&mut *host, overlap);
            strategy.apply(&mut *host, overlap);
            host.layout_if_needed();
            if scroll_to_responder {
                scroll_first_responder(host, true, margin);
            }
        });

        let state = KeyboardState::from_overlap(overlap);
        self.state.set(state);
        debug!(
            target: "cscroll.keyboard",
            overlap,
            adjusting = state.is_adjusting(),
            "keyboard adjustment applied"
        );
    }

    fn detach(&self) {
        let Some(attachment) = self.attachment.borrow_mut().take() else {
            return;
        };
        for id in attachment.listeners {
            attachment.source.unsubscribe(id);
        }
        trace!("keyboard coordinator detached");
    }
}

fn scroll_first_responder<H: LayoutHost>(host: &mut H, animated: bool, margin: f64) -> bool {
    let Some(rect) = host.first_responder_rect() else {
        return false;
    };
    host.scroll_rect_to_visible(expand_vertically(rect, margin), animated);
    true
}

fn expand_vertically(rect: Rect, margin: f64) -> Rect {
    rect.inset_by(0.0, -margin)
}

/// Keeps one scroll surface clear of the on-screen keyboard.
///
/// # Thread Safety
///
/// `!Send`. Lives on the UI thread together with its host, event source, and
/// scheduler.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use cscroll_core::geometry::Rect;
/// use cscroll_core::KeyboardEvent;
/// use cscroll_runtime::{
///     EventBus, HeadlessHost, KeyboardConfig, KeyboardVisibilityCoordinator, ManualScheduler,
/// };
///
/// let window = Rect::from_size(390.0, 800.0);
/// let host = Rc::new(RefCell::new(HeadlessHost::fullscreen(window, 20.0)));
/// let scheduler = Rc::new(ManualScheduler::new());
/// let bus = Rc::new(EventBus::new());
///
/// let coordinator =
///     KeyboardVisibilityCoordinator::new(&host, scheduler.clone(), KeyboardConfig::default());
/// coordinator.attach(bus.clone());
///
/// bus.post(KeyboardEvent::will_show(Rect::from_size(390.0, 300.0)));
/// scheduler.advance(Duration::from_millis(150));
///
/// assert_eq!(coordinator.state().inset(), 280.0);
/// assert_eq!(host.borrow().layout.additional_bottom_inset, 280.0);
/// ```
pub struct KeyboardVisibilityCoordinator<H: LayoutHost + 'static> {
    core: Rc<Core<H>>,
}

impl<H: LayoutHost + 'static> KeyboardVisibilityCoordinator<H> {
    /// Create a coordinator for `host`, using the strategy selected by
    /// `config`.
    #[must_use]
    pub fn new(host: &Rc<RefCell<H>>, scheduler: Rc<dyn Scheduler>, config: KeyboardConfig) -> Self {
        let filter = CoalescingFilter::new(None, scheduler).with_delay(config.debounce_delay());
        let strategy = config.strategy_kind().into_strategy();
        let core = Rc::new(Core {
            host: Rc::downgrade(host),
            strategy: RefCell::new(strategy),
            config,
            filter,
            bounce: RefCell::new(BounceController::new()),
            state: Cell::new(KeyboardState::Idle),
            attachment: RefCell::new(None),
        });

        let weak: Weak<Core<H>> = Rc::downgrade(&core);
        core.filter.on_settle(move |frame: &Option<Rect>| {
            if let Some(core) = weak.upgrade() {
                core.settle(*frame);
            }
        });

        Self { core }
    }

    /// Replace the strategy selected by the configuration.
    #[must_use]
    pub fn with_strategy(self, strategy: impl InsetAdjustmentStrategy + 'static) -> Self {
        self.set_strategy(strategy);
        self
    }

    /// Replace the active strategy. Takes effect at the next settlement.
    pub fn set_strategy(&self, strategy: impl InsetAdjustmentStrategy + 'static) {
        *self.core.strategy.borrow_mut() = Box::new(strategy);
    }

    /// Name of the active strategy.
    #[must_use]
    pub fn strategy_name(&self) -> String {
        self.core.strategy.borrow().name().to_owned()
    }

    /// Subscribe to will-show and will-hide notifications from `source`.
    ///
    /// Replaces any previous attachment.
    pub fn attach(&self, source: Rc<dyn KeyboardEventSource>) {
        self.core.detach();
        let listeners = [KeyboardEventKind::WillShow, KeyboardEventKind::WillHide]
            .into_iter()
            .map(|kind| {
                let weak = Rc::downgrade(&self.core);
                let handler: KeyboardHandler = Rc::new(move |event: &KeyboardEvent| {
                    if let Some(core) = weak.upgrade() {
                        core.handle_event(event);
                    }
                });
                source.subscribe(kind, handler)
            })
            .collect();
        *self.core.attachment.borrow_mut() = Some(Attachment { source, listeners });
        trace!("keyboard coordinator attached");
    }

    /// Unsubscribe from the attached source, if any.
    pub fn detach(&self) {
        self.core.detach();
    }

    /// Whether an event source is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.core.attachment.borrow().is_some()
    }

    /// Process one keyboard notification.
    ///
    /// Only will-show and will-hide are meaningful; anything else is a
    /// caller error.
    pub fn handle_event(&self, event: &KeyboardEvent) {
        self.core.handle_event(event);
    }

    /// Current adjustment state.
    #[must_use]
    pub fn state(&self) -> KeyboardState {
        self.core.state.get()
    }

    /// Whether a keyboard frame is waiting to settle.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.core.filter.is_pending()
    }

    /// Whether keyboard handling is suspended.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.core.filter.is_suspended()
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &KeyboardConfig {
        &self.core.config
    }

    /// Hold keyboard events until [`resume`](Self::resume).
    pub fn suspend(&self) {
        self.core.filter.suspend();
    }

    /// Release held keyboard events, settling them after the full delay.
    pub fn resume(&self) {
        self.core.filter.resume();
    }

    /// Settle the pending keyboard frame now.
    pub fn flush(&self) {
        self.core.filter.flush();
    }

    /// Drop the pending keyboard frame.
    pub fn cancel(&self) {
        self.core.filter.cancel();
    }

    /// Begin a container size transition (rotation, split-view resize).
    ///
    /// Suspends keyboard handling and captures the scroll state.
    pub fn begin_size_transition(&self) -> SizeTransition {
        self.suspend();
        let initial = self
            .core
            .host
            .upgrade()
            .map(|host| host.borrow().scroll_metrics())
            .unwrap_or_default();
        trace!("size transition started");
        SizeTransition { initial }
    }

    /// Move the host's content offset to `transition`'s pinned offset for the
    /// host's current scroll metrics. Returns the applied offset.
    pub fn pin_content_offset(&self, transition: &SizeTransition) -> Option<Point> {
        let host = self.core.host.upgrade()?;
        let mut host = host.borrow_mut();
        let offset = transition.pinned_offset(&host.scroll_metrics());
        host.set_content_offset(offset);
        Some(offset)
    }

    /// Finish a size transition, resuming keyboard handling.
    pub fn end_size_transition(&self, transition: SizeTransition) {
        self.resume();
        let offset = transition.initial.content_offset;
        trace!(
            initial_offset_x = offset.x,
            initial_offset_y = offset.y,
            "size transition finished"
        );
    }

    /// Scroll `rect` (content coordinates) into view, keeping `margin` of
    /// space above and below it. `None` uses the configured margin.
    pub fn scroll_rect_to_visible(&self, rect: Rect, animated: bool, margin: Option<f64>) {
        let Some(host) = self.core.host.upgrade() else {
            return;
        };
        let margin = margin.unwrap_or(self.core.config.visibility_scroll_margin);
        host.borrow_mut()
            .scroll_rect_to_visible(expand_vertically(rect, margin), animated);
    }

    /// Scroll the first responder into view. Returns `false` when there is
    /// no first responder in the scroll surface.
    pub fn scroll_first_responder_to_visible(&self, animated: bool, margin: Option<f64>) -> bool {
        let Some(host) = self.core.host.upgrade() else {
            return false;
        };
        let margin = margin.unwrap_or(self.core.config.visibility_scroll_margin);
        scroll_first_responder(&mut *host.borrow_mut(), animated, margin)
    }
}

impl<H: LayoutHost + 'static> Drop for KeyboardVisibilityCoordinator<H> {
    fn drop(&mut self) {
        self.core.detach();
        self.core.filter.cancel();
    }
}

impl<H: LayoutHost + 'static> std::fmt::Debug for KeyboardVisibilityCoordinator<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardVisibilityCoordinator")
            .field("state", &self.state())
            .field("strategy", &self.strategy_name())
            .field("pending", &self.is_pending())
            .field("suspended", &self.is_suspended())
            .field("attached", &self.is_attached())
            .finish()
    }
}
