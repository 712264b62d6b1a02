#![forbid(unsafe_code)]

//! Host traits: the boundary between the coordinator and the platform view
//! hierarchy.
//!
//! The runtime never touches platform views directly. Everything it reads
//! (geometry, first responder, scroll metrics) and everything it writes
//! (insets, constraint constants, bounce) flows through these traits.
//! Concrete implementations:
//! - a platform binding owned by the embedder,
//! - [`HeadlessHost`](crate::headless::HeadlessHost) for tests and headless
//!   embedding.

use cscroll_core::geometry::{Point, Rect};
use cscroll_core::resolver::ViewGeometry;
use cscroll_core::scroll::ScrollMetrics;
use web_time::Duration;

/// How the scroll surface dismisses the keyboard on drag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyboardDismissMode {
    /// Dragging never dismisses the keyboard.
    #[default]
    None,
    /// The keyboard is dismissed when a drag begins.
    OnDrag,
    /// The keyboard follows the finger and can be dragged off screen.
    Interactive,
}

/// Layout state the inset strategies mutate.
///
/// All setters must be cheap and side-effect free beyond storing the value;
/// layout is applied later by [`LayoutHost::layout_if_needed`].
pub trait AdjustmentTarget {
    /// Additional bottom safe-area inset applied by the app.
    fn additional_bottom_inset(&self) -> f64;
    /// Store the additional bottom safe-area inset.
    fn set_additional_bottom_inset(&mut self, inset: f64);

    /// Constant of the constraint keeping content at least as tall as the
    /// scroll surface.
    fn content_min_height_constant(&self) -> f64;
    /// Store the minimum-height constraint constant.
    fn set_content_min_height_constant(&mut self, constant: f64);

    /// Constant of the scroll surface's trailing-edge (bottom) constraint.
    fn content_trailing_constant(&self) -> f64;
    /// Store the trailing-edge constraint constant.
    fn set_content_trailing_constant(&mut self, constant: f64);

    /// Bottom inset of the vertical scroll indicator.
    fn scroll_indicator_bottom_inset(&self) -> f64;
    /// Store the scroll-indicator bottom inset.
    fn set_scroll_indicator_bottom_inset(&mut self, inset: f64);

    /// Current keyboard dismiss mode of the scroll surface.
    fn keyboard_dismiss_mode(&self) -> KeyboardDismissMode;

    /// Whether vertical bouncing is enabled even for short content.
    fn always_bounce_vertical(&self) -> bool;
    /// Enable or disable vertical bouncing for short content.
    fn set_always_bounce_vertical(&mut self, enabled: bool);

    /// Scroll so that `rect`, in content coordinates, is visible.
    fn scroll_rect_to_visible(&mut self, rect: Rect, animated: bool);
}

/// Parameters of a spring animation scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    /// Total duration.
    pub duration: Duration,
    /// Spring damping ratio; `1.0` is critically damped.
    pub damping: f64,
    /// Initial spring velocity.
    pub initial_velocity: f64,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(500),
            damping: 1.0,
            initial_velocity: 0.0,
        }
    }
}

/// The view hierarchy hosting the scroll surface.
pub trait LayoutHost: AdjustmentTarget {
    /// Geometry of the view in its window, or `None` when the view is not in
    /// a window.
    fn view_geometry(&self) -> Option<ViewGeometry>;

    /// Whether the user is currently dragging the keyboard off screen.
    fn is_interactive_dismiss_in_progress(&self) -> bool;

    /// Lay out the focused text input without animation, so its text does
    /// not animate in from a stale frame.
    fn layout_without_animation(&mut self);

    /// Apply pending layout changes now.
    fn layout_if_needed(&mut self);

    /// Run `changes` inside an animation scope described by `spec`.
    ///
    /// Implementations must call `changes` exactly once, synchronously.
    fn animate(&mut self, spec: AnimationSpec, changes: &mut dyn FnMut(&mut Self))
    where
        Self: Sized;

    /// Frame of the first responder in scroll-content coordinates, if the
    /// first responder lives inside the scroll surface.
    fn first_responder_rect(&self) -> Option<Rect>;

    /// Current scrolling state of the scroll surface.
    fn scroll_metrics(&self) -> ScrollMetrics;

    /// Move the content offset without animation.
    fn set_content_offset(&mut self, offset: Point);
}
