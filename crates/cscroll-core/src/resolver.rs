#![forbid(unsafe_code)]

//! Keyboard overlap resolution.
//!
//! Converts a keyboard notification into the height by which the keyboard
//! intrudes into a target view, after discounting the part of the view's
//! bottom safe area that already keeps content clear of the keyboard.
//!
//! # Pipeline
//!
//! 1. [`keyboard_frame`]: rebuild a trustworthy keyboard rectangle from the
//!    reported size alone, flush with the bottom of the window (or just
//!    below it when hiding).
//! 2. Intersect it with the view's frame in window space.
//! 3. Express the intersection in the view's local space and take its height.
//! 4. Subtract the system inset `safe_area_bottom - additional_bottom`,
//!    clamping the result at zero. A system inset that is negative or
//!    non-finite counts as zero, so a hiding keyboard always resolves to zero.
//!
//! Step 4 discounts the system-reserved bottom region (home indicator and
//! friends) but adds back the additional inset that a previous adjustment
//! applied, so a prior adjustment never feeds back into the next one.
//!
//! # Invariants
//!
//! 1. Every function is pure: equal inputs give bit-identical outputs.
//! 2. [`overlap`] is finite and `>= 0` for all inputs, including NaN and
//!    negative sizes.
//! 3. [`overlap`] is `0` when the keyboard frame does not intersect the view.
//!
//! # Example
//!
//! ```
//! use cscroll_core::geometry::{Rect, Size};
//! use cscroll_core::resolver::{self, ViewGeometry};
//! use cscroll_core::Visibility;
//!
//! let window = Rect::from_size(390.0, 800.0);
//! let geometry = ViewGeometry::fullscreen(window, 20.0, 0.0);
//! let keyboard = resolver::keyboard_frame(Visibility::Showing, Size::new(390.0, 300.0), 800.0);
//! assert_eq!(resolver::overlap(keyboard, &geometry), 280.0);
//! ```

use crate::event::{KeyboardEvent, Visibility};
use crate::geometry::{Rect, Size};

/// Geometry of the target view, read from the host at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewGeometry {
    /// Bounds of the window hosting the view.
    pub window_bounds: Rect,
    /// The view's frame converted into the window's coordinate space.
    pub view_frame_in_window: Rect,
    /// The view's total bottom safe-area inset. Includes `additional_bottom`.
    pub safe_area_bottom: f64,
    /// The app-controlled additional bottom safe-area inset currently applied.
    pub additional_bottom: f64,
}

impl ViewGeometry {
    /// Geometry for a view that fills its window.
    #[must_use]
    pub const fn fullscreen(window_bounds: Rect, safe_area_bottom: f64, additional_bottom: f64) -> Self {
        Self {
            window_bounds,
            view_frame_in_window: window_bounds,
            safe_area_bottom,
            additional_bottom,
        }
    }

    /// Height of the window, the reference edge for keyboard frames.
    #[inline]
    #[must_use]
    pub fn window_height(&self) -> f64 {
        self.window_bounds.height
    }

    /// Portion of the bottom safe area that the system reserves on its own.
    #[inline]
    #[must_use]
    pub fn system_bottom_inset(&self) -> f64 {
        self.safe_area_bottom - self.additional_bottom
    }
}

/// Rebuild a keyboard rectangle in window space from its reported size.
///
/// The reported origin is ignored. A hiding keyboard has zero height and sits
/// just below the window; a showing keyboard sits flush with its bottom edge.
#[must_use]
pub fn keyboard_frame(visibility: Visibility, reported: Size, window_height: f64) -> Rect {
    let width = sanitize(reported.width);
    match visibility {
        Visibility::Hiding => Rect::new(0.0, window_height, width, 0.0),
        Visibility::Showing => {
            let height = sanitize(reported.height);
            Rect::new(0.0, window_height - height, width, height)
        }
    }
}

/// Height of `keyboard` that overlaps the view, net of the system safe area.
#[must_use]
pub fn overlap(keyboard: Rect, geometry: &ViewGeometry) -> f64 {
    let view_frame = geometry.view_frame_in_window;
    if !keyboard.is_finite() || !view_frame.is_finite() {
        return 0.0;
    }

    let intersection_in_window = view_frame.intersection(&keyboard);
    let intersection_in_view = intersection_in_window.relative_to(view_frame.standardized().origin());
    let overlapping_height = intersection_in_view.height;

    // A degenerate (negative or non-finite) system inset discounts nothing.
    clamp_non_negative(overlapping_height - sanitize(geometry.system_bottom_inset()))
}

/// Classify `event`, rebuild its frame against the window, and resolve it.
///
/// Returns `None` when the event does not classify as showing or hiding.
#[must_use]
pub fn overlap_for_event(event: &KeyboardEvent, geometry: &ViewGeometry) -> Option<f64> {
    let visibility = event.visibility()?;
    let frame = keyboard_frame(visibility, event.end_frame.standardized().size(), geometry.window_height());
    Some(overlap(frame, geometry))
}

/// Named entry point used by the runtime when a keyboard frame settles.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryResolver;

impl GeometryResolver {
    /// Overlap of an already reconstructed keyboard frame. See [`overlap`].
    #[inline]
    #[must_use]
    pub fn resolve(keyboard: Rect, geometry: &ViewGeometry) -> f64 {
        overlap(keyboard, geometry)
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn clamp_non_negative(v: f64) -> f64 {
    // NaN fails the comparison and falls through to zero.
    if v > 0.0 { v } else { 0.0 }
}
