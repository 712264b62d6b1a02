#![forbid(unsafe_code)]

//! Scroll offset math for container size transitions.
//!
//! When the container changes size (rotation, split-view resize), the scroll
//! surface's adjusted insets change under it. These helpers keep the
//! top-left corner of the content pinned and then clamp the offset back into
//! the range a resting scroll view can legally show, so content can never be
//! stranded above the top edge.

use crate::geometry::{EdgeInsets, Point, Rect, Size};

/// Snapshot of a scroll surface's scrolling state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Current content offset.
    pub content_offset: Point,
    /// Size of the scrollable content.
    pub content_size: Size,
    /// Size of the scroll surface's bounds.
    pub bounds_size: Size,
    /// Insets applied to the content, including safe-area adjustments.
    pub adjusted_inset: EdgeInsets,
}

/// Size of the region in which content is visible: the bounds minus the
/// adjusted insets.
#[must_use]
pub fn visible_content_size(bounds: Size, adjusted_inset: EdgeInsets) -> Size {
    Rect::from_size(bounds.width, bounds.height)
        .inset(adjusted_inset)
        .size()
}

/// Clamp `offset` to the legal resting range for `metrics`.
///
/// The upper bound keeps the content from scrolling past its bottom/right
/// extent; the lower bound keeps it from scrolling past its top/left extent.
/// When content is shorter than the visible area the lower bound wins.
#[must_use]
pub fn constrain_content_offset(offset: Point, metrics: &ScrollMetrics) -> Point {
    let visible = visible_content_size(metrics.bounds_size, metrics.adjusted_inset);
    let inset = metrics.adjusted_inset;

    let x = offset
        .x
        .min(metrics.content_size.width - visible.width - inset.left)
        .max(-inset.left);
    let y = offset
        .y
        .min(metrics.content_size.height - visible.height - inset.top)
        .max(-inset.top);

    Point::new(x, y)
}

/// Shift `initial_offset` so the content's top-left corner stays where it was
/// before the adjusted inset changed from `initial_inset` to `current_inset`.
#[must_use]
pub fn pin_top_left(initial_offset: Point, initial_inset: EdgeInsets, current_inset: EdgeInsets) -> Point {
    Point::new(
        initial_offset.x + initial_inset.left - current_inset.left,
        initial_offset.y + initial_inset.top - current_inset.top,
    )
}
