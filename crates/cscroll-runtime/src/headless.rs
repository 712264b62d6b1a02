#![forbid(unsafe_code)]

//! In-memory [`LayoutHost`] that records what the coordinator does to it.
//!
//! Used by tests and by headless embeddings that drive layout themselves.
//! Geometry is plain data set by the caller; every animation, scroll request,
//! and layout pass is appended to [`HostRecord`].

use cscroll_core::geometry::{Point, Rect};
use cscroll_core::resolver::ViewGeometry;
use cscroll_core::scroll::ScrollMetrics;

use crate::host::{AdjustmentTarget, AnimationSpec, KeyboardDismissMode, LayoutHost};

/// Layout state owned by the headless host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutState {
    /// Additional bottom safe-area inset.
    pub additional_bottom_inset: f64,
    /// Content minimum-height constraint constant.
    pub content_min_height_constant: f64,
    /// Scroll surface trailing-edge constraint constant.
    pub content_trailing_constant: f64,
    /// Scroll indicator bottom inset.
    pub scroll_indicator_bottom_inset: f64,
    /// Vertical bounce for short content.
    pub always_bounce_vertical: bool,
}

/// Everything the coordinator asked the host to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostRecord {
    /// Animation scopes opened, in order.
    pub animations: Vec<AnimationSpec>,
    /// Layout state at the end of each animation scope.
    pub animated_states: Vec<LayoutState>,
    /// Rects passed to `scroll_rect_to_visible`, with the animated flag.
    pub scrolled_rects: Vec<(Rect, bool)>,
    /// Number of `layout_if_needed` calls.
    pub layout_passes: usize,
    /// Number of `layout_without_animation` calls.
    pub unanimated_layout_passes: usize,
    /// Content offsets set via `set_content_offset`.
    pub content_offsets: Vec<Point>,
}

/// Headless host with caller-controlled geometry.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    /// Bounds of the hosting window; `None` when the view is not in a window.
    pub window_bounds: Option<Rect>,
    /// The view's frame in window coordinates.
    pub view_frame: Rect,
    /// Bottom safe-area inset reserved by the system.
    pub system_bottom_inset: f64,
    /// Mutable layout state.
    pub layout: LayoutState,
    /// Keyboard dismiss mode of the scroll surface.
    pub dismiss_mode: KeyboardDismissMode,
    /// Whether an interactive keyboard dismiss drag is in progress.
    pub interactive_dismiss_in_progress: bool,
    /// First responder frame in content coordinates.
    pub first_responder: Option<Rect>,
    /// Scroll state reported to size transitions.
    pub scroll_metrics: ScrollMetrics,
    record: HostRecord,
}

impl HeadlessHost {
    /// A view filling a window of `bounds`, with `system_bottom_inset` of
    /// system safe area.
    #[must_use]
    pub fn fullscreen(bounds: Rect, system_bottom_inset: f64) -> Self {
        Self {
            window_bounds: Some(bounds),
            view_frame: bounds,
            system_bottom_inset,
            ..Self::default()
        }
    }

    /// Place the view at `frame` within its window.
    #[must_use]
    pub fn with_view_frame(mut self, frame: Rect) -> Self {
        self.view_frame = frame;
        self
    }

    /// Set the keyboard dismiss mode.
    #[must_use]
    pub fn with_dismiss_mode(mut self, mode: KeyboardDismissMode) -> Self {
        self.dismiss_mode = mode;
        self
    }

    /// Set the first responder frame.
    #[must_use]
    pub fn with_first_responder(mut self, rect: Rect) -> Self {
        self.first_responder = Some(rect);
        self
    }

    /// Recorded host calls.
    #[must_use]
    pub const fn record(&self) -> &HostRecord {
        &self.record
    }

    /// Take recorded host calls, leaving an empty record.
    pub fn take_record(&mut self) -> HostRecord {
        std::mem::take(&mut self.record)
    }
}

impl AdjustmentTarget for HeadlessHost {
    fn additional_bottom_inset(&self) -> f64 {
        self.layout.additional_bottom_inset
    }

    fn set_additional_bottom_inset(&mut self, inset: f64) {
        self.layout.additional_bottom_inset = inset;
    }

    fn content_min_height_constant(&self) -> f64 {
        self.layout.content_min_height_constant
    }

    fn set_content_min_height_constant(&mut self, constant: f64) {
        self.layout.content_min_height_constant = constant;
    }

    fn content_trailing_constant(&self) -> f64 {
        self.layout.content_trailing_constant
    }

    fn set_content_trailing_constant(&mut self, constant: f64) {
        self.layout.content_trailing_constant = constant;
    }

    fn scroll_indicator_bottom_inset(&self) -> f64 {
        self.layout.scroll_indicator_bottom_inset
    }

    fn set_scroll_indicator_bottom_inset(&mut self, inset: f64) {
        self.layout.scroll_indicator_bottom_inset = inset;
    }

    fn keyboard_dismiss_mode(&self) -> KeyboardDismissMode {
        self.dismiss_mode
    }

    fn always_bounce_vertical(&self) -> bool {
        self.layout.always_bounce_vertical
    }

    fn set_always_bounce_vertical(&mut self, enabled: bool) {
        self.layout.always_bounce_vertical = enabled;
    }

    fn scroll_rect_to_visible(&mut self, rect: Rect, animated: bool) {
        self.record.scrolled_rects.push((rect, animated));
    }
}

impl LayoutHost for HeadlessHost {
    fn view_geometry(&self) -> Option<ViewGeometry> {
        let window_bounds = self.window_bounds?;
        let additional = self.layout.additional_bottom_inset;
        Some(ViewGeometry {
            window_bounds,
            view_frame_in_window: self.view_frame,
            safe_area_bottom: self.system_bottom_inset + additional,
            additional_bottom: additional,
        })
    }

    fn is_interactive_dismiss_in_progress(&self) -> bool {
        self.interactive_dismiss_in_progress
    }

    fn layout_without_animation(&mut self) {
        self.record.unanimated_layout_passes += 1;
    }

    fn layout_if_needed(&mut self) {
        self.record.layout_passes += 1;
    }

    fn animate(&mut self, spec: AnimationSpec, changes: &mut dyn FnMut(&mut Self)) {
        self.record.animations.push(spec);
        changes(self);
        let state = self.layout.clone();
        self.record.animated_states.push(state);
    }

    fn first_responder_rect(&self) -> Option<Rect> {
        self.first_responder
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        self.scroll_metrics
    }

    fn set_content_offset(&mut self, offset: Point) {
        self.scroll_metrics.content_offset = offset;
        self.record.content_offsets.push(offset);
    }
}
