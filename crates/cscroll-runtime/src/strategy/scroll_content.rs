//! [`ResizeScrollContent`] strategy: pull the scroll surface's bottom edge up.

use super::InsetAdjustmentStrategy;
use crate::host::AdjustmentTarget;

/// Shorten the scroll surface itself by the keyboard overlap.
///
/// The trailing-edge constraint and the scroll indicator move up together.
/// With `shrink_content`, the content's minimum height drops by the overlap
/// as well, so short content does not become scrollable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResizeScrollContent {
    shrink_content: bool,
}

impl ResizeScrollContent {
    /// Create the strategy.
    #[must_use]
    pub const fn new(shrink_content: bool) -> Self {
        Self { shrink_content }
    }

    /// Whether content shrinks with the scroll surface.
    #[must_use]
    pub const fn shrink_content(&self) -> bool {
        self.shrink_content
    }
}

impl InsetAdjustmentStrategy for ResizeScrollContent {
    fn apply(&mut self, target: &mut dyn AdjustmentTarget, overlap: f64) {
        target.set_content_trailing_constant(overlap);
        target.set_scroll_indicator_bottom_inset(overlap);
        if self.shrink_content {
            target.set_content_min_height_constant(-overlap);
        }
    }

    fn name(&self) -> &str {
        "ResizeScrollContent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_target::Target;

    #[test]
    fn moves_trailing_edge_and_indicator() {
        let mut target = Target::default();
        ResizeScrollContent::new(false).apply(&mut target, 150.0);
        assert_eq!(target.trailing, 150.0);
        assert_eq!(target.indicator_bottom, 150.0);
        assert_eq!(target.min_height, 0.0);
        assert_eq!(target.additional_bottom, 0.0);
    }

    #[test]
    fn shrink_content_lowers_min_height() {
        let mut target = Target::default();
        ResizeScrollContent::new(true).apply(&mut target, 150.0);
        assert_eq!(target.min_height, -150.0);
    }

    #[test]
    fn zero_overlap_restores() {
        let mut target = Target::default();
        let mut strategy = ResizeScrollContent::new(true);
        strategy.apply(&mut target, 90.0);
        strategy.apply(&mut target, 0.0);
        assert_eq!(target.trailing, 0.0);
        assert_eq!(target.indicator_bottom, 0.0);
        assert_eq!(target.min_height, 0.0);
    }
}
