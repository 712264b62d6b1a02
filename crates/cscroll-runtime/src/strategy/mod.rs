//! Inset adjustment strategies.
//!
//! A settled keyboard overlap is pushed into the host's layout state by an
//! [`InsetAdjustmentStrategy`]. Exactly one strategy is active per
//! coordinator.
//!
//! # Standalone structs vs. convenience enum
//!
//! Each built-in strategy has a standalone struct ([`NoAdjustment`],
//! [`ResizeSafeArea`], [`ResizeScrollContent`]) that implements
//! [`InsetAdjustmentStrategy`] directly. For selection from configuration,
//! use [`StrategyKind`], a plain selector that builds the matching strategy
//! with [`StrategyKind::into_strategy`].
//!
//! # Invariants
//!
//! Every `apply` is idempotent: applying the same overlap twice leaves the
//! target exactly as applying it once. Strategies may carry state across
//! calls (see [`ResizeSafeArea`]), so one instance serves one surface.

mod none;
mod safe_area;
mod scroll_content;

pub use none::NoAdjustment;
pub use safe_area::ResizeSafeArea;
pub use scroll_content::ResizeScrollContent;

use crate::host::AdjustmentTarget;

/// Pushes a keyboard overlap into layout state.
pub trait InsetAdjustmentStrategy {
    /// Apply `overlap` (finite, `>= 0`) to `target`.
    fn apply(&mut self, target: &mut dyn AdjustmentTarget, overlap: f64);

    /// Human-readable strategy name for logs/debugging.
    fn name(&self) -> &str;
}

/// Built-in strategy selection convenience enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Leave layout untouched.
    NoAdjustment,
    /// Grow the additional bottom safe-area inset.
    ResizeSafeArea {
        /// Let the embedded content shrink instead of keeping its height.
        allow_shrink: bool,
    },
    /// Pull the scroll surface's bottom edge up.
    ResizeScrollContent {
        /// Shrink the content's minimum height by the overlap.
        shrink_content: bool,
    },
}

impl Default for StrategyKind {
    fn default() -> Self {
        Self::ResizeSafeArea {
            allow_shrink: false,
        }
    }
}

impl StrategyKind {
    /// Build a fresh strategy of this kind.
    #[must_use]
    pub fn into_strategy(self) -> Box<dyn InsetAdjustmentStrategy> {
        match self {
            Self::NoAdjustment => Box::new(NoAdjustment),
            Self::ResizeSafeArea { allow_shrink } => Box::new(ResizeSafeArea::new(allow_shrink)),
            Self::ResizeScrollContent { shrink_content } => {
                Box::new(ResizeScrollContent::new(shrink_content))
            }
        }
    }

    /// Name of the strategy this kind builds.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NoAdjustment => "NoAdjustment",
            Self::ResizeSafeArea { .. } => "ResizeSafeArea",
            Self::ResizeScrollContent { .. } => "ResizeScrollContent",
        }
    }
}

#[cfg(test)]
pub(crate) mod test_target {
    use cscroll_core::geometry::Rect;

    use crate::host::{AdjustmentTarget, KeyboardDismissMode};

    /// Bare adjustment target for strategy tests.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Target {
        pub additional_bottom: f64,
        pub min_height: f64,
        pub trailing: f64,
        pub indicator_bottom: f64,
        pub dismiss_mode: KeyboardDismissMode,
        pub bounce: bool,
        pub scrolled: Vec<(Rect, bool)>,
    }

    impl AdjustmentTarget for Target {
        fn additional_bottom_inset(&self) -> f64 {
            self.additional_bottom
        }
        fn set_additional_bottom_inset(&mut self, inset: f64) {
            self.additional_bottom = inset;
        }
        fn content_min_height_constant(&self) -> f64 {
            self.min_height
        }
        fn set_content_min_height_constant(&mut self, constant: f64) {
            self.min_height = constant;
        }
        fn content_trailing_constant(&self) -> f64 {
            self.trailing
        }
        fn set_content_trailing_constant(&mut self, constant: f64) {
            self.trailing = constant;
        }
        fn scroll_indicator_bottom_inset(&self) -> f64 {
            self.indicator_bottom
        }
        fn set_scroll_indicator_bottom_inset(&mut self, inset: f64) {
            self.indicator_bottom = inset;
        }
        fn keyboard_dismiss_mode(&self) -> KeyboardDismissMode {
            self.dismiss_mode
        }
        fn always_bounce_vertical(&self) -> bool {
            self.bounce
        }
        fn set_always_bounce_vertical(&mut self, enabled: bool) {
            self.bounce = enabled;
        }
        fn scroll_rect_to_visible(&mut self, rect: Rect, animated: bool) {
            self.scrolled.push((rect, animated));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_target::Target;
    use super::*;

    const ALL: [StrategyKind; 5] = [
        StrategyKind::NoAdjustment,
        StrategyKind::ResizeSafeArea { allow_shrink: false },
        StrategyKind::ResizeSafeArea { allow_shrink: true },
        StrategyKind::ResizeScrollContent {
            shrink_content: false,
        },
        StrategyKind::ResizeScrollContent {
            shrink_content: true,
        },
    ];

    #[test]
    fn default_is_preserve_size_safe_area() {
        assert_eq!(
            StrategyKind::default(),
            StrategyKind::ResizeSafeArea { allow_shrink: false }
        );
    }

    #[test]
    fn every_kind_is_idempotent() {
        for kind in ALL {
            for overlap in [0.0, 34.5, 280.0] {
                let mut strategy = kind.into_strategy();
                let mut once = Target::default();
                strategy.apply(&mut once, overlap);
                let mut twice = once.clone();
                strategy.apply(&mut twice, overlap);
                assert_eq!(once, twice, "{} not idempotent at {overlap}", kind.name());
            }
        }
    }

    #[test]
    fn built_strategy_matches_standalone_struct() {
        let mut via_kind = Target::default();
        StrategyKind::ResizeScrollContent {
            shrink_content: true,
        }
        .into_strategy()
        .apply(&mut via_kind, 120.0);

        let mut direct = Target::default();
        ResizeScrollContent::new(true).apply(&mut direct, 120.0);
        assert_eq!(via_kind, direct);
    }

    #[test]
    fn built_strategy_keeps_state_between_calls() {
        let mut target = Target {
            additional_bottom: 50.0,
            ..Target::default()
        };
        let mut strategy = StrategyKind::default().into_strategy();
        strategy.apply(&mut target, 280.0);
        strategy.apply(&mut target, 0.0);
        assert_eq!(target.additional_bottom, 50.0);
    }

    #[test]
    fn names_match_built_strategies() {
        for kind in ALL {
            assert_eq!(kind.name(), kind.into_strategy().name());
        }
        assert_eq!(ALL[0].name(), NoAdjustment.name());
        assert_eq!(ALL[2].name(), ResizeSafeArea::new(true).name());
        assert_eq!(ALL[4].name(), ResizeScrollContent::new(true).name());
    }
}
