//! [`ResizeSafeArea`] strategy: grow the additional bottom safe-area inset.

use tracing::{trace, warn};

use super::InsetAdjustmentStrategy;
use crate::host::AdjustmentTarget;

/// Reserve the keyboard overlap as additional bottom safe area.
///
/// Children laid out against the safe area move up with the keyboard. In the
/// default preserve-size mode the content's minimum-height constant grows by
/// the same amount, so content pinned to the safe area keeps its height and
/// becomes scrollable instead of being squashed.
///
/// - `allow_shrink = false`: inset and minimum-height constant both track the
///   overlap.
/// - `allow_shrink = true`: only the inset changes; content shrinks.
///
/// The embedder may reserve bottom safe area of its own (a toolbar, say).
/// That baseline is captured when the keyboard appears, the inset never drops
/// below it while the keyboard is up, and it is put back when the keyboard
/// goes away.
#[derive(Debug, Clone, Default)]
pub struct ResizeSafeArea {
    allow_shrink: bool,
    bottom_inset: f64,
    saved_baseline: Option<f64>,
}

impl ResizeSafeArea {
    /// Create the strategy.
    #[must_use]
    pub const fn new(allow_shrink: bool) -> Self {
        Self {
            allow_shrink,
            bottom_inset: 0.0,
            saved_baseline: None,
        }
    }

    /// Whether content may shrink.
    #[must_use]
    pub const fn allow_shrink(&self) -> bool {
        self.allow_shrink
    }

    /// The embedder's own additional inset, while the keyboard is present.
    #[must_use]
    pub const fn saved_baseline(&self) -> Option<f64> {
        self.saved_baseline
    }

    fn resolve_inset(&mut self, target: &dyn AdjustmentTarget, previous: f64, overlap: f64) -> Option<f64> {
        if previous == 0.0 {
            let baseline = target.additional_bottom_inset();
            self.saved_baseline = Some(baseline);
            trace!(baseline, "additional inset baseline saved");
            return Some(overlap.max(baseline));
        }

        debug_assert!(
            self.saved_baseline.is_some(),
            "no saved additional inset baseline"
        );
        let Some(baseline) = self.saved_baseline else {
            warn!("no saved additional inset baseline; leaving inset as is");
            return None;
        };
        if overlap == 0.0 {
            self.saved_baseline = None;
            trace!(baseline, "additional inset baseline restored");
            Some(baseline)
        } else {
            Some(overlap.max(baseline))
        }
    }
}

impl InsetAdjustmentStrategy for ResizeSafeArea {
    fn apply(&mut self, target: &mut dyn AdjustmentTarget, overlap: f64) {
        let previous = self.bottom_inset;
        if previous == overlap {
            return;
        }
        self.bottom_inset = overlap;

        let Some(inset) = self.resolve_inset(target, previous, overlap) else {
            return;
        };
        target.set_additional_bottom_inset(inset);
        if !self.allow_shrink {
            target.set_content_min_height_constant(inset);
        }
    }

    fn name(&self) -> &str {
        "ResizeSafeArea"
    }
}
