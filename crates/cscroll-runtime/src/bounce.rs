#![forbid(unsafe_code)]

//! Vertical bounce management while the keyboard is present.
//!
//! With a drag-to-dismiss keyboard, short content must still be draggable or
//! the user cannot pull the keyboard away. [`BounceController`] forces
//! `always_bounce_vertical` on while the keyboard inset is non-zero and puts
//! the embedder's value back once the keyboard is gone.

use tracing::{trace, warn};

use crate::host::{AdjustmentTarget, KeyboardDismissMode};

/// Tracks the keyboard inset and toggles vertical bounce across its
/// zero/non-zero transitions.
#[derive(Debug, Clone, Default)]
pub struct BounceController {
    bottom_inset: f64,
    saved_always_bounce: Option<bool>,
}

impl BounceController {
    /// Create a controller for a surface with no keyboard inset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bottom_inset: 0.0,
            saved_always_bounce: None,
        }
    }

    /// Last inset passed to [`update`](Self::update).
    #[must_use]
    pub const fn bottom_inset(&self) -> f64 {
        self.bottom_inset
    }

    /// The embedder's bounce setting, while it is being overridden.
    #[must_use]
    pub const fn saved_always_bounce(&self) -> Option<bool> {
        self.saved_always_bounce
    }

    /// Record the new keyboard inset and adjust bounce on `target`.
    ///
    /// Repeating the current inset is a no-op. Nothing is touched when the
    /// surface never dismisses the keyboard on drag.
    pub fn update(&mut self, target: &mut dyn AdjustmentTarget, inset: f64) {
        let previous = self.bottom_inset;
        self.bottom_inset = inset;
        if previous == inset {
            return;
        }
        if target.keyboard_dismiss_mode() == KeyboardDismissMode::None {
            return;
        }

        if previous == 0.0 {
            let current = target.always_bounce_vertical();
            self.saved_always_bounce = Some(current);
            target.set_always_bounce_vertical(true);
            trace!(saved = current, "vertical bounce forced on");
        } else if inset == 0.0 {
            debug_assert!(
                self.saved_always_bounce.is_some(),
                "no saved bounce setting to restore"
            );
            match self.saved_always_bounce.take() {
                Some(saved) => {
                    target.set_always_bounce_vertical(saved);
                    trace!(restored = saved, "vertical bounce restored");
                }
                None => warn!("no saved bounce setting to restore; leaving bounce as is"),
            }
        }
    }
}
