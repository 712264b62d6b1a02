//! [`NoAdjustment`] strategy: leave layout untouched.

use super::InsetAdjustmentStrategy;
use crate::host::AdjustmentTarget;

/// Ignore the keyboard entirely.
///
/// Useful when the embedder handles the keyboard itself, or when the scroll
/// surface never hosts text input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdjustment;

impl InsetAdjustmentStrategy for NoAdjustment {
    fn apply(&mut self, _target: &mut dyn AdjustmentTarget, _overlap: f64) {}

    fn name(&self) -> &str {
        "NoAdjustment"
    }
}
