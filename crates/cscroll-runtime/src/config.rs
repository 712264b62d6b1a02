#![forbid(unsafe_code)]

//! Keyboard handling configuration.
//!
//! Captures every tunable of the coordinator as a single [`KeyboardConfig`]
//! that can be built in code or loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # cscroll.toml
//! debounce_delay_ms = 150
//! strategy = "resize_scroll_content"
//! resize_embedded_content = true
//! visibility_scroll_margin = 12.0
//! ```
//!
//! ```rust,ignore
//! let config = KeyboardConfig::from_toml_file("cscroll.toml")?;
//! let config = KeyboardConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! | Field | Default |
//! |-------|---------|
//! | `debounce_delay_ms` | `150` |
//! | `animation_duration_ms` | `500` |
//! | `animation_damping` | `1.0` |
//! | `strategy` | `resize_safe_area` |
//! | `resize_embedded_content` | `false` |
//! | `scroll_first_responder_to_visible` | `true` |
//! | `visibility_scroll_margin` | `0.0` |

#[cfg(feature = "policy-config")]
use std::path::Path;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::host::AnimationSpec;
use crate::strategy::StrategyKind;

/// Which layout property absorbs the keyboard overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "snake_case"))]
pub enum AdjustmentMode {
    /// Leave layout untouched.
    None,
    /// Grow the additional bottom safe-area inset.
    #[default]
    ResizeSafeArea,
    /// Pull the scroll surface's bottom edge up.
    ResizeScrollContent,
}

/// Coordinator configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct KeyboardConfig {
    /// Quiet period before a burst of keyboard events settles.
    pub debounce_delay_ms: u64,
    /// Duration of the adjustment animation.
    pub animation_duration_ms: u64,
    /// Spring damping of the adjustment animation, in `(0, 1]`.
    pub animation_damping: f64,
    /// Layout property that absorbs the overlap.
    pub strategy: AdjustmentMode,
    /// Let embedded content resize with the keyboard.
    ///
    /// For [`AdjustmentMode::ResizeSafeArea`] this allows content to shrink;
    /// for [`AdjustmentMode::ResizeScrollContent`] it shrinks the content's
    /// minimum height.
    pub resize_embedded_content: bool,
    /// Scroll the first responder into view after a non-zero adjustment.
    pub scroll_first_responder_to_visible: bool,
    /// Extra vertical margin kept around a rect scrolled into view.
    pub visibility_scroll_margin: f64,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            debounce_delay_ms: 150,
            animation_duration_ms: 500,
            animation_damping: 1.0,
            strategy: AdjustmentMode::ResizeSafeArea,
            resize_embedded_content: false,
            scroll_first_responder_to_visible: true,
            visibility_scroll_margin: 0.0,
        }
    }
}

impl KeyboardConfig {
    /// Set the debounce delay.
    #[must_use]
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the animation duration.
    #[must_use]
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the spring damping.
    #[must_use]
    pub fn with_animation_damping(mut self, damping: f64) -> Self {
        self.animation_damping = damping;
        self
    }

    /// Set the adjustment mode.
    #[must_use]
    pub fn with_strategy(mut self, strategy: AdjustmentMode) -> Self {
        self.strategy = strategy;
        self
    }

    /// Allow embedded content to resize with the keyboard.
    #[must_use]
    pub fn with_resize_embedded_content(mut self, enabled: bool) -> Self {
        self.resize_embedded_content = enabled;
        self
    }

    /// Enable or disable scrolling the first responder into view.
    #[must_use]
    pub fn with_scroll_first_responder_to_visible(mut self, enabled: bool) -> Self {
        self.scroll_first_responder_to_visible = enabled;
        self
    }

    /// Set the margin kept around rects scrolled into view.
    #[must_use]
    pub fn with_visibility_scroll_margin(mut self, margin: f64) -> Self {
        self.visibility_scroll_margin = margin;
        self
    }

    /// Debounce delay as a [`Duration`].
    #[must_use]
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    /// Animation parameters for the adjustment scope.
    #[must_use]
    pub fn animation_spec(&self) -> AnimationSpec {
        AnimationSpec {
            duration: Duration::from_millis(self.animation_duration_ms),
            damping: self.animation_damping,
            initial_velocity: 0.0,
        }
    }

    /// Strategy selected by `strategy` and `resize_embedded_content`.
    #[must_use]
    pub fn strategy_kind(&self) -> StrategyKind {
        match self.strategy {
            AdjustmentMode::None => StrategyKind::NoAdjustment,
            AdjustmentMode::ResizeSafeArea => StrategyKind::ResizeSafeArea {
                allow_shrink: self.resize_embedded_content,
            },
            AdjustmentMode::ResizeScrollContent => StrategyKind::ResizeScrollContent {
                shrink_content: self.resize_embedded_content,
            },
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.debounce_delay_ms == 0 {
            errors.push("debounce_delay_ms must be > 0".into());
        }

        if !(self.animation_damping > 0.0 && self.animation_damping <= 1.0) {
            errors.push(format!(
                "animation_damping must be in (0, 1], got {}",
                self.animation_damping
            ));
        }

        if !self.visibility_scroll_margin.is_finite() || self.visibility_scroll_margin < 0.0 {
            errors.push(format!(
                "visibility_scroll_margin must be finite and >= 0, got {}",
                self.visibility_scroll_margin
            ));
        }

        errors
    }

    /// [`validate`](Self::validate), as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a keyboard configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
