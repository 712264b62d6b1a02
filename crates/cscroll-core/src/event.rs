#![forbid(unsafe_code)]

//! Canonical keyboard visibility events.
//!
//! Platforms post several notifications around a keyboard transition. Only
//! the "will" notifications carry the final frame early enough to animate
//! alongside the keyboard, so only those classify into a [`Visibility`].
//!
//! # Design Notes
//!
//! - `end_frame` is trustworthy for its size only. Its origin is reported in
//!   a fixed global space and must not be used for intersection tests; see
//!   [`crate::resolver::keyboard_frame`].
//! - Events are plain values, created once per platform notification and
//!   dropped after processing.

use web_time::Duration;

use crate::geometry::Rect;

/// Platform keyboard notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardEventKind {
    /// The keyboard is about to be presented or change size.
    WillShow,
    /// The keyboard finished presenting.
    DidShow,
    /// The keyboard is about to be dismissed.
    WillHide,
    /// The keyboard finished dismissing.
    DidHide,
}

impl KeyboardEventKind {
    /// Every notification kind, in posting order for a present/dismiss cycle.
    pub const ALL: [Self; 4] = [Self::WillShow, Self::DidShow, Self::WillHide, Self::DidHide];

    /// Classify the kind, or `None` for kinds that are not acted on.
    #[must_use]
    pub const fn visibility(self) -> Option<Visibility> {
        match self {
            Self::WillShow => Some(Visibility::Showing),
            Self::WillHide => Some(Visibility::Hiding),
            Self::DidShow | Self::DidHide => None,
        }
    }
}

/// Classified keyboard transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Keyboard is (or remains) on screen, possibly with a new height.
    Showing,
    /// Keyboard is leaving the screen.
    Hiding,
}

/// A keyboard visibility notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardEvent {
    /// Which notification this is.
    pub kind: KeyboardEventKind,
    /// Keyboard frame at the end of the transition, in the global space.
    pub end_frame: Rect,
    /// Duration of the platform's keyboard animation, when reported.
    pub animation_duration: Option<Duration>,
}

impl KeyboardEvent {
    /// Create an event of the given kind.
    #[must_use]
    pub const fn new(kind: KeyboardEventKind, end_frame: Rect) -> Self {
        Self {
            kind,
            end_frame,
            animation_duration: None,
        }
    }

    /// Keyboard-will-show with the given final frame.
    #[must_use]
    pub const fn will_show(end_frame: Rect) -> Self {
        Self::new(KeyboardEventKind::WillShow, end_frame)
    }

    /// Keyboard-will-hide with the given final frame.
    #[must_use]
    pub const fn will_hide(end_frame: Rect) -> Self {
        Self::new(KeyboardEventKind::WillHide, end_frame)
    }

    /// Attach the platform animation duration.
    #[must_use]
    pub const fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = Some(duration);
        self
    }

    /// Classify this event, or `None` if it is not a "will" notification.
    #[must_use]
    pub const fn visibility(&self) -> Option<Visibility> {
        self.kind.visibility()
    }
}
