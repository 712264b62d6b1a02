#![forbid(unsafe_code)]

//! Core: geometry primitives, keyboard events, and overlap resolution.
//!
//! # Role in cscroll
//! `cscroll-core` is the pure layer. It owns the value types that describe
//! screen-space rectangles and keyboard notifications, and the stateless
//! math that turns a keyboard frame into the height by which the keyboard
//! intrudes into a view.
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::Rect`], [`geometry::Size`],
//!   [`geometry::Point`], and [`geometry::EdgeInsets`] in floating point
//!   layout units.
//! - **KeyboardEvent**: canonical keyboard visibility notifications and their
//!   classification into showing/hiding.
//! - **Resolver**: keyboard-frame reconstruction and overlap computation.
//! - **Scroll math**: content-offset pinning and clamping used while the
//!   container changes size.
//!
//! # How it fits in the system
//! The runtime (`cscroll-runtime`) consumes [`event::KeyboardEvent`] values,
//! debounces them, and calls into [`resolver`] when a value settles. Nothing
//! in this crate holds state or performs I/O, so every function here can be
//! re-derived from its inputs alone.

pub mod event;
pub mod geometry;
pub mod resolver;
pub mod scroll;

pub use event::{KeyboardEvent, KeyboardEventKind, Visibility};
pub use geometry::{EdgeInsets, Point, Rect, Size};
pub use resolver::{GeometryResolver, ViewGeometry};
pub use scroll::ScrollMetrics;
