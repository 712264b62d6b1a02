#![forbid(unsafe_code)]

//! cscroll Runtime
//!
//! This crate provides the stateful machinery that keeps an embedded scroll
//! surface clear of the on-screen keyboard.
//!
//! # Key Components
//!
//! - [`KeyboardVisibilityCoordinator`] - Subscribes to keyboard events and applies settled overlaps
//! - [`CoalescingFilter`] - Debounces a stream of values into settled values
//! - [`Scheduler`] - One-shot timer abstraction ([`ManualScheduler`], [`DeadlineScheduler`])
//! - [`InsetAdjustmentStrategy`] - Policies that push an overlap into layout state
//! - [`BounceController`] - Vertical bounce override while the keyboard is present
//! - [`EventBus`] - In-process [`KeyboardEventSource`]
//! - [`HeadlessHost`] - In-memory [`LayoutHost`] for tests and headless embedding
//! - [`KeyboardConfig`] - Tunables, loadable from TOML/JSON with `policy-config`
//!
//! # Role in cscroll
//! `cscroll-runtime` is the orchestrator. It consumes keyboard events from
//! an injected source, debounces them on an injected scheduler, resolves the
//! overlap with `cscroll-core`, and drives the host's layout through the
//! [`LayoutHost`] trait.
//!
//! # How it fits in the system
//! The host run loop owns the scheduler and forwards platform keyboard
//! notifications into a [`KeyboardEventSource`]. Everything else happens on
//! that same thread; no type in this crate is `Send`.

pub mod bounce;
pub mod config;
pub mod coordinator;
pub mod event_source;
pub mod filter;
pub mod headless;
pub mod host;
pub mod scheduler;
pub mod strategy;

pub use bounce::BounceController;
pub use config::{AdjustmentMode, ConfigError, KeyboardConfig};
pub use coordinator::{KeyboardState, KeyboardVisibilityCoordinator, SizeTransition};
pub use event_source::{EventBus, KeyboardEventSource, KeyboardHandler, ListenerId};
pub use filter::CoalescingFilter;
pub use headless::{HeadlessHost, HostRecord, LayoutState};
pub use host::{AdjustmentTarget, AnimationSpec, KeyboardDismissMode, LayoutHost};
pub use scheduler::{DeadlineScheduler, ManualScheduler, Scheduler, TimerCallback, TimerId};
pub use strategy::{
    InsetAdjustmentStrategy, NoAdjustment, ResizeSafeArea, ResizeScrollContent, StrategyKind,
};
