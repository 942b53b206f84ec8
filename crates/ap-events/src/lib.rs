//! # ap-events
//!
//! Event dispatch and interval polling for Appraise.
//!
//! Lifecycle operations emit an [`ApEvent`] at each write (goal saved or
//! submitted, onboarding requested, approval resolved). Sinks receive them
//! through an [`EventDispatcher`]; sink failures are logged, never fatal.
//!
//! Views that need fresh data (the reviewer's approval panel, the subject's
//! rejection banner) refresh through a [`NotificationPoller`]. It is the only
//! place that knows the refresh is timer-driven, so a push subscription can
//! replace it without touching the queue or the gate.

pub mod error;
pub mod events;
pub mod poller;

pub use error::EventError;
pub use events::{ApEvent, EventDispatcher, LogSink, NotificationSink};
pub use poller::{NotificationPoller, PollerConfig, PollerHandle};
