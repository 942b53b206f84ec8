//! # ap-gate
//!
//! Session access gate for Appraise.
//!
//! The UI shell asks the [`AccessGate`] on every navigation whether the
//! session may see the requested path. The answer depends only on whether
//! the session is signed in and on two actor flags (`password_changed`,
//! `onboarding_complete`), so unlocking the next stage never needs a new
//! session.
//!
//! ## Key invariants
//!
//! - **First match wins**: the five rules run in a fixed order; the
//!   password rule always beats the onboarding rule.
//! - **Fail closed**: if the flags cannot be read, they count as unset.
//! - **No state**: nothing is cached between evaluations.

pub mod config;
pub mod error;
pub mod gate;

pub use config::GateConfig;
pub use error::GateError;
pub use gate::{AccessGate, GateDecision, GateState, GateStep, GateTrace};
