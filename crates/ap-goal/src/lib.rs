//! # ap-goal
//!
//! Goal-record lifecycle for Appraise.
//!
//! Every functional category (Business, People, Collaboration, Quality,
//! Industry) runs the same machine over its own append-only record stream:
//!
//! ```text
//! Draft ──save──▶ InProgress ──save──▶ InProgress ...
//!   │                 │
//!   └────submit───────┴──────▶ Submitted (terminal)
//! ```
//!
//! ## Key components
//!
//! - [`GoalLifecycle`] — `current` / `save` / `history` for one
//!   `(actor, category)` stream
//! - [`PayloadValidator`] — the category-supplied required-field check
//! - [`ValidatorRegistry`] — which validator applies to which category
//! - [`GoalError`] — `ValidationFailed`, `AlreadySubmitted`, `GatewayUnavailable`

pub mod error;
pub mod lifecycle;
pub mod validator;

pub use error::GoalError;
pub use lifecycle::{GoalLifecycle, SaveAs};
pub use validator::{PayloadValidator, RequiredFields, ValidatorRegistry};
