//! # ap-store
//!
//! Append-only record model and persistence boundary for Appraise.
//!
//! Every write in the system is an insert. Goal records, approval requests
//! and score rows are never updated in place; the *current* state for a key
//! is the row with the latest `created_at` ("latest row wins"). History is
//! therefore implicit in the append log.
//!
//! ## Key components
//!
//! - [`GoalRecord`], [`ApprovalRequest`], [`PerformanceScore`], [`Actor`] — the
//!   rows this core reads and writes
//! - [`PersistenceGateway`] — insert / latest-row queries over the three tables
//! - [`ActorDirectory`] — actor flags and the (external) org-hierarchy lookup
//! - [`MemoryGateway`] — in-process implementation of both traits
//! - [`JsonlGateway`] — file-backed implementation (one JSONL file per table)

// Module declarations — each `mod foo;` tells Rust to look for `foo.rs`
// in the same directory and include it as a submodule.
pub mod error;
pub mod gateway;
pub mod jsonl;
pub mod latest;
pub mod memory;
pub mod record;

// Re-export the main types at the crate root for convenience.
pub use error::{ErrorKind, StoreError};
pub use gateway::{ActorDirectory, PersistenceGateway};
pub use jsonl::{JsonlGateway, StoreLayout};
pub use memory::MemoryGateway;
pub use record::{
    Actor, ApprovalRequest, ApprovalStatus, Category, GoalRecord, GoalStatus, OnboardingContent,
    Payload, PerformanceScore,
};
