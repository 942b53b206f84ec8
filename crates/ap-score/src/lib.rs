//! # ap-score
//!
//! Session-scoped score cache for Appraise.
//!
//! [`ScoreCache`] memoizes one actor's [`PerformanceScore`](ap_store::PerformanceScore)
//! rows so dashboards do not re-derive them on every read. It is a
//! disposable view, never a source of truth:
//!
//! - Loading a different actor replaces the whole cache.
//! - Updates write through to the gateway before touching the local copy.
//! - Writes from other sessions are not seen until [`ScoreCache::invalidate`]
//!   or an owner switch forces a reload.

pub mod cache;
pub mod error;

pub use cache::{ScoreCache, ScoreConfig};
pub use error::ScoreError;
