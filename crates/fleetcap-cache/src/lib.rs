//! fleetcap-cache — time-boxed memoization of expensive async loads.
//!
//! # Entry lifecycle
//!
//! ```text
//! absent ──miss──▶ loading ──ok──▶ resolved ──now ≥ expires_at──▶ absent
//!                     │
//!                     └──err──▶ absent (failure delivered to every waiter)
//! ```
//!
//! The entry table is guarded by a mutex that is only held for the
//! check-and-insert, never across an `.await`. Concurrent callers for the
//! same key share one in-flight load.

pub mod cache;
pub mod clock;

pub use cache::CapacityCache;
pub use clock::{Clock, ManualClock, SystemClock};
