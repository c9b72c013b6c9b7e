#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Scheduler and cycle orchestration for the unseeded file detector.
//!
//! Layout: `bootstrap.rs` (startup, schedule, signals), `cycle.rs` (one scan
//! cycle: detect, delete, notify), `error.rs` (`AppError`).

/// Startup, periodic schedule, and signal handling.
pub mod bootstrap;
/// One scan cycle.
pub mod cycle;
/// Application-level errors.
pub mod error;

pub use bootstrap::run_app;
pub use cycle::{CycleSummary, GLOBAL_SCOPE, run_cycle};
pub use error::{AppError, AppResult};
