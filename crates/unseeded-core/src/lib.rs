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

//! Detection engine for files that no torrent backend is seeding.
//!
//! Layout: `path.rs` (normalization, translation, containment), `index.rs`
//! (seeded content set), `client/` (backend adapters), `scanner.rs`
//! (filesystem walk), `aggregate.rs` (cross-backend union), `detect.rs`
//! (per-service and global scan entry points), `error.rs` (`BackendError`).

pub mod aggregate;
pub mod cancel;
pub mod client;
pub mod detect;
pub mod error;
pub mod index;
pub mod path;
pub mod scanner;

pub use aggregate::{Aggregation, aggregate, fetch_seeded};
pub use cancel::CancelFlag;
pub use client::{Connector, HttpConnector, TorrentClient, TorrentRecord, collect_seeded};
pub use detect::{ScanResult, ScanSettings, ScanStatus, scan_global, scan_service};
pub use error::{BackendError, BackendResult, FailureStage, ServiceFailure};
pub use index::{ContentIndex, SeededPaths};
pub use path::{is_within, join, normalize, translate, translate_with_rules};
pub use scanner::{ScanOutcome, ScanRequest, UnseededFile, scan};
