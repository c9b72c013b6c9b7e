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
#![allow(clippy::module_name_repetitions)]

//! Cycle reports and their delivery by webhook or email.
//!
//! Layout: `report.rs` (plain-text rendering), `webhook.rs` (HTTP delivery
//! with bounded retry), `email.rs` (SMTP delivery), `notifier.rs` (channel
//! selection), `error.rs` (`NotifyError`).

pub mod email;
pub mod error;
pub mod notifier;
pub mod report;
pub mod webhook;

pub use email::{EmailNotifier, SmtpSecurity};
pub use error::{NotifyError, NotifyResult};
pub use notifier::Notifier;
pub use report::{Report, ReportOutcome, format_size};
pub use webhook::{DEFAULT_TITLE, WebhookNotifier};
