//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance service:
//! - Statement CSV reading with per-bank header tolerance
//! - Amount and date normalization
//! - Keyword categorization and recurring-charge detection
//! - Row-to-record mapping and batch orchestration
//! - Storage collaborator seam (platform REST endpoint, in-memory)
//!
//! The pipeline itself is pure and request-scoped: raw CSV text plus an
//! owner id in, transaction and subscription records out. Nothing here
//! holds state across uploads.

pub mod amount;
pub mod classify;
pub mod dates;
pub mod error;
pub mod fields;
pub mod models;
pub mod pipeline;
pub mod rows;
pub mod store;

pub use error::{Error, Result};
pub use models::{Category, DetectedSubscription, Frequency, SubscriptionStatus, Transaction};
pub use pipeline::{map_row, process_rows, IngestOutcome, MappedRow, Skip};
pub use rows::{read_rows, RawRow};
pub use store::{insert_records, MemoryStore, RestStore, Store};
