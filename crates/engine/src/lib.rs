//! Embedded stateful ledger engine for Tally.
//!
//! Collaborating subsystems call the [`LedgerEngine`] facade in-process:
//! journals are created and approved synchronously, while posting is
//! acknowledged immediately and executed by a background worker pool.
//! Callers observe the outcome by polling the journal or subscribing to
//! posting events.
//!
//! # Modules
//!
//! - `store` - Keyed in-process stores with per-key serialized mutation
//! - `audit` - Append-only audit trail
//! - `posting` - Deferred posting queue, workers, and commit
//! - `engine` - The `LedgerEngine` facade
//! - `error` - Engine error types

pub mod audit;
pub mod engine;
pub mod error;
pub mod posting;
pub mod store;

pub use engine::{CreateJournalInput, LedgerEngine};
pub use error::EngineError;
pub use posting::{PostingOutcome, PostingResult};
