//! Chart-of-accounts segments and code combinations.
//!
//! An account (code combination) is the resolved identity of an ordered
//! segment-value tuple within one ledger. Accounts are created lazily on
//! first reference and are immutable afterwards except for the enabled flag.
//!
//! # Modules
//!
//! - `types` - Segment tuples, account classifications, code combinations
//! - `classify` - Leading-digit classification convention
//! - `error` - Chart-of-accounts error types

pub mod classify;
pub mod error;
pub mod types;

pub use classify::ClassificationConvention;
pub use error::CoaError;
pub use types::{AccountClass, CodeCombination, NormalBalance, SegmentTuple};
