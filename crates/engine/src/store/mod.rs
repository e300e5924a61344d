//! Keyed in-process stores.
//!
//! Every store is a `DashMap` whose entry API serializes mutation per key.
//! No operation ever holds two entries at once; multi-row commits apply
//! single-key upserts in sorted key order, which fixes the lock-acquisition
//! order across concurrent postings.
//!
//! # Modules
//!
//! - `ledgers` - Ledgers and per-ledger journal numbering
//! - `periods` - Accounting periods
//! - `accounts` - Idempotent code-combination get-or-create
//! - `journals` - Journals
//! - `rules` - Cross-validation and intercompany rule configuration
//! - `balances` - The balance cube

pub mod accounts;
pub mod balances;
pub mod journals;
pub mod ledgers;
pub mod periods;
pub mod rules;

pub use accounts::AccountStore;
pub use balances::BalanceStore;
pub use journals::JournalStore;
pub use ledgers::LedgerStore;
pub use periods::PeriodStore;
pub use rules::{IntercompanyRuleStore, ValidationRuleStore};
