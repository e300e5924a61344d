//! Ledger store and per-ledger journal numbering.

use dashmap::DashMap;
use tally_core::ledger::Ledger;
use tally_shared::types::LedgerId;

/// In-process ledger store.
#[derive(Debug, Default)]
pub struct LedgerStore {
    ledgers: DashMap<LedgerId, Ledger>,
    journal_numbers: DashMap<LedgerId, u64>,
}

impl LedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a ledger.
    pub fn insert(&self, ledger: Ledger) {
        self.ledgers.insert(ledger.id, ledger);
    }

    /// Returns a ledger by id.
    #[must_use]
    pub fn get(&self, id: LedgerId) -> Option<Ledger> {
        self.ledgers.get(&id).map(|l| l.clone())
    }

    /// Allocates the next sequential journal number for a ledger.
    ///
    /// The counter is advanced under the entry lock, so concurrent callers
    /// never receive the same number.
    #[must_use]
    pub fn next_journal_number(&self, id: LedgerId) -> String {
        let mut counter = self.journal_numbers.entry(id).or_insert(0);
        *counter += 1;
        format!("JE-{:06}", *counter)
    }
}
