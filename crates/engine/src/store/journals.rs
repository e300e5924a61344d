//! Journal store.

use dashmap::DashMap;
use tally_core::journal::Journal;
use tally_shared::types::{JournalId, LedgerId};

/// In-process journal store.
#[derive(Debug, Default)]
pub struct JournalStore {
    journals: DashMap<JournalId, Journal>,
}

impl JournalStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a journal.
    pub fn insert(&self, journal: Journal) {
        self.journals.insert(journal.id, journal);
    }

    /// Returns a journal by id.
    #[must_use]
    pub fn get(&self, id: JournalId) -> Option<Journal> {
        self.journals.get(&id).map(|j| j.clone())
    }

    /// Mutates a journal under its entry lock.
    ///
    /// Status checks belong inside `f` so the check-and-transition pair is
    /// atomic with respect to other writers.
    pub fn update<T>(&self, id: JournalId, f: impl FnOnce(&mut Journal) -> T) -> Option<T> {
        self.journals.get_mut(&id).map(|mut j| f(&mut j))
    }

    /// Returns all journals of a ledger, ordered by number.
    #[must_use]
    pub fn journals_for(&self, ledger_id: LedgerId) -> Vec<Journal> {
        let mut journals: Vec<Journal> = self
            .journals
            .iter()
            .filter(|j| j.ledger_id == ledger_id)
            .map(|j| j.clone())
            .collect();
        journals.sort_by(|a, b| a.number.cmp(&b.number));
        journals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::journal::JournalStatus;
    use tally_shared::types::{ActorId, PeriodId};

    fn journal(ledger_id: LedgerId, number: &str) -> Journal {
        Journal {
            id: JournalId::new(),
            ledger_id,
            period_id: PeriodId::new(),
            number: number.into(),
            description: "test".into(),
            currency: "USD".into(),
            status: JournalStatus::Draft,
            requires_approval: false,
            created_by: ActorId::new(),
            submitted_by: None,
            submitted_at: None,
            decided_by: None,
            decided_at: None,
            posted_at: None,
            lines: Vec::new(),
        }
    }

    #[test]
    fn test_update_is_atomic_per_entry() {
        let store = JournalStore::new();
        let ledger_id = LedgerId::new();
        let j = journal(ledger_id, "JE-000001");
        let id = j.id;
        store.insert(j);

        let status = store
            .update(id, |j| {
                j.status = JournalStatus::Posted;
                j.status
            })
            .unwrap();
        assert_eq!(status, JournalStatus::Posted);
        assert_eq!(store.get(id).unwrap().status, JournalStatus::Posted);
    }

    #[test]
    fn test_journals_for_ordered_by_number() {
        let store = JournalStore::new();
        let ledger_id = LedgerId::new();
        store.insert(journal(ledger_id, "JE-000002"));
        store.insert(journal(ledger_id, "JE-000001"));
        store.insert(journal(LedgerId::new(), "JE-000001"));

        let journals = store.journals_for(ledger_id);
        assert_eq!(journals.len(), 2);
        assert_eq!(journals[0].number, "JE-000001");
    }
}
