//! Period store.

use dashmap::DashMap;
use tally_core::period::{Period, PeriodStatus};
use tally_shared::types::{LedgerId, PeriodId};

/// In-process period store.
#[derive(Debug, Default)]
pub struct PeriodStore {
    periods: DashMap<PeriodId, Period>,
}

impl PeriodStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a period.
    pub fn insert(&self, period: Period) {
        self.periods.insert(period.id, period);
    }

    /// Returns a period by id.
    #[must_use]
    pub fn get(&self, id: PeriodId) -> Option<Period> {
        self.periods.get(&id).map(|p| p.clone())
    }

    /// Returns only the status of a period.
    ///
    /// The posting worker re-reads this at execution time so a close queued
    /// ahead of the posting still wins.
    #[must_use]
    pub fn status_of(&self, id: PeriodId) -> Option<PeriodStatus> {
        self.periods.get(&id).map(|p| p.status)
    }

    /// Mutates a period under its entry lock.
    pub fn update<T>(&self, id: PeriodId, f: impl FnOnce(&mut Period) -> T) -> Option<T> {
        self.periods.get_mut(&id).map(|mut p| f(&mut p))
    }

    /// Returns all periods of a ledger, ordered by start date.
    #[must_use]
    pub fn periods_for(&self, ledger_id: LedgerId) -> Vec<Period> {
        let mut periods: Vec<Period> = self
            .periods
            .iter()
            .filter(|p| p.ledger_id == ledger_id)
            .map(|p| p.clone())
            .collect();
        periods.sort_by_key(|p| p.start_date);
        periods
    }
}
