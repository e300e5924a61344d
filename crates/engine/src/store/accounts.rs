//! Idempotent code-combination resolution.

use dashmap::DashMap;
use tally_core::coa::{CoaError, CodeCombination, SegmentTuple};
use tally_core::ledger::Ledger;
use tally_shared::types::{AccountId, LedgerId};

/// In-process account store keyed by canonical segment key.
///
/// The entry API makes get-or-create idempotent under concurrency: two
/// callers racing on the same tuple serialize on the key's shard lock and
/// the loser observes the winner's account.
#[derive(Debug, Default)]
pub struct AccountStore {
    by_key: DashMap<(LedgerId, String), AccountId>,
    by_id: DashMap<AccountId, CodeCombination>,
}

impl AccountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a segment tuple to its account, creating it on first use.
    ///
    /// The classification is derived from the natural-account segment via
    /// the ledger's convention; it only affects sign display.
    ///
    /// # Errors
    ///
    /// Returns `CoaError` if the tuple is malformed or does not match the
    /// ledger's chart structure.
    pub fn get_or_create(
        &self,
        ledger: &Ledger,
        values: Vec<String>,
    ) -> Result<CodeCombination, CoaError> {
        let segments = SegmentTuple::new(values)?;
        if segments.len() != ledger.chart.segment_count() {
            return Err(CoaError::SegmentCountMismatch {
                expected: ledger.chart.segment_count(),
                actual: segments.len(),
            });
        }

        let key = (ledger.id, segments.canonical_key());
        let id = *self.by_key.entry(key).or_insert_with(|| {
            let natural = segments
                .segment(ledger.chart.natural_segment)
                .unwrap_or_default();
            let class = ledger.settings.classification.classify(natural);
            let account = CodeCombination::new(ledger.id, segments.clone(), class);
            let id = account.id;
            self.by_id.insert(id, account);
            id
        });

        self.by_id
            .get(&id)
            .map(|a| a.clone())
            .ok_or(CoaError::AccountNotFound(id))
    }

    /// Returns an account by id.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<CodeCombination> {
        self.by_id.get(&id).map(|a| a.clone())
    }

    /// Sets the enabled flag on an account.
    ///
    /// # Errors
    ///
    /// Returns `CoaError::AccountNotFound` if the account does not exist.
    pub fn set_enabled(&self, id: AccountId, enabled: bool) -> Result<(), CoaError> {
        let mut account = self.by_id.get_mut(&id).ok_or(CoaError::AccountNotFound(id))?;
        account.enabled = enabled;
        Ok(())
    }

    /// Returns the canonical segment key of an account.
    #[must_use]
    pub fn canonical_key_of(&self, id: AccountId) -> Option<String> {
        self.by_id.get(&id).map(|a| a.segments.canonical_key())
    }

    /// Returns the number of accounts in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if no accounts exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
