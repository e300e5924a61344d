//! The `LedgerEngine` facade.
//!
//! Collaborating subsystems use this surface in-process: account
//! resolution, journal creation, the approval gate, rule configuration,
//! period lifecycle, balance queries, and the asynchronous posting trigger.

use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use tally_core::approval::{ApprovalAction, ApprovalDecision, ApprovalError, ApprovalGate};
use tally_core::balance::Balance;
use tally_core::coa::CodeCombination;
use tally_core::intercompany::IntercompanyRule;
use tally_core::journal::{
    AccountRef, Journal, JournalError, JournalLine, JournalService, JournalStatus, LineInput,
};
use tally_core::ledger::{ChartStructure, Ledger, LedgerSettings};
use tally_core::period::Period;
use tally_core::validation::ValidationRule;
use tally_shared::config::EngineConfig;
use tally_shared::types::{
    AccountId, ActorId, JournalId, LedgerId, PeriodId, ValidationRuleId,
};

use crate::audit::{action, AuditEntry, AuditLog, EntityKind};
use crate::error::EngineError;
use crate::posting::{self, PostingJob, PostingOutcome};
use crate::store::{
    AccountStore, BalanceStore, IntercompanyRuleStore, JournalStore, LedgerStore, PeriodStore,
    ValidationRuleStore,
};

/// Input for creating a journal: header plus ordered lines.
#[derive(Debug, Clone)]
pub struct CreateJournalInput {
    /// The ledger to create the journal in.
    pub ledger_id: LedgerId,
    /// The period the journal posts into.
    pub period_id: PeriodId,
    /// Description of the journal.
    pub description: String,
    /// Header currency code.
    pub currency: String,
    /// Whether posting requires an approval decision.
    pub requires_approval: bool,
    /// The creating actor.
    pub created_by: ActorId,
    /// Ordered line inputs.
    pub lines: Vec<LineInput>,
}

/// Shared engine state: stores, audit trail, and the outcome channel.
pub(crate) struct EngineInner {
    pub(crate) config: EngineConfig,
    pub(crate) ledgers: LedgerStore,
    pub(crate) periods: PeriodStore,
    pub(crate) accounts: AccountStore,
    pub(crate) journals: JournalStore,
    pub(crate) validation_rules: ValidationRuleStore,
    pub(crate) intercompany_rules: IntercompanyRuleStore,
    pub(crate) balances: BalanceStore,
    pub(crate) audit: AuditLog,
    pub(crate) outcomes: broadcast::Sender<PostingOutcome>,
}

/// The embedded ledger engine.
///
/// Synchronous operations act on the stores directly; `post_journal`
/// enqueues a deferred job and acknowledges immediately. Call [`start`]
/// inside a tokio runtime to spawn the worker pool, and [`shutdown`] to
/// stop it.
///
/// [`start`]: LedgerEngine::start
/// [`shutdown`]: LedgerEngine::shutdown
pub struct LedgerEngine {
    inner: Arc<EngineInner>,
    jobs: mpsc::Sender<PostingJob>,
    queue: Mutex<Option<mpsc::Receiver<PostingJob>>>,
    shutdown: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl LedgerEngine {
    /// Creates an engine with the given configuration.
    ///
    /// Jobs can be enqueued immediately; they are executed once [`start`]
    /// has spawned the worker pool.
    ///
    /// [`start`]: LedgerEngine::start
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let (jobs, queue) = mpsc::channel(config.posting.queue_capacity);
        let (outcomes, _) = broadcast::channel(config.posting.event_capacity);
        let (shutdown, _) = watch::channel(false);

        Self {
            inner: Arc::new(EngineInner {
                config,
                ledgers: LedgerStore::new(),
                periods: PeriodStore::new(),
                accounts: AccountStore::new(),
                journals: JournalStore::new(),
                validation_rules: ValidationRuleStore::new(),
                intercompany_rules: IntercompanyRuleStore::new(),
                balances: BalanceStore::new(),
                audit: AuditLog::new(),
                outcomes,
            }),
            jobs,
            queue: Mutex::new(Some(queue)),
            shutdown,
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Spawns the posting worker pool. Idempotent; must run inside a tokio
    /// runtime.
    pub fn start(&self) {
        let Some(queue) = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };
        let queue = Arc::new(tokio::sync::Mutex::new(queue));

        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        for worker in 0..self.inner.config.posting.worker_count {
            let queue = Arc::clone(&queue);
            let inner = Arc::clone(&self.inner);
            let mut shutdown = self.shutdown.subscribe();
            workers.push(tokio::spawn(async move {
                debug!(worker, "Posting worker started");
                loop {
                    let job = tokio::select! {
                        job = async { queue.lock().await.recv().await } => job,
                        _ = shutdown.changed() => break,
                    };
                    let Some(job) = job else { break };
                    debug!(worker, journal_id = %job.journal_id, "Posting job picked up");
                    posting::execute(&inner, &job);
                }
                debug!(worker, "Posting worker stopped");
            }));
        }
    }

    /// Signals the workers to stop and waits for them to finish their
    /// current job. Queued jobs that have not started are abandoned.
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let handles: Vec<JoinHandle<()>> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    // ========== Ledgers & periods ==========

    /// Creates a ledger, applying the engine's configured defaults.
    pub fn create_ledger(
        &self,
        name: &str,
        functional_currency: &str,
        chart: ChartStructure,
    ) -> Ledger {
        let mut ledger = Ledger::new(name, functional_currency, chart);
        ledger.settings.balance_epsilon = self.inner.config.ledger_defaults.balance_epsilon;
        self.inner.ledgers.insert(ledger.clone());
        ledger
    }

    /// Replaces a ledger's posting settings.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::LedgerNotFound` if the ledger does not exist.
    pub fn update_ledger_settings(
        &self,
        ledger_id: LedgerId,
        settings: LedgerSettings,
    ) -> Result<Ledger, EngineError> {
        let mut ledger = self
            .inner
            .ledgers
            .get(ledger_id)
            .ok_or(EngineError::LedgerNotFound(ledger_id))?;
        ledger.settings = settings;
        self.inner.ledgers.insert(ledger.clone());
        Ok(ledger)
    }

    /// Creates a period in the Future state.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::LedgerNotFound` if the ledger does not exist.
    pub fn create_period(
        &self,
        ledger_id: LedgerId,
        name: &str,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    ) -> Result<Period, EngineError> {
        if self.inner.ledgers.get(ledger_id).is_none() {
            return Err(EngineError::LedgerNotFound(ledger_id));
        }
        let period = Period::new(ledger_id, name, start_date, end_date);
        self.inner.periods.insert(period.clone());
        Ok(period)
    }

    /// Opens a Future period for posting.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the period is missing or the transition is
    /// invalid.
    pub fn open_period(&self, period_id: PeriodId, actor: ActorId) -> Result<Period, EngineError> {
        let period = self
            .inner
            .periods
            .update(period_id, |p| p.open().map(|()| p.clone()))
            .ok_or(EngineError::PeriodNotFound(period_id))??;
        self.audit_period(&period, action::PERIOD_OPENED, actor);
        Ok(period)
    }

    /// Closes an Open period. Any posting still queued against it will
    /// fail deterministically when it executes.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the period is missing or the transition is
    /// invalid.
    pub fn close_period(&self, period_id: PeriodId, actor: ActorId) -> Result<Period, EngineError> {
        let period = self
            .inner
            .periods
            .update(period_id, |p| p.close().map(|()| p.clone()))
            .ok_or(EngineError::PeriodNotFound(period_id))??;
        self.audit_period(&period, action::PERIOD_CLOSED, actor);
        Ok(period)
    }

    /// Reopens a Closed period.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the period is missing or the transition is
    /// invalid.
    pub fn reopen_period(
        &self,
        period_id: PeriodId,
        actor: ActorId,
    ) -> Result<Period, EngineError> {
        let period = self
            .inner
            .periods
            .update(period_id, |p| p.reopen().map(|()| p.clone()))
            .ok_or(EngineError::PeriodNotFound(period_id))??;
        self.audit_period(&period, action::PERIOD_REOPENED, actor);
        Ok(period)
    }

    /// Returns a period by id.
    #[must_use]
    pub fn period(&self, period_id: PeriodId) -> Option<Period> {
        self.inner.periods.get(period_id)
    }

    /// Returns all periods of a ledger, ordered by start date.
    #[must_use]
    pub fn periods(&self, ledger_id: LedgerId) -> Vec<Period> {
        self.inner.periods.periods_for(ledger_id)
    }

    /// Seeds the target period's beginning balances from the source
    /// period's ending balances. Returns the number of rows carried.
    #[must_use]
    pub fn carry_forward_balances(
        &self,
        ledger_id: LedgerId,
        from_period: PeriodId,
        to_period: PeriodId,
    ) -> usize {
        self.inner
            .balances
            .carry_forward(ledger_id, from_period, to_period)
    }

    // ========== Accounts ==========

    /// Resolves a segment tuple to its account, creating it on first use.
    ///
    /// Idempotent under concurrency: the same tuple always yields the same
    /// account.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the ledger is missing or the tuple is
    /// malformed.
    pub fn get_or_create_account(
        &self,
        ledger_id: LedgerId,
        segments: Vec<String>,
    ) -> Result<CodeCombination, EngineError> {
        let ledger = self
            .inner
            .ledgers
            .get(ledger_id)
            .ok_or(EngineError::LedgerNotFound(ledger_id))?;
        Ok(self.inner.accounts.get_or_create(&ledger, segments)?)
    }

    /// Returns an account by id.
    #[must_use]
    pub fn account(&self, account_id: AccountId) -> Option<CodeCombination> {
        self.inner.accounts.get(account_id)
    }

    /// Enables or disables an account for new postings.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the account does not exist.
    pub fn set_account_enabled(
        &self,
        account_id: AccountId,
        enabled: bool,
    ) -> Result<(), EngineError> {
        Ok(self.inner.accounts.set_enabled(account_id, enabled)?)
    }

    // ========== Journals ==========

    /// Creates a journal in Draft with resolved lines.
    ///
    /// Lines may reference accounts by id or by raw segment tuple; raw
    /// tuples are resolved get-or-create.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if validation or account resolution fails.
    pub fn create_journal(&self, input: CreateJournalInput) -> Result<Journal, EngineError> {
        let ledger = self
            .inner
            .ledgers
            .get(input.ledger_id)
            .ok_or(EngineError::LedgerNotFound(input.ledger_id))?;
        if self.inner.periods.get(input.period_id).is_none() {
            return Err(EngineError::PeriodNotFound(input.period_id));
        }

        let lines = self.resolve_lines(&ledger, &input.lines)?;

        let journal = Journal {
            id: JournalId::new(),
            ledger_id: input.ledger_id,
            period_id: input.period_id,
            number: self.inner.ledgers.next_journal_number(input.ledger_id),
            description: input.description,
            currency: input.currency,
            status: JournalStatus::Draft,
            requires_approval: input.requires_approval,
            created_by: input.created_by,
            submitted_by: None,
            submitted_at: None,
            decided_by: None,
            decided_at: None,
            posted_at: None,
            lines,
        };
        self.inner.journals.insert(journal.clone());
        Ok(journal)
    }

    /// Replaces an editable journal's lines for correction before retry.
    ///
    /// A journal whose posting failed stays Draft; callers fix its lines
    /// through this and trigger posting again.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the journal is missing, not editable, or
    /// the new lines fail validation or account resolution.
    pub fn replace_journal_lines(
        &self,
        journal_id: JournalId,
        lines: Vec<LineInput>,
    ) -> Result<Journal, EngineError> {
        let journal = self
            .inner
            .journals
            .get(journal_id)
            .ok_or(EngineError::JournalNotFound(journal_id))?;
        let ledger = self
            .inner
            .ledgers
            .get(journal.ledger_id)
            .ok_or(EngineError::LedgerNotFound(journal.ledger_id))?;

        let resolved = self.resolve_lines(&ledger, &lines)?;
        let journal = self
            .inner
            .journals
            .update(journal_id, |j| -> Result<Journal, JournalError> {
                if !j.status.is_editable() {
                    return Err(JournalError::NotEditable { status: j.status });
                }
                j.lines = resolved;
                Ok(j.clone())
            })
            .ok_or(EngineError::JournalNotFound(journal_id))??;
        Ok(journal)
    }

    /// Returns a journal by id. Callers poll this to observe the outcome
    /// of a deferred posting.
    #[must_use]
    pub fn journal(&self, journal_id: JournalId) -> Option<Journal> {
        self.inner.journals.get(journal_id)
    }

    /// Returns all journals of a ledger, ordered by number.
    #[must_use]
    pub fn journals(&self, ledger_id: LedgerId) -> Vec<Journal> {
        self.inner.journals.journals_for(ledger_id)
    }

    // ========== Approval ==========

    /// Submits a draft journal for approval.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the journal is missing or the transition is
    /// invalid. Gate errors surface synchronously.
    pub fn submit_for_approval(
        &self,
        journal_id: JournalId,
        actor: ActorId,
    ) -> Result<Journal, EngineError> {
        let journal = self
            .inner
            .journals
            .update(journal_id, |j| -> Result<Journal, ApprovalError> {
                let submit = ApprovalGate::submit(j.status, j.requires_approval, actor)?;
                if let ApprovalAction::Submit {
                    new_status,
                    submitted_by,
                    submitted_at,
                } = submit
                {
                    j.status = new_status;
                    j.submitted_by = Some(submitted_by);
                    j.submitted_at = Some(submitted_at);
                }
                Ok(j.clone())
            })
            .ok_or(EngineError::JournalNotFound(journal_id))??;

        self.inner.audit.record(
            EntityKind::Journal,
            journal_id.into_inner(),
            action::JOURNAL_SUBMITTED,
            Some(actor),
            json!({ "number": journal.number }),
        );
        Ok(journal)
    }

    /// Decides a pending journal's approval.
    ///
    /// Fails with `SegregationOfDuties` when the actor created the journal,
    /// regardless of the outcome chosen.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the journal is missing or the gate rejects
    /// the decision.
    pub fn decide_approval(
        &self,
        journal_id: JournalId,
        actor: ActorId,
        decision: ApprovalDecision,
    ) -> Result<Journal, EngineError> {
        let journal = self
            .inner
            .journals
            .update(journal_id, |j| -> Result<Journal, ApprovalError> {
                let decide = ApprovalGate::decide(j.status, j.created_by, actor, decision)?;
                if let ApprovalAction::Decide {
                    new_status,
                    decided_by,
                    decided_at,
                    ..
                } = decide
                {
                    j.status = new_status;
                    j.decided_by = Some(decided_by);
                    j.decided_at = Some(decided_at);
                }
                Ok(j.clone())
            })
            .ok_or(EngineError::JournalNotFound(journal_id))??;

        let audit_action = match decision {
            ApprovalDecision::Approve => action::JOURNAL_APPROVED,
            ApprovalDecision::Reject => action::JOURNAL_REJECTED,
        };
        self.inner.audit.record(
            EntityKind::Journal,
            journal_id.into_inner(),
            audit_action,
            Some(actor),
            json!({ "number": journal.number }),
        );
        Ok(journal)
    }

    /// Reopens a rejected journal back to Draft for correction.
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the journal is missing or not Rejected.
    pub fn reopen_rejected(
        &self,
        journal_id: JournalId,
        actor: ActorId,
    ) -> Result<Journal, EngineError> {
        let journal = self
            .inner
            .journals
            .update(journal_id, |j| -> Result<Journal, ApprovalError> {
                j.status = ApprovalGate::reopen(j.status)?;
                j.submitted_by = None;
                j.submitted_at = None;
                j.decided_by = None;
                j.decided_at = None;
                Ok(j.clone())
            })
            .ok_or(EngineError::JournalNotFound(journal_id))??;

        self.inner.audit.record(
            EntityKind::Journal,
            journal_id.into_inner(),
            action::JOURNAL_REOPENED,
            Some(actor),
            json!({ "number": journal.number }),
        );
        Ok(journal)
    }

    // ========== Posting ==========

    /// Triggers posting of a journal.
    ///
    /// Returns as soon as the job is queued; the validate-balance-commit
    /// sequence runs on the worker pool. Observe the outcome by polling
    /// [`journal`] or via [`subscribe`].
    ///
    /// [`journal`]: LedgerEngine::journal
    /// [`subscribe`]: LedgerEngine::subscribe
    ///
    /// # Errors
    ///
    /// Returns `EngineError` if the journal does not exist or the queue is
    /// full or closed.
    pub fn post_journal(&self, journal_id: JournalId, actor: ActorId) -> Result<(), EngineError> {
        if *self.shutdown.borrow() {
            return Err(EngineError::QueueClosed);
        }
        if self.inner.journals.get(journal_id).is_none() {
            return Err(EngineError::JournalNotFound(journal_id));
        }
        self.jobs
            .try_send(PostingJob { journal_id, actor })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => EngineError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => EngineError::QueueClosed,
            })
    }

    /// Subscribes to posting outcome events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PostingOutcome> {
        self.inner.outcomes.subscribe()
    }

    // ========== Rules ==========

    /// Inserts or replaces a cross-validation rule.
    pub fn upsert_validation_rule(&self, rule: ValidationRule) {
        self.inner.validation_rules.upsert(rule);
    }

    /// Removes a cross-validation rule.
    pub fn remove_validation_rule(&self, rule_id: ValidationRuleId) {
        self.inner.validation_rules.remove(rule_id);
    }

    /// Returns a ledger's cross-validation rules in priority order.
    #[must_use]
    pub fn validation_rules(&self, ledger_id: LedgerId) -> Vec<ValidationRule> {
        self.inner.validation_rules.rules_for(ledger_id)
    }

    /// Inserts or replaces the intercompany rule for its ordered pair.
    pub fn upsert_intercompany_rule(&self, rule: IntercompanyRule) {
        self.inner.intercompany_rules.upsert(rule);
    }

    /// Removes the intercompany rule for an ordered company pair.
    pub fn remove_intercompany_rule(
        &self,
        ledger_id: LedgerId,
        from_company: &str,
        to_company: &str,
    ) {
        self.inner
            .intercompany_rules
            .remove(ledger_id, from_company, to_company);
    }

    /// Returns all intercompany rules of a ledger.
    #[must_use]
    pub fn intercompany_rules(&self, ledger_id: LedgerId) -> Vec<IntercompanyRule> {
        self.inner.intercompany_rules.rules_for(ledger_id)
    }

    // ========== Balances & audit ==========

    /// Returns balance rows for a ledger and period.
    ///
    /// `account_range` filters on the canonical segment key (inclusive
    /// bounds); `currency` filters on the row currency. This is the row set
    /// the report reader consumes.
    #[must_use]
    pub fn balances(
        &self,
        ledger_id: LedgerId,
        period_id: PeriodId,
        account_range: Option<(&str, &str)>,
        currency: Option<&str>,
    ) -> Vec<Balance> {
        let mut rows = self.inner.balances.rows_for(ledger_id, period_id);
        if let Some(currency) = currency {
            rows.retain(|r| r.currency == currency);
        }
        if let Some((low, high)) = account_range {
            rows.retain(|r| {
                self.inner
                    .accounts
                    .canonical_key_of(r.account_id)
                    .is_some_and(|key| key.as_str() >= low && key.as_str() <= high)
            });
        }
        rows
    }

    /// Returns the audit trail of one entity, oldest first.
    #[must_use]
    pub fn audit_entries_for(&self, entity_id: Uuid) -> Vec<AuditEntry> {
        self.inner.audit.entries_for(entity_id)
    }

    /// Resolves line inputs against the account store, creating accounts
    /// for raw segment tuples on first use.
    fn resolve_lines(
        &self,
        ledger: &Ledger,
        lines: &[LineInput],
    ) -> Result<Vec<JournalLine>, EngineError> {
        Ok(JournalService::resolve_lines(
            lines,
            &ledger.functional_currency,
            ledger.chart.company_segment,
            |account_ref| match account_ref {
                AccountRef::Id(id) => self
                    .inner
                    .accounts
                    .get(*id)
                    .ok_or(tally_core::coa::CoaError::AccountNotFound(*id)),
                AccountRef::Segments(values) => {
                    self.inner.accounts.get_or_create(ledger, values.clone())
                }
            },
        )?)
    }

    fn audit_period(&self, period: &Period, action: &str, actor: ActorId) {
        self.inner.audit.record(
            EntityKind::Period,
            period.id.into_inner(),
            action,
            Some(actor),
            json!({ "name": period.name, "status": period.status }),
        );
    }
}
