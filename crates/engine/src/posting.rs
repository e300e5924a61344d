//! Deferred posting execution.
//!
//! `LedgerEngine::post_journal` only enqueues; the functions here run on
//! the worker pool, re-validate at execution time, and either commit the
//! journal with its balance updates or leave it untouched and record the
//! failure on the audit trail. Pipeline errors never propagate out of a
//! worker.

use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, warn};

use tally_core::coa::AccountClass;
use tally_core::journal::JournalStatus;
use tally_core::posting::{PostingError, PostingPipeline};
use tally_shared::types::{AccountId, ActorId, JournalId};

use crate::audit::{action, EntityKind};
use crate::engine::EngineInner;

/// A queued posting request.
#[derive(Debug, Clone)]
pub struct PostingJob {
    /// The journal to post.
    pub journal_id: JournalId,
    /// The actor who triggered the posting.
    pub actor: ActorId,
}

/// Terminal result of one posting attempt.
#[derive(Debug, Clone)]
pub enum PostingResult {
    /// The journal was committed.
    Posted {
        /// Final number of lines, including synthesized ones.
        lines: usize,
    },
    /// The posting was aborted; the journal is unchanged.
    Failed {
        /// Stable error code.
        code: String,
        /// Human-readable error message.
        message: String,
    },
}

/// Event broadcast when a posting attempt finishes.
#[derive(Debug, Clone)]
pub struct PostingOutcome {
    /// The journal the attempt was for.
    pub journal_id: JournalId,
    /// What happened.
    pub result: PostingResult,
}

/// Runs one posting job to completion.
///
/// Validation happens against the stores as they are *now*, not as they
/// were at submission: a period closed while the job sat in the queue
/// deterministically fails the posting.
pub(crate) fn execute(inner: &EngineInner, job: &PostingJob) {
    let Some(journal) = inner.journals.get(job.journal_id) else {
        fail(inner, job, "JOURNAL_NOT_FOUND", "Journal not found");
        return;
    };
    let Some(ledger) = inner.ledgers.get(journal.ledger_id) else {
        fail(inner, job, "LEDGER_NOT_FOUND", "Ledger not found");
        return;
    };
    let Some(period_status) = inner.periods.status_of(journal.period_id) else {
        fail(inner, job, "PERIOD_NOT_FOUND", "Period not found");
        return;
    };

    let rules = inner.validation_rules.rules_for(journal.ledger_id);
    let plan = PostingPipeline::plan(
        &journal,
        period_status,
        &rules,
        |id| inner.accounts.get(id),
        |from, to| inner.intercompany_rules.lookup(journal.ledger_id, from, to),
        &ledger.functional_currency,
        ledger.settings.balance_epsilon,
    );
    let plan = match plan {
        Ok(plan) => plan,
        Err(e) => {
            fail(inner, job, e.error_code(), &e.to_string());
            return;
        }
    };

    // Every account, including those behind synthesized lines, must resolve
    // before anything is committed.
    let mut classes: HashMap<AccountId, AccountClass> = HashMap::new();
    for line in journal.lines.iter().chain(plan.synthesized.iter()) {
        match inner.accounts.get(line.account_id) {
            Some(account) => {
                classes.insert(line.account_id, account.class);
            }
            None => {
                let e = PostingError::AccountNotFound(line.account_id);
                fail(inner, job, e.error_code(), &e.to_string());
                return;
            }
        }
    }

    // The close barrier: a period closed between planning and commit still
    // aborts the posting.
    let period_open = inner
        .periods
        .status_of(journal.period_id)
        .is_some_and(|s| s.allows_posting());
    if !period_open {
        let e = PostingError::PeriodClosed;
        fail(inner, job, e.error_code(), &e.to_string());
        return;
    }

    // Commit the journal under its entry lock. A concurrent posting of the
    // same journal loses here and aborts without touching balances.
    let committed = inner
        .journals
        .update(job.journal_id, |j| {
            if j.status == journal.status {
                j.lines.extend(plan.synthesized.iter().cloned());
                j.status = JournalStatus::Posted;
                j.posted_at = Some(Utc::now());
                Some(j.lines.clone())
            } else {
                None
            }
        })
        .flatten();
    let Some(lines) = committed else {
        fail(
            inner,
            job,
            "JOURNAL_NOT_POSTABLE",
            "Journal changed state during posting",
        );
        return;
    };

    inner.balances.apply_posting(
        journal.ledger_id,
        journal.period_id,
        &ledger.functional_currency,
        &lines,
        |id| classes.get(&id).copied().unwrap_or(AccountClass::Asset),
    );

    inner.audit.record(
        EntityKind::Journal,
        job.journal_id.into_inner(),
        action::JOURNAL_POSTED,
        Some(job.actor),
        json!({
            "number": journal.number,
            "lines": lines.len(),
            "total_debit": plan.totals.accounted_debit,
            "total_credit": plan.totals.accounted_credit,
        }),
    );
    info!(
        journal_id = %job.journal_id,
        number = %journal.number,
        lines = lines.len(),
        "Journal posted"
    );
    let _ = inner.outcomes.send(PostingOutcome {
        journal_id: job.journal_id,
        result: PostingResult::Posted { lines: lines.len() },
    });
}

/// Records a failed attempt and leaves the journal in its pre-post state.
fn fail(inner: &EngineInner, job: &PostingJob, code: &str, message: &str) {
    inner.audit.record(
        EntityKind::Journal,
        job.journal_id.into_inner(),
        action::JOURNAL_POST_FAILED,
        Some(job.actor),
        json!({ "error_code": code, "message": message }),
    );
    warn!(
        journal_id = %job.journal_id,
        error_code = code,
        "Journal posting failed: {message}"
    );
    let _ = inner.outcomes.send(PostingOutcome {
        journal_id: job.journal_id,
        result: PostingResult::Failed {
            code: code.to_string(),
            message: message.to_string(),
        },
    });
}
