//! Intercompany error types.

use thiserror::Error;

/// Errors that can occur during intercompany balancing.
///
/// Both variants abort the whole posting; the journal is never partially
/// balanced.
#[derive(Debug, Error)]
pub enum IntercompanyError {
    /// No rule is configured for the required ordered company pair.
    #[error("No intercompany rule configured for {from} -> {to}")]
    RuleMissing {
        /// The debtor company.
        from: String,
        /// The creditor company.
        to: String,
    },

    /// A company still nets non-zero after pairwise reduction.
    #[error("Company {company} remains unbalanced after intercompany reduction")]
    Unresolved {
        /// The company with a residual net.
        company: String,
    },
}

impl IntercompanyError {
    /// Returns the stable error code used in audit payloads.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RuleMissing { .. } | Self::Unresolved { .. } => "INTERCOMPANY_RULE_MISSING",
        }
    }
}
