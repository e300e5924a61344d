//! Engine configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Engine configuration.
///
/// Loaded once at engine construction; per-ledger settings may override
/// the ledger defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Posting worker configuration.
    #[serde(default)]
    pub posting: PostingConfig,
    /// Defaults applied to newly created ledgers.
    #[serde(default)]
    pub ledger_defaults: LedgerDefaults,
}

/// Posting worker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Number of background posting workers.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Capacity of the pending-posting queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Capacity of the posting-outcome event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_worker_count() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    256
}

fn default_event_capacity() -> usize {
    128
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            queue_capacity: default_queue_capacity(),
            event_capacity: default_event_capacity(),
        }
    }
}

/// Defaults applied to newly created ledgers.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerDefaults {
    /// Tolerance for the debit/credit equality check, in the ledger's
    /// minor unit.
    #[serde(default = "default_balance_epsilon")]
    pub balance_epsilon: Decimal,
}

fn default_balance_epsilon() -> Decimal {
    // 0.005 in the minor unit
    Decimal::new(5, 3)
}

impl Default for LedgerDefaults {
    fn default() -> Self {
        Self {
            balance_epsilon: default_balance_epsilon(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            posting: PostingConfig::default(),
            ledger_defaults: LedgerDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
