//! The posting pipeline.
//!
//! This is the pure half of posting: ordered validation and intercompany
//! balancing against injected lookups, producing a plan the engine commits.
//! Failure handling and the deferred execution model live in the engine.
//!
//! # Modules
//!
//! - `pipeline` - Ordered validation steps and plan construction
//! - `error` - The posting error taxonomy

pub mod error;
pub mod pipeline;

pub use error::PostingError;
pub use pipeline::{PostingPipeline, PostingPlan};
