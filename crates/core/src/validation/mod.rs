//! Cross-validation rules over account segments.
//!
//! A rule names a disallowed combination: an account whose segments match
//! both the include and the exclude predicate violates the rule.
//!
//! # Modules
//!
//! - `types` - Typed segment predicates and rule definitions
//! - `evaluator` - Priority-ordered rule evaluation

pub mod evaluator;
pub mod types;

pub use evaluator::ValidationEngine;
pub use types::{SegmentPredicate, ValidationRule, Violation};
