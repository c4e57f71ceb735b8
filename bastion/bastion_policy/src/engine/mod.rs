//! Policy validation engine.
//!
//! The validator summarizes one rule list; the aggregator turns the four
//! summaries into a single go/no-go decision.

mod aggregator;
mod validator;

pub use aggregator::{AggregationOutcome, PolicyValidationAggregator};
pub use validator::RuleSetValidator;
