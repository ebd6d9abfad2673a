//! Rule-based build analysis.

pub mod engine;
pub mod rules;

pub use engine::RuleBasedAnalysisEngine;
pub use rules::AnalysisRules;
