// src/engine/mod.rs - JSON predicate-tree rule engine
#![allow(dead_code)]

pub mod condition;
pub mod evaluate;

pub use condition::Condition;
pub use evaluate::{evaluate, ActiveRule, RuleEvaluation, RuleExplanation};
