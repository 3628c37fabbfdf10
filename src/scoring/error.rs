// src/scoring/error.rs - Scoring pipeline failure taxonomy
use thiserror::Error;

/// A failure raised by one of the rule/velocity/anomaly signals. ML failures
/// never surface here — the adapter degrades to `None` internally. Any
/// variant here causes the caller to mark the transaction `declined` and
/// roll back the rest of the scoring writes.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("rule evaluation failed: {0}")]
    Rules(#[source] sqlx::Error),
    #[error("velocity signal failed: {0}")]
    Velocity(#[source] sqlx::Error),
    #[error("anomaly signal failed: {0}")]
    Anomaly(#[source] sqlx::Error),
    #[error("failed to persist scoring result: {0}")]
    Persist(#[source] sqlx::Error),
    #[error("scoring pipeline exceeded its deadline")]
    Timeout,
}
