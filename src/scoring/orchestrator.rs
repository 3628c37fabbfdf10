// src/scoring/orchestrator.rs - Rules/velocity/anomaly/ML blend and persistence
use risksentinel_database::models::{Alert, RiskScore, Transaction};
use risksentinel_database::{AlertRepository, AuditLogRepository, RiskScoreRepository, RuleRepository, TransactionRepository};
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};

use crate::analytics::{compute_anomaly, compute_velocity, AnomalyResult, AnomalyThresholds, VelocityResult, VelocityThresholds};
use crate::engine::{evaluate, ActiveRule};
use crate::ml::MlAdapter;

use super::error::ScoringError;
use super::level::RiskLevel;

const RULE_WEIGHT_WITH_ML: f64 = 0.30;
const VELOCITY_WEIGHT_WITH_ML: f64 = 0.22;
const ANOMALY_WEIGHT_WITH_ML: f64 = 0.23;
const ML_WEIGHT: f64 = 0.25;

const RULE_WEIGHT_NO_ML: f64 = 0.35;
const VELOCITY_WEIGHT_NO_ML: f64 = 0.33;
const ANOMALY_WEIGHT_NO_ML: f64 = 0.32;

/// Result of running `score_transaction`, ready for the caller to commit.
pub struct ScoringOutcome {
    pub risk_score: RiskScore,
    pub alert: Option<Alert>,
    pub level: RiskLevel,
}

/// Runs the rules/velocity/anomaly/ML signals against a staged transaction
/// and persists a RiskScore (plus Alert and AuditLog where warranted) onto
/// the caller-supplied transaction. The caller owns the commit.
pub struct ScoringOrchestrator {
    rules: RuleRepository,
    transactions: TransactionRepository,
    velocity_thresholds: VelocityThresholds,
    anomaly_thresholds: AnomalyThresholds,
    ml: MlAdapter,
}

impl ScoringOrchestrator {
    pub fn new(
        pool: PgPool,
        velocity_thresholds: VelocityThresholds,
        anomaly_thresholds: AnomalyThresholds,
        ml: MlAdapter,
    ) -> Self {
        Self {
            rules: RuleRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool),
            velocity_thresholds,
            anomaly_thresholds,
            ml,
        }
    }

    pub async fn score_transaction(
        &self,
        tx: &mut SqlxTransaction<'_, Postgres>,
        transaction: &Transaction,
    ) -> Result<ScoringOutcome, ScoringError> {
        let rule_rows = self.rules.list_active().await.map_err(ScoringError::Rules)?;
        let active_rules: Vec<ActiveRule> = rule_rows.iter().map(ActiveRule::from_row).collect();
        let rule_eval = evaluate(transaction, &active_rules);

        let (velocity, anomaly) = tokio::try_join!(
            self.compute_velocity_signal(transaction),
            self.compute_anomaly_signal(transaction),
        )?;

        let ml_score = self.ml.predict(transaction);

        let composite = blend(rule_eval.rule_score, velocity.score, anomaly.score, ml_score);
        let level = RiskLevel::classify(composite);

        let triggered_rules_json = serde_json::to_value(&rule_eval.triggered_codes).unwrap_or_default();
        let explanation_json = serde_json::to_value(&rule_eval.explanation).unwrap_or_default();

        let risk_score = RiskScoreRepository::insert(
            tx,
            transaction.id,
            composite,
            rule_eval.rule_score,
            velocity.score,
            anomaly.score,
            ml_score,
            level.as_str(),
            triggered_rules_json,
            explanation_json,
        )
        .await
        .map_err(ScoringError::Persist)?;

        let mut alert = None;
        if level.requires_alert() {
            TransactionRepository::update_status(tx, transaction.id, "flagged")
                .await
                .map_err(ScoringError::Persist)?;

            let alert_type = select_alert_type(rule_eval.rule_score, velocity.score);
            let severity = level.as_str();
            let message = format!(
                "composite={composite:.4} level={level} triggered_rules={:?}",
                rule_eval.triggered_codes
            );
            let metadata = serde_json::json!({
                "composite_score": composite,
                "risk_level": level.as_str(),
                "triggered_rules": rule_eval.triggered_codes,
            });

            alert = Some(
                AlertRepository::insert(tx, transaction.id, severity, alert_type, &message, metadata)
                    .await
                    .map_err(ScoringError::Persist)?,
            );
        }

        let audit_details = serde_json::json!({
            "composite_score": composite,
            "risk_level": level.as_str(),
            "triggered_rules": rule_eval.triggered_codes,
        });
        AuditLogRepository::insert(tx, Some(transaction.id), "system", "TRANSACTION_SCORED", audit_details)
            .await
            .map_err(ScoringError::Persist)?;

        Ok(ScoringOutcome { risk_score, alert, level })
    }

    async fn compute_velocity_signal(&self, transaction: &Transaction) -> Result<VelocityResult, ScoringError> {
        let recent = self
            .transactions
            .recent_by_sender(&transaction.sender_id, self.velocity_thresholds.window_seconds, transaction.id)
            .await
            .map_err(ScoringError::Velocity)?;
        Ok(compute_velocity(&recent, self.velocity_thresholds))
    }

    async fn compute_anomaly_signal(&self, transaction: &Transaction) -> Result<AnomalyResult, ScoringError> {
        let history = self
            .transactions
            .historical_amounts_by_sender(&transaction.sender_id, transaction.id, self.anomaly_thresholds.lookback_days)
            .await
            .map_err(ScoringError::Anomaly)?;
        Ok(compute_anomaly(&transaction.amount_zar, &history, self.anomaly_thresholds))
    }
}

fn blend(rule: f64, velocity: f64, anomaly: f64, ml: Option<f64>) -> f64 {
    let composite = match ml {
        Some(ml) => {
            RULE_WEIGHT_WITH_ML * rule
                + VELOCITY_WEIGHT_WITH_ML * velocity
                + ANOMALY_WEIGHT_WITH_ML * anomaly
                + ML_WEIGHT * ml
        }
        None => RULE_WEIGHT_NO_ML * rule + VELOCITY_WEIGHT_NO_ML * velocity + ANOMALY_WEIGHT_NO_ML * anomaly,
    };
    round4(composite.min(1.0))
}

/// Priority order when more than one condition qualifies for an alert:
/// fraud-rule signal first, then velocity breach, falling back to anomaly.
fn select_alert_type(rule_score: f64, velocity_score: f64) -> &'static str {
    if rule_score > 0.5 {
        "FRAUD_SUSPECTED"
    } else if velocity_score >= 1.0 {
        "VELOCITY_BREACH"
    } else {
        "ANOMALY_DETECTED"
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_redistributes_ml_share_when_absent() {
        let with_ml = blend(1.0, 1.0, 1.0, Some(1.0));
        assert_eq!(with_ml, 1.0);
        let without_ml = blend(1.0, 1.0, 1.0, None);
        assert_eq!(without_ml, 1.0);
    }

    #[test]
    fn critical_amount_alone_does_not_force_high_risk() {
        // RULE_CRITICAL_AMOUNT fires at weight 0.45, no velocity/anomaly history.
        let composite = blend(0.45, 0.0, 0.0, None);
        assert!((composite - 0.1575).abs() < 1e-9);
        assert_eq!(RiskLevel::classify(composite), RiskLevel::Low);
    }

    #[test]
    fn alert_type_prioritizes_fraud_over_velocity() {
        assert_eq!(select_alert_type(0.6, 1.0), "FRAUD_SUSPECTED");
        assert_eq!(select_alert_type(0.3, 1.0), "VELOCITY_BREACH");
        assert_eq!(select_alert_type(0.3, 0.2), "ANOMALY_DETECTED");
    }
}
