// src/analytics/velocity.rs - Sliding-window transaction velocity signal
use bigdecimal::ToPrimitive;
use risksentinel_database::models::Transaction;
use serde::Serialize;

/// Default window, over which per-sender count/sum are aggregated.
pub const DEFAULT_WINDOW_SECONDS: i64 = 300;
const DEFAULT_MAX_COUNT: f64 = 10.0;
const DEFAULT_MAX_TOTAL_ZAR: f64 = 50_000.0;

#[derive(Debug, Clone, Copy)]
pub struct VelocityThresholds {
    pub window_seconds: i64,
    pub max_count: f64,
    pub max_total_zar: f64,
}

impl Default for VelocityThresholds {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECONDS,
            max_count: DEFAULT_MAX_COUNT,
            max_total_zar: DEFAULT_MAX_TOTAL_ZAR,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VelocityDetail {
    pub count: usize,
    pub count_ratio: f64,
    pub sum_zar: f64,
    pub amount_ratio: f64,
    pub window_seconds: i64,
    pub breach: bool,
}

#[derive(Debug, Clone)]
pub struct VelocityResult {
    pub score: f64,
    pub detail: VelocityDetail,
}

/// Computes the velocity score for a sender from its recent transaction
/// history within `thresholds.window_seconds`, excluding the transaction
/// currently being scored (the caller is expected to have already filtered
/// that out of `recent`).
pub fn compute_velocity(recent: &[Transaction], thresholds: VelocityThresholds) -> VelocityResult {
    let count = recent.len();
    let sum_zar: f64 = recent
        .iter()
        .filter_map(|t| t.amount_zar.to_f64())
        .sum();

    let count_ratio = (count as f64 / thresholds.max_count).min(1.0);
    let amount_ratio = (sum_zar / thresholds.max_total_zar).min(1.0);

    let score = round4(0.4 * count_ratio + 0.6 * amount_ratio);
    let breach = score >= 1.0;

    VelocityResult {
        score,
        detail: VelocityDetail {
            count,
            count_ratio,
            sum_zar,
            amount_ratio,
            window_seconds: thresholds.window_seconds,
            breach,
        },
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use std::str::FromStr;
    use uuid::Uuid;

    fn txn_with_amount(amount: &str) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            external_id: None,
            sender_id: "sender-1".into(),
            receiver_id: "receiver-1".into(),
            amount_zar: BigDecimal::from_str(amount).unwrap(),
            currency: "ZAR".into(),
            channel: "mobile_banking".into(),
            merchant_category: None,
            ip_address: None,
            device_fingerprint: None,
            geolocation: None,
            status: "pending".into(),
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_history_yields_zero_score() {
        let result = compute_velocity(&[], VelocityThresholds::default());
        assert_eq!(result.score, 0.0);
        assert!(!result.detail.breach);
    }

    #[test]
    fn ten_prior_transactions_of_6000_breach_on_the_eleventh() {
        // Sender has already submitted 10 transactions of 6000 ZAR in the
        // window; this is the history seen while scoring the 11th.
        let recent: Vec<Transaction> = (0..10).map(|_| txn_with_amount("6000")).collect();
        let result = compute_velocity(&recent, VelocityThresholds::default());
        assert_eq!(result.detail.count_ratio, 1.0);
        assert_eq!(result.detail.amount_ratio, 1.0);
        assert_eq!(result.score, 1.0);
        assert!(result.detail.breach);
    }
}
