// src/analytics/anomaly.rs - Population z-score anomaly signal
use bigdecimal::{BigDecimal, ToPrimitive};
use serde::Serialize;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;
const DEFAULT_Z_THRESHOLD: f64 = 3.0;
const MIN_SAMPLE_SIZE: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct AnomalyThresholds {
    pub lookback_days: i64,
    pub z_threshold: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnomalyDetail {
    pub n: usize,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub z_score: Option<f64>,
    pub z_threshold: f64,
    pub is_anomaly: bool,
    pub insufficient_history: bool,
}

#[derive(Debug, Clone)]
pub struct AnomalyResult {
    pub score: f64,
    pub detail: AnomalyDetail,
}

/// Computes the anomaly score for `current_amount_zar` against the
/// population of `historical_amounts_zar` (prior transactions for the same
/// sender over the lookback window, current transaction excluded).
pub fn compute_anomaly(
    current_amount_zar: &BigDecimal,
    historical_amounts_zar: &[BigDecimal],
    thresholds: AnomalyThresholds,
) -> AnomalyResult {
    let n = historical_amounts_zar.len();
    let current = current_amount_zar.to_f64().unwrap_or(0.0);

    let samples: Vec<f64> = historical_amounts_zar
        .iter()
        .filter_map(ToPrimitive::to_f64)
        .collect();

    if n < MIN_SAMPLE_SIZE {
        return insufficient(n, thresholds.z_threshold);
    }

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    let stddev = variance.sqrt();

    if stddev == 0.0 {
        return insufficient(n, thresholds.z_threshold);
    }

    let z = (current - mean).abs() / stddev;
    let score = (z / thresholds.z_threshold).min(1.0);

    AnomalyResult {
        score,
        detail: AnomalyDetail {
            n,
            mean: Some(mean),
            stddev: Some(stddev),
            z_score: Some(z),
            z_threshold: thresholds.z_threshold,
            is_anomaly: z >= thresholds.z_threshold,
            insufficient_history: false,
        },
    }
}

fn insufficient(n: usize, z_threshold: f64) -> AnomalyResult {
    AnomalyResult {
        score: 0.0,
        detail: AnomalyDetail {
            n,
            mean: None,
            stddev: None,
            z_score: None,
            z_threshold,
            is_anomaly: false,
            insufficient_history: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amounts(values: &[&str]) -> Vec<BigDecimal> {
        values.iter().map(|v| BigDecimal::from_str(v).unwrap()).collect()
    }

    #[test]
    fn fewer_than_three_samples_is_insufficient_history() {
        let result = compute_anomaly(
            &BigDecimal::from_str("1000").unwrap(),
            &amounts(&["900", "1100"]),
            AnomalyThresholds::default(),
        );
        assert_eq!(result.score, 0.0);
        assert!(result.detail.insufficient_history);
    }

    #[test]
    fn zero_stddev_is_insufficient_history() {
        let result = compute_anomaly(
            &BigDecimal::from_str("1000").unwrap(),
            &amounts(&["1000", "1000", "1000"]),
            AnomalyThresholds::default(),
        );
        assert_eq!(result.score, 0.0);
        assert!(result.detail.insufficient_history);
    }

    #[test]
    fn large_deviation_saturates_score_at_one() {
        let spread = amounts(&[
            "800", "900", "1000", "1100", "1200", "1000", "900", "1100", "1000", "1000",
        ]);
        let current = BigDecimal::from_str("2000").unwrap();
        let result = compute_anomaly(&current, &spread, AnomalyThresholds::default());
        assert!(result.detail.z_score.unwrap() > 0.0);
        assert!(result.score <= 1.0);
    }

    #[test]
    fn known_population_matches_expected_z() {
        // mean=1000, population stddev=200 (50 samples all equal to values
        // whose deviations square to a mean-square of 40000).
        let mut samples = Vec::new();
        for _ in 0..25 {
            samples.push(BigDecimal::from_str("800").unwrap());
            samples.push(BigDecimal::from_str("1200").unwrap());
        }
        let current = BigDecimal::from_str("2000").unwrap();
        let result = compute_anomaly(&current, &samples, AnomalyThresholds::default());
        let detail = result.detail;
        assert_eq!(detail.n, 50);
        assert!((detail.mean.unwrap() - 1000.0).abs() < 1e-9);
        assert!((detail.stddev.unwrap() - 200.0).abs() < 1e-9);
        assert!((detail.z_score.unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(result.score, 1.0);
        assert!(detail.is_anomaly);
    }
}
