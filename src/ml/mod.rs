// src/ml/mod.rs - ML adapter: load-once, fail-soft inference
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use risksentinel_database::models::Transaction;
use tracing::{debug, warn};

/// `[amount_zar, channel_ordinal, hour_of_day_utc, international_flag]` —
/// must match the vector the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub amount_zar: f64,
    pub channel_ordinal: f64,
    pub hour_of_day_utc: f64,
    pub international_flag: f64,
}

impl FeatureVector {
    pub fn from_transaction(transaction: &Transaction) -> Self {
        use bigdecimal::ToPrimitive;

        let channel_ordinal = match transaction.channel.as_str() {
            "mobile_banking" => 0.0,
            "internet_banking" => 1.0,
            "atm" => 2.0,
            "api" => 3.0,
            "pos" => 4.0,
            _ => 5.0,
        };

        let international_flag = transaction
            .metadata
            .get("is_international")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false) as u8 as f64;

        Self {
            amount_zar: transaction.amount_zar.to_f64().unwrap_or(0.0),
            channel_ordinal,
            hour_of_day_utc: transaction.created_at.format("%H").to_string().parse().unwrap_or(0.0),
            international_flag,
        }
    }
}

/// A loaded model capable of scoring a feature vector. Implementations are
/// expected to clamp their raw output into `[0, 1]`, with "more anomalous"
/// mapping to "higher score".
pub trait MlPredictor: Send + Sync {
    fn predict(&self, features: FeatureVector) -> anyhow::Result<f64>;
}

/// Loads a predictor backed by a model artifact on disk. The artifact format
/// itself is a deployment concern; what matters here is the load-once,
/// fail-soft contract around it. A missing or unreadable file disables the
/// adapter rather than failing construction.
struct ArtifactPredictor {
    weights: Vec<f64>,
    bias: f64,
}

impl ArtifactPredictor {
    /// A minimal linear-model artifact: one float per line, last line is the
    /// bias, prior lines are feature weights in `FeatureVector` field order.
    fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut values: Vec<f64> = contents
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.trim().parse::<f64>())
            .collect::<Result<_, _>>()?;
        let bias = values.pop().unwrap_or(0.0);
        Ok(Self { weights: values, bias })
    }
}

impl MlPredictor for ArtifactPredictor {
    fn predict(&self, features: FeatureVector) -> anyhow::Result<f64> {
        let inputs = [
            features.amount_zar,
            features.channel_ordinal,
            features.hour_of_day_utc,
            features.international_flag,
        ];
        let raw: f64 = self
            .weights
            .iter()
            .zip(inputs.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;
        // sigmoid squash into [0, 1]
        Ok(1.0 / (1.0 + (-raw).exp()))
    }
}

/// Process-wide ML adapter. Loaded once on first use and cached for the
/// lifetime of the process; never reloaded or mutated afterward.
pub struct MlAdapter {
    enabled: bool,
    model_path: PathBuf,
    predictor: OnceLock<Option<Box<dyn MlPredictor>>>,
}

impl MlAdapter {
    pub fn new(enabled: bool, model_path: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            model_path: model_path.into(),
            predictor: OnceLock::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, PathBuf::new())
    }

    /// Returns a score in `[0, 1]`, or `None` if disabled, the artifact is
    /// missing, or inference raised. Never returns an error — ML failure
    /// degrades silently per the scoring contract.
    pub fn predict(&self, transaction: &Transaction) -> Option<f64> {
        if !self.enabled {
            return None;
        }

        let predictor = self.predictor.get_or_init(|| self.load());
        let predictor = predictor.as_ref()?;

        let features = FeatureVector::from_transaction(transaction);
        match predictor.predict(features) {
            Ok(score) => Some(score.clamp(0.0, 1.0)),
            Err(err) => {
                warn!(%err, transaction_id = %transaction.id, "ml inference failed, degrading to absent");
                None
            }
        }
    }

    fn load(&self) -> Option<Box<dyn MlPredictor>> {
        match ArtifactPredictor::load(&self.model_path) {
            Ok(predictor) => {
                debug!(path = %self.model_path.display(), "ml model artifact loaded");
                Some(Box::new(predictor))
            }
            Err(err) => {
                warn!(%err, path = %self.model_path.display(), "ml model artifact unavailable, adapter disabled for process lifetime");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_adapter_never_predicts() {
        let adapter = MlAdapter::disabled();
        let transaction = sample_transaction();
        assert!(adapter.predict(&transaction).is_none());
    }

    #[test]
    fn missing_artifact_degrades_to_absent() {
        let adapter = MlAdapter::new(true, "/nonexistent/path/model.txt");
        let transaction = sample_transaction();
        assert!(adapter.predict(&transaction).is_none());
    }

    fn sample_transaction() -> Transaction {
        use bigdecimal::BigDecimal;
        use chrono::Utc;
        use std::str::FromStr;
        use uuid::Uuid;

        Transaction {
            id: Uuid::new_v4(),
            external_id: None,
            sender_id: "sender-1".into(),
            receiver_id: "receiver-1".into(),
            amount_zar: BigDecimal::from_str("1000").unwrap(),
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
}
