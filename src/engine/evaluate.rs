// src/engine/evaluate.rs - Predicate-tree evaluation against a transaction
use std::collections::HashMap;

use risksentinel_database::models::Transaction;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::condition::{Condition, Leaf};

/// Per-rule explanation entry recorded regardless of whether the rule fired.
#[derive(Debug, Clone, Serialize)]
pub struct RuleExplanation {
    pub fired: bool,
    pub weight: f64,
    pub name: String,
}

/// Result of evaluating the active rule set against one transaction.
#[derive(Debug, Clone)]
pub struct RuleEvaluation {
    pub rule_score: f64,
    pub triggered_codes: Vec<String>,
    pub explanation: HashMap<String, RuleExplanation>,
}

/// A rule as consumed by the engine: just enough to evaluate and explain.
/// Decoupled from the database row so the engine can be exercised with
/// in-memory fixtures in tests.
pub struct ActiveRule {
    pub code: String,
    pub name: String,
    pub weight: f64,
    pub condition: Condition,
}

impl ActiveRule {
    pub fn from_row(row: &risksentinel_database::models::FraudRule) -> Self {
        Self {
            code: row.code.clone(),
            name: row.name.clone(),
            weight: row.weight,
            condition: Condition::parse(&row.condition),
        }
    }
}

/// Evaluates every active rule against `transaction` and blends the fired
/// weights into a single rule score. `triggered_codes` preserves the input
/// order of `active_rules`; `explanation` carries an entry for every rule
/// examined, fired or not.
pub fn evaluate(transaction: &Transaction, active_rules: &[ActiveRule]) -> RuleEvaluation {
    let subject = serde_json::to_value(transaction).unwrap_or(Value::Null);

    let mut sum_of_weights = 0.0;
    let mut triggered_codes = Vec::new();
    let mut explanation = HashMap::with_capacity(active_rules.len());

    for rule in active_rules {
        let fired = eval_condition(&rule.condition, &subject);
        if fired {
            sum_of_weights += rule.weight;
            triggered_codes.push(rule.code.clone());
        }
        explanation.insert(
            rule.code.clone(),
            RuleExplanation {
                fired,
                weight: rule.weight,
                name: rule.name.clone(),
            },
        );
    }

    RuleEvaluation {
        rule_score: sum_of_weights.min(1.0),
        triggered_codes,
        explanation,
    }
}

fn eval_condition(condition: &Condition, subject: &Value) -> bool {
    match condition {
        Condition::And(children) => children.iter().all(|c| eval_condition(c, subject)),
        Condition::Or(children) => children.iter().any(|c| eval_condition(c, subject)),
        Condition::Leaf(leaf) => eval_leaf(leaf, subject),
        Condition::Malformed => false,
    }
}

fn eval_leaf(leaf: &Leaf, subject: &Value) -> bool {
    let Some(value) = resolve_field(subject, &leaf.field) else {
        return false;
    };

    match leaf.operator.as_str() {
        "gt" | "gte" | "lt" | "lte" => {
            let (Some(actual), Some(threshold)) = (as_f64(value), leaf.threshold) else {
                return false;
            };
            match leaf.operator.as_str() {
                "gt" => actual > threshold,
                "gte" => actual >= threshold,
                "lt" => actual < threshold,
                "lte" => actual <= threshold,
                _ => unreachable!(),
            }
        }
        "eq" | "neq" => {
            let Some(target) = leaf.target.as_deref() else {
                return false;
            };
            let matches = as_canonical_string(value) == target;
            if leaf.operator == "eq" {
                matches
            } else {
                !matches
            }
        }
        "in" | "not_in" => {
            let Some(list) = leaf.list.as_ref() else {
                return false;
            };
            let actual = as_canonical_string(value);
            let member = list.iter().any(|item| item == &actual);
            if leaf.operator == "in" {
                member
            } else {
                !member
            }
        }
        "contains" => {
            let Some(substring) = leaf.substring.as_deref() else {
                return false;
            };
            as_canonical_string(value).to_lowercase().contains(&substring.to_lowercase())
        }
        other => {
            warn!(operator = other, field = %leaf.field, "unknown rule operator, leaf not triggered");
            false
        }
    }
}

/// Resolves a dotted path (e.g. `metadata.ip_country_flagged`) against the
/// transaction serialized as JSON. Any missing segment yields `None`, which
/// callers treat as "not triggered" rather than an error.
fn resolve_field<'a>(subject: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = subject;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

fn as_canonical_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use serde_json::json;
    use std::str::FromStr;
    use uuid::Uuid;

    fn txn(amount_zar: &str, channel: &str, metadata: Value) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            external_id: None,
            sender_id: "sender-1".into(),
            receiver_id: "receiver-1".into(),
            amount_zar: BigDecimal::from_str(amount_zar).unwrap(),
            currency: "ZAR".into(),
            channel: channel.into(),
            merchant_category: None,
            ip_address: None,
            device_fingerprint: Some(String::new()),
            geolocation: None,
            status: "pending".into(),
            metadata,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn rule(code: &str, weight: f64, condition: Value) -> ActiveRule {
        ActiveRule {
            code: code.into(),
            name: code.into(),
            weight,
            condition: Condition::parse(&condition),
        }
    }

    #[test]
    fn fires_gt_on_amount() {
        let t = txn("250000", "api", json!({}));
        let rules = vec![rule(
            "RULE_CRITICAL_AMOUNT",
            0.45,
            json!({"field": "amount_zar", "operator": "gt", "threshold": 200000}),
        )];
        let result = evaluate(&t, &rules);
        assert_eq!(result.rule_score, 0.45);
        assert_eq!(result.triggered_codes, vec!["RULE_CRITICAL_AMOUNT"]);
        assert!(result.explanation["RULE_CRITICAL_AMOUNT"].fired);
    }

    #[test]
    fn caps_sum_of_weights_at_one() {
        let t = txn("300000", "api", json!({}));
        let rules = vec![
            rule(
                "A",
                0.7,
                json!({"field": "amount_zar", "operator": "gt", "threshold": 1}),
            ),
            rule(
                "B",
                0.7,
                json!({"field": "amount_zar", "operator": "gt", "threshold": 1}),
            ),
        ];
        let result = evaluate(&t, &rules);
        assert_eq!(result.rule_score, 1.0);
    }

    #[test]
    fn missing_field_does_not_fire() {
        let t = txn("1000", "mobile_banking", json!({}));
        let rules = vec![rule(
            "RULE_FOREIGN_IP_FLAG",
            0.18,
            json!({"field": "metadata.ip_country_flagged", "operator": "eq", "target": "true"}),
        )];
        let result = evaluate(&t, &rules);
        assert_eq!(result.rule_score, 0.0);
        assert!(result.triggered_codes.is_empty());
        assert!(!result.explanation["RULE_FOREIGN_IP_FLAG"].fired);
    }

    #[test]
    fn unknown_operator_never_fires_and_does_not_panic() {
        let t = txn("5000", "mobile_banking", json!({}));
        let rules = vec![rule(
            "RULE_MAGIC",
            0.5,
            json!({"field": "amount_zar", "operator": "magic", "threshold": 0}),
        )];
        let result = evaluate(&t, &rules);
        assert_eq!(result.rule_score, 0.0);
        assert!(!result.explanation["RULE_MAGIC"].fired);
    }

    #[test]
    fn and_combinator_requires_all_children() {
        let t = txn("1000", "api", json!({}));
        let rules = vec![rule(
            "RULE_API_NO_FINGERPRINT",
            0.15,
            json!({"and": [
                {"field": "channel", "operator": "eq", "target": "api"},
                {"field": "device_fingerprint", "operator": "eq", "target": ""}
            ]}),
        )];
        let result = evaluate(&t, &rules);
        assert_eq!(result.rule_score, 0.15);
    }

    #[test]
    fn in_operator_matches_membership() {
        let t = txn("1000", "mobile_banking", json!({}));
        let mut flagged = txn("1000", "mobile_banking", json!({}));
        flagged.merchant_category = Some("online_gambling".into());
        let rules = vec![rule(
            "RULE_SUSPICIOUS_MERCHANT",
            0.20,
            json!({"field": "merchant_category", "operator": "in", "list": ["online_gambling", "adult_entertainment"]}),
        )];
        assert_eq!(evaluate(&t, &rules).rule_score, 0.0);
        assert_eq!(evaluate(&flagged, &rules).rule_score, 0.20);
    }
}
