// src/engine/condition.rs - Rule condition tree: combinators and operator leaves
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A single predicate leaf as stored in `fraud_rules.condition`.
///
/// The parameter key is polymorphic per operator: comparison operators carry
/// `threshold`, equality carries `target`, membership carries `list`,
/// substring matching carries `substring`. This mirrors the shape the rules
/// are actually authored in (see the default seed rules).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaf {
    pub field: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substring: Option<String>,
}

/// A node in the predicate tree: either a combinator over child nodes or a
/// leaf comparison. Parsed once at evaluation time from the raw JSON stored
/// on the `FraudRule` row.
#[derive(Debug, Clone)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Leaf(Leaf),
    /// Anything the parser could not make sense of. Always evaluates to
    /// `false` — a malformed condition must never abort scoring.
    Malformed,
}

impl Condition {
    /// Builds a `Condition` tree from the raw JSON stored on a rule. Never
    /// fails: unrecognized shapes degrade to `Malformed` rather than
    /// returning an error, so a single bad rule can't take down scoring for
    /// every transaction.
    pub fn parse(value: &Value) -> Condition {
        let Some(obj) = value.as_object() else {
            warn!(?value, "rule condition is not a JSON object");
            return Condition::Malformed;
        };

        if let Some(children) = obj.get("and").and_then(Value::as_array) {
            return Condition::And(children.iter().map(Condition::parse).collect());
        }
        if let Some(children) = obj.get("or").and_then(Value::as_array) {
            return Condition::Or(children.iter().map(Condition::parse).collect());
        }

        match serde_json::from_value::<Leaf>(value.clone()) {
            Ok(leaf) => Condition::Leaf(leaf),
            Err(err) => {
                warn!(%err, ?value, "malformed rule condition leaf");
                Condition::Malformed
            }
        }
    }

    /// Validates the shape eagerly, for use at rule-creation time where a
    /// clear 422 is preferable to a silently-false condition discovered
    /// later in production scoring.
    pub fn validate_shape(value: &Value) -> Result<(), String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "condition must be a JSON object".to_string())?;

        if let Some(children) = obj.get("and") {
            let children = children
                .as_array()
                .ok_or_else(|| "'and' must be an array of conditions".to_string())?;
            return children.iter().try_for_each(Condition::validate_shape);
        }
        if let Some(children) = obj.get("or") {
            let children = children
                .as_array()
                .ok_or_else(|| "'or' must be an array of conditions".to_string())?;
            return children.iter().try_for_each(Condition::validate_shape);
        }

        let field = obj
            .get("field")
            .and_then(Value::as_str)
            .ok_or_else(|| "leaf condition missing 'field'".to_string())?;
        let operator = obj
            .get("operator")
            .and_then(Value::as_str)
            .ok_or_else(|| "leaf condition missing 'operator'".to_string())?;

        let has_param = match operator {
            "gt" | "gte" | "lt" | "lte" => obj.get("threshold").and_then(Value::as_f64).is_some(),
            "eq" | "neq" => obj.get("target").and_then(Value::as_str).is_some(),
            "in" | "not_in" => obj.get("list").and_then(Value::as_array).is_some(),
            "contains" => obj.get("substring").and_then(Value::as_str).is_some(),
            other => return Err(format!("unknown operator '{other}'")),
        };

        if !has_param {
            return Err(format!(
                "leaf for field '{field}' with operator '{operator}' is missing its parameter"
            ));
        }

        Ok(())
    }
}
