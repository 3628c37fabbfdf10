//! Default fraud-rule seeding. Mirrors the original's first-run seed
//! (`original_source/app/rules/default_rules.py`): applied once, only if
//! `fraud_rules` is empty.
use serde_json::json;
use sqlx::PgPool;

use crate::rules::RuleRepository;

struct SeedRule {
    code: &'static str,
    name: &'static str,
    description: &'static str,
    weight: f64,
    condition: serde_json::Value,
}

fn default_rules() -> Vec<SeedRule> {
    vec![
        SeedRule {
            code: "RULE_HIGH_AMOUNT",
            name: "High transaction amount",
            description: "Flags transactions above the high-amount threshold",
            weight: 0.25,
            condition: json!({"field": "amount_zar", "operator": "gt", "threshold": 50000}),
        },
        SeedRule {
            code: "RULE_CRITICAL_AMOUNT",
            name: "Critical transaction amount",
            description: "Flags transactions above the critical-amount threshold",
            weight: 0.45,
            condition: json!({"field": "amount_zar", "operator": "gt", "threshold": 200000}),
        },
        SeedRule {
            code: "RULE_SUSPICIOUS_MERCHANT",
            name: "Suspicious merchant category",
            description: "Flags transactions against known high-risk merchant categories",
            weight: 0.20,
            condition: json!({
                "field": "merchant_category",
                "operator": "in",
                "list": ["online_gambling", "adult_entertainment", "crypto_exchange"]
            }),
        },
        SeedRule {
            code: "RULE_API_NO_FINGERPRINT",
            name: "API channel without device fingerprint",
            description: "Flags API-channel transactions missing a device fingerprint",
            weight: 0.15,
            condition: json!({"and": [
                {"field": "channel", "operator": "eq", "target": "api"},
                {"field": "device_fingerprint", "operator": "eq", "target": ""}
            ]}),
        },
        SeedRule {
            code: "RULE_FOREIGN_IP_FLAG",
            name: "Foreign IP flagged",
            description: "Flags transactions where upstream IP geolocation flagged the sender country",
            weight: 0.18,
            condition: json!({"field": "metadata.ip_country_flagged", "operator": "eq", "target": "true"}),
        },
        SeedRule {
            code: "RULE_REPEAT_RECEIVER",
            name: "Repeat receiver",
            description: "Flags transactions to a receiver already marked as repeated in metadata",
            weight: 0.15,
            condition: json!({"field": "metadata.repeat_receiver", "operator": "eq", "target": "true"}),
        },
        SeedRule {
            code: "RULE_ZERO_AMOUNT",
            name: "Zero or negative amount",
            description: "Flags non-positive transaction amounts",
            weight: 0.30,
            condition: json!({"field": "amount_zar", "operator": "lte", "threshold": 0}),
        },
    ]
}

/// Seeds the default rule set if `fraud_rules` is currently empty. Safe to
/// call on every startup — a no-op once any rule exists.
pub async fn seed_default_rules(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fraud_rules")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        return Ok(());
    }

    let rules = RuleRepository::new(pool.clone());
    for rule in default_rules() {
        rules
            .create(rule.code, rule.name, Some(rule.description), rule.weight, rule.condition)
            .await?;
    }

    tracing::info!("seeded default fraud rule set");
    Ok(())
}
