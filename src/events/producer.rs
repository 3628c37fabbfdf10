// src/events/producer.rs - Process-wide event bus producer (best-effort fan-out)
use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use serde::Serialize;
use tracing::{error, warn};

use super::topics;

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishes raw/scored/alert events to the message bus. Fan-out is
/// best-effort: publish failures are logged and counted but never roll back
/// the committed scoring result, and `publish_*` calls do not block the
/// caller on broker acknowledgement.
#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(bootstrap_servers: &str) -> anyhow::Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    pub fn publish_raw(&self, transaction_id: &str, payload: &impl Serialize) {
        self.publish(topics::TRANSACTIONS_RAW, transaction_id, payload);
    }

    pub fn publish_scored(&self, transaction_id: &str, payload: &impl Serialize) {
        self.publish(topics::TRANSACTIONS_SCORED, transaction_id, payload);
    }

    pub fn publish_alert(&self, transaction_id: &str, payload: &impl Serialize) {
        self.publish(topics::ALERTS, transaction_id, payload);
    }

    /// Best-effort broker liveness probe for the health/readiness checks.
    /// Blocking — callers run it inside `spawn_blocking`.
    pub fn is_healthy(&self, timeout: Duration) -> bool {
        self.producer.client().fetch_metadata(None, timeout).is_ok()
    }

    /// Fires the send and returns immediately; the broker round-trip runs on
    /// a spawned task so the caller's request path is never blocked on it.
    fn publish(&self, topic: &'static str, key: &str, payload: &impl Serialize) {
        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(err) => {
                warn!(%err, topic, "failed to serialize event payload, dropping publish");
                metrics::counter!("event_publish_errors_total", "topic" => topic).increment(1);
                return;
            }
        };

        let producer = self.producer.clone();
        let key = key.to_string();

        tokio::spawn(async move {
            let record = FutureRecord::to(topic).key(&key).payload(&body);
            match producer.send(record, SEND_TIMEOUT).await {
                Ok(_) => {
                    metrics::counter!("event_publish_total", "topic" => topic).increment(1);
                }
                Err((err, _)) => {
                    error!(%err, topic, "event publish failed");
                    metrics::counter!("event_publish_errors_total", "topic" => topic).increment(1);
                }
            }
        });
    }
}
