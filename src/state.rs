// src/state.rs - Application state with dependency injection
use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use risksentinel_database::{
    AlertRepository, AuditLogRepository, DashboardRepository, RiskScoreRepository, RuleRepository,
    TransactionRepository,
};
use sqlx::PgPool;

use crate::analytics::{AnomalyThresholds, VelocityThresholds};
use crate::config::AppConfig;
use crate::events::EventProducer;
use crate::ml::MlAdapter;
use crate::scoring::ScoringOrchestrator;

/// Application state with dependency injection for all repositories and the
/// scoring pipeline's collaborators.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: AppConfig,
    pub orchestrator: Arc<ScoringOrchestrator>,
    pub events: EventProducer,
    pub transactions: Arc<TransactionRepository>,
    pub risk_scores: Arc<RiskScoreRepository>,
    pub alerts: Arc<AlertRepository>,
    pub rules: Arc<RuleRepository>,
    pub audit_logs: Arc<AuditLogRepository>,
    pub dashboard: Arc<DashboardRepository>,
    pub metrics: Arc<PrometheusHandle>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state with all initialized services
    pub async fn new(db: PgPool, config: AppConfig, metrics: PrometheusHandle) -> anyhow::Result<Self> {
        let velocity_thresholds = VelocityThresholds {
            window_seconds: config.velocity_window_seconds,
            max_count: config.velocity_max_txn_count,
            max_total_zar: config.velocity_max_total_zar,
        };
        let anomaly_thresholds = AnomalyThresholds {
            lookback_days: config.anomaly_lookback_days,
            z_threshold: config.amount_anomaly_zscore,
        };

        let ml = match (config.ml_enabled, &config.ml_model_path) {
            (true, Some(path)) => MlAdapter::new(true, path.clone()),
            _ => MlAdapter::disabled(),
        };

        let orchestrator = Arc::new(ScoringOrchestrator::new(
            db.clone(),
            velocity_thresholds,
            anomaly_thresholds,
            ml,
        ));

        let events = EventProducer::new(&config.kafka_bootstrap_servers)?;

        tracing::info!("AppState initialized with scoring orchestrator and event producer");

        Ok(Self {
            transactions: Arc::new(TransactionRepository::new(db.clone())),
            risk_scores: Arc::new(RiskScoreRepository::new(db.clone())),
            alerts: Arc::new(AlertRepository::new(db.clone())),
            rules: Arc::new(RuleRepository::new(db.clone())),
            audit_logs: Arc::new(AuditLogRepository::new(db.clone())),
            dashboard: Arc::new(DashboardRepository::new(db.clone())),
            db,
            config,
            orchestrator,
            events,
            metrics: Arc::new(metrics),
            started_at: Utc::now(),
        })
    }
}
