pub mod alerts;
pub mod audit;
pub mod dashboard;
pub mod models;
pub mod pool;
pub mod risk_scores;
pub mod rules;
pub mod seed;
pub mod transactions;

pub use alerts::AlertRepository;
pub use audit::AuditLogRepository;
pub use dashboard::DashboardRepository;
pub use pool::{create_pool, PoolConfig};
pub use risk_scores::RiskScoreRepository;
pub use rules::RuleRepository;
pub use seed::seed_default_rules;
pub use transactions::TransactionRepository;

use sqlx::PgPool;

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
