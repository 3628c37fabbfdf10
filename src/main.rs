// src/main.rs - RiskSentinel fraud-detection API gateway
use axum::{routing::get, Json, Router};
use std::net::SocketAddr;
use tower_http::{compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

mod analytics;
mod config;
mod constants;
mod engine;
mod events;
mod extractors;
mod handlers;
mod middleware;
mod ml;
mod models;
mod routes;
mod scoring;
mod state;
mod utils;

use config::AppConfig;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RiskSentinel API",
        version = "0.1.0",
        description = "Transaction fraud and risk-detection engine: rule-based, velocity, anomaly, and ML-blended scoring",
        contact(name = "RiskSentinel Team", email = "dev@risksentinel.io"),
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::transactions::create_transaction,
        handlers::transactions::list_transactions,
        handlers::transactions::get_transaction,
        handlers::alerts::list_alerts,
        handlers::alerts::update_alert,
        handlers::rules::create_rule,
        handlers::rules::list_rules,
        handlers::rules::get_rule,
        handlers::rules::update_rule,
        handlers::rules::delete_rule,
        handlers::dashboard::summary,
        handlers::dashboard::risk_trend,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            handlers::health::ReadinessResponse,
            handlers::health::ServiceStatus,
            models::transaction::Channel,
            models::transaction::GeoLocation,
            models::transaction::TransactionCreate,
            models::transaction::TransactionResponse,
            models::transaction::TransactionDetailResponse,
            models::transaction::RiskScoreResponse,
            models::transaction::AuditLogResponse,
            models::alert::AlertResponse,
            models::alert::AlertUpdateRequest,
            models::rule::RuleCreateRequest,
            models::rule::RuleUpdateRequest,
            models::rule::RuleResponse,
            models::dashboard::DashboardSummaryResponse,
            models::dashboard::RiskiestTransaction,
            models::dashboard::SeverityCount,
            models::dashboard::RiskTrendResponse,
            models::dashboard::RiskTrendPoint,
            models::common::PaginatedTransactionResponse,
            models::common::PaginatedAlertResponse,
            models::common::PaginatedRuleResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health and status monitoring endpoints"),
        (name = "Transactions", description = "Transaction ingestion and scoring"),
        (name = "Alerts", description = "Fraud alert review queue"),
        (name = "Rules", description = "Fraud rule definitions"),
        (name = "Dashboard", description = "Aggregate fraud-operations views"),
    ),
    servers(
        (url = "http://localhost:4000", description = "Development server"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = AppConfig::from_env()?;

    let pool_config = risksentinel_database::PoolConfig {
        max_connections: config.database_max_connections,
        min_connections: config.database_min_connections,
        ..Default::default()
    };
    let db_pool = risksentinel_database::create_pool(&config.database_url, pool_config).await?;
    risksentinel_database::run_migrations(&db_pool).await?;
    risksentinel_database::seed_default_rules(&db_pool).await?;

    let metrics = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder().handle();

    let app_state = AppState::new(db_pool, config.clone(), metrics).await?;

    let app = create_application(app_state).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("RiskSentinel API starting on {}", addr);
    tracing::info!("Health check available at http://{}/health", addr);
    if config.enable_swagger_ui {
        tracing::info!("API documentation at http://{}/docs", addr);
    }

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn create_application(state: AppState) -> anyhow::Result<Router> {
    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::health::metrics))
        .nest("/api/v1", create_v1_routes())
        .merge(create_docs_routes(&state.config))
        .layer(middleware::cors::create_cors_layer(&state.config))
        .layer(RequestBodyLimitLayer::new(constants::REQUEST_BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::error_handler::handle_error))
        .with_state(state);

    Ok(app)
}

fn create_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/transactions", routes::transactions::create_routes())
        .nest("/alerts", routes::alerts::create_routes())
        .nest("/rules", routes::rules::create_routes())
        .nest("/dashboard", routes::dashboard::create_routes())
}

fn create_docs_routes(config: &AppConfig) -> Router<AppState> {
    if config.enable_swagger_ui {
        Router::new()
            .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
            .route("/docs", get(swagger_ui_handler))
            .route("/docs/", get(swagger_ui_handler))
            .route("/docs/swagger-ui-bundle.js", get(swagger_ui_bundle_js))
            .route("/docs/swagger-ui-standalone-preset.js", get(swagger_ui_standalone_preset_js))
            .route("/docs/swagger-ui.css", get(swagger_ui_css))
    } else {
        Router::new()
    }
}

async fn swagger_ui_handler() -> axum::response::Html<&'static str> {
    axum::response::Html(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>RiskSentinel API Documentation</title>
    <link rel="stylesheet" type="text/css" href="/docs/swagger-ui.css" />
    <style>
        html { box-sizing: border-box; overflow: -moz-scrollbars-vertical; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin:0; background: #fafafa; }
        .swagger-ui .topbar { display: none; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="/docs/swagger-ui-bundle.js" charset="UTF-8"></script>
    <script src="/docs/swagger-ui-standalone-preset.js" charset="UTF-8"></script>
    <script>
        window.onload = function() {
            const ui = SwaggerUIBundle({
                url: '/api-docs/openapi.json',
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [SwaggerUIBundle.presets.apis, SwaggerUIStandalonePreset],
                plugins: [SwaggerUIBundle.plugins.DownloadUrl],
                layout: "StandaloneLayout",
                validatorUrl: null,
                tryItOutEnabled: true,
                supportedSubmitMethods: ['get', 'post', 'put', 'delete', 'patch'],
            });
        };
    </script>
</body>
</html>
    "#,
    )
}

async fn swagger_ui_bundle_js() -> impl axum::response::IntoResponse {
    axum::response::Redirect::temporary("https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js")
}

async fn swagger_ui_standalone_preset_js() -> impl axum::response::IntoResponse {
    axum::response::Redirect::temporary("https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-standalone-preset.js")
}

async fn swagger_ui_css() -> impl axum::response::IntoResponse {
    axum::response::Redirect::temporary("https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("ctrl+c received, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("sigterm received, shutting down gracefully");
        },
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| constants::DEFAULT_TRACING_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    Ok(())
}
