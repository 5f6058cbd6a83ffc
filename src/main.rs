//! CyberGAP API server.
//!
//! Startup order: configuration, tracing, database pool, migrations, event
//! wiring, HTTP router.

use std::sync::Arc;

use thiserror::Error;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cybergap::adapters::http::{api_router, DivergenceAppState, SurveyAppState};
use cybergap::adapters::{
    InMemoryEventBus, PostgresCampaignResponseReader, PostgresDivergenceAlertRepository,
    PostgresSurveyAnswerRepository,
};
use cybergap::application::{DivergenceTriggerHandler, RecalculateDivergencesHandler};
use cybergap::config::{AppConfig, ConfigError, ServerConfig};
use cybergap::domain::survey::RESPONDENT_COMPLETED_EVENT;
use cybergap::ports::EventSubscriber;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to initialize tracing: {0}")]
    Tracing(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;

    init_tracing(&config.server)?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    let reader = Arc::new(PostgresCampaignResponseReader::new(pool.clone()));
    let alerts = Arc::new(PostgresDivergenceAlertRepository::new(pool.clone()));
    let answers = Arc::new(PostgresSurveyAnswerRepository::new(pool));
    let bus = Arc::new(InMemoryEventBus::new());

    let recalculate = Arc::new(RecalculateDivergencesHandler::new(
        reader.clone(),
        alerts.clone(),
        bus.clone(),
    ));
    bus.subscribe(
        RESPONDENT_COMPLETED_EVENT,
        Arc::new(DivergenceTriggerHandler::new(recalculate)),
    );

    let app = api_router(
        DivergenceAppState::new(reader, alerts, bus.clone()),
        SurveyAppState::new(answers, bus),
    )
    .layer(TraceLayer::new_for_http())
    .layer(TimeoutLayer::new(config.server.request_timeout()));

    let addr = config.server.socket_addr().map_err(ConfigError::from)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "CyberGAP listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(server: &ServerConfig) -> Result<(), StartupError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .map_err(|e| StartupError::Tracing(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if server.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| StartupError::Tracing(e.to_string()))
}
