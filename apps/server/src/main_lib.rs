use std::sync::Arc;

use cardprice_core::{
    audit::AuditLogRepositoryTrait,
    catalog::CatalogRepositoryTrait,
    ingestion::PriceEventIngestor,
    pricing::PriceValidator,
    review::ReviewQueueManager,
    scheduler::SchedulerOrchestrator,
    sources::{ConfiguredSources, SourceProvider},
    EngineConfig,
};
use cardprice_storage_sqlite::{
    db, AuditLogRepository, CatalogRepository, PriceEventRepository, PricingRepository,
    ReviewRepository, RunLeaseRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub catalog: Arc<dyn CatalogRepositoryTrait>,
    pub ingestor: Arc<PriceEventIngestor>,
    pub scheduler: Arc<SchedulerOrchestrator>,
    pub review_queue: Arc<ReviewQueueManager>,
    pub audit_log: Arc<dyn AuditLogRepositoryTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("CP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let engine_config = match &config.engine_config_path {
        Some(path) => {
            tracing::info!("Loading engine config from {}", path);
            EngineConfig::from_json_file(path)?
        }
        None => EngineConfig::default(),
    };

    let (pool, writer) = db::open(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let catalog = Arc::new(CatalogRepository::new(pool.clone(), writer.clone()));
    let events = Arc::new(PriceEventRepository::new(pool.clone(), writer.clone()));
    let pricing = Arc::new(PricingRepository::new(pool.clone(), writer.clone()));
    let review = Arc::new(ReviewRepository::new(pool.clone(), writer.clone()));
    let audit_log = Arc::new(AuditLogRepository::new(pool.clone(), writer.clone()));
    let leases = Arc::new(RunLeaseRepository::new(pool, writer));

    let sources: Arc<dyn SourceProvider> =
        Arc::new(ConfiguredSources::new(config.credentials.clone()));
    let review_queue = Arc::new(ReviewQueueManager::new(review));
    let validator = Arc::new(PriceValidator::new(
        engine_config.price_bounds.clone(),
        pricing,
    ));

    let ingestor = Arc::new(PriceEventIngestor::new(
        catalog.clone(),
        events,
        review_queue.clone(),
        validator,
        sources.clone(),
        &engine_config,
    )?);

    let scheduler = Arc::new(SchedulerOrchestrator::new(
        catalog.clone(),
        ingestor.clone(),
        sources,
        audit_log.clone(),
        leases,
        engine_config.scheduler.clone(),
    ));

    Ok(Arc::new(AppState {
        catalog,
        ingestor,
        scheduler,
        review_queue,
        audit_log,
    }))
}
