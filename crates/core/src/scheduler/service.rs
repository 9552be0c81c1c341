//! Scheduled refresh runs.
//!
//! A run selects a batch of catalog items for its mode and walks each item
//! through the source fallback chain for its game. The first source whose
//! candidate reaches the validator ends the item, whether the price was
//! accepted or rejected. Sources that skip or fail hand over to the next one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cardprice_market_data::errors::FailureKind;
use cardprice_market_data::{FetchDiagnostics, SkipReason, SourceChain};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use uuid::Uuid;

use super::lease::{RunLeaseStore, SCHEDULER_LEASE};
use super::model::{
    AttemptResult, ItemRunResult, ItemState, SchedulerRequest, SchedulerRunSummary,
};
use super::selection::{batch_size, refresh_filter};
use crate::audit::{AuditLogEntry, AuditLogRepositoryTrait};
use crate::catalog::{CatalogRepositoryTrait, MarketItem};
use crate::config::SchedulerConfig;
use crate::errors::{Error, Result};
use crate::ingestion::{ItemOutcome, PriceEventIngestor};
use crate::sources::SourceProvider;

pub struct SchedulerOrchestrator {
    catalog: Arc<dyn CatalogRepositoryTrait>,
    ingestor: Arc<PriceEventIngestor>,
    sources: Arc<dyn SourceProvider>,
    audit: Arc<dyn AuditLogRepositoryTrait>,
    leases: Arc<dyn RunLeaseStore>,
    config: SchedulerConfig,
}

impl SchedulerOrchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogRepositoryTrait>,
        ingestor: Arc<PriceEventIngestor>,
        sources: Arc<dyn SourceProvider>,
        audit: Arc<dyn AuditLogRepositoryTrait>,
        leases: Arc<dyn RunLeaseStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            catalog,
            ingestor,
            sources,
            audit,
            leases,
            config,
        }
    }

    /// Execute one scheduler run.
    ///
    /// Fails without touching any item when a source in the fallback order
    /// is not configured, or when another run holds the lease. Every run
    /// that gets past those checks writes exactly one audit entry and
    /// releases the lease, even if the caller stops waiting: the run itself
    /// executes on its own task.
    pub async fn run(self: &Arc<Self>, request: SchedulerRequest) -> Result<SchedulerRunSummary> {
        let delay = request
            .delay_ms
            .or(self.config.delay_ms)
            .map(Duration::from_millis);
        let chain = self.sources.chain(&self.config.fallback_order, delay)?;

        let run_id = Uuid::now_v7().to_string();
        let ttl = chrono::Duration::seconds(self.config.lease_ttl_secs as i64);
        if !self.leases.try_acquire(SCHEDULER_LEASE, &run_id, ttl).await? {
            let holder = self
                .leases
                .current(SCHEDULER_LEASE)?
                .map(|lease| lease.holder)
                .unwrap_or_else(|| "unknown".to_string());
            warn!("Scheduler run refused: lease held by {}", holder);
            return Err(Error::RunInProgress(holder));
        }

        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.execute(run_id, chain, request).await });
        task.await
            .map_err(|e| Error::Unexpected(format!("scheduler run task failed: {}", e)))?
    }

    /// Body of a run holding the lease.
    async fn execute(
        &self,
        run_id: String,
        chain: SourceChain,
        request: SchedulerRequest,
    ) -> Result<SchedulerRunSummary> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut summary = SchedulerRunSummary::new(run_id.clone(), request.mode, started_at);
        info!("Scheduler run {} started ({})", run_id, request.mode);

        let outcome = self
            .refresh(&chain, &request, &mut summary, clock)
            .await;
        if let Err(e) = &outcome {
            error!("Scheduler run {} failed: {}", run_id, e);
            summary.errors.push(e.to_string());
        }
        summary.duration_ms = clock.elapsed().as_millis() as i64;

        self.write_audit(&summary).await;

        if let Err(e) = self.leases.release(SCHEDULER_LEASE, &run_id).await {
            warn!("Failed to release scheduler lease for {}: {}", run_id, e);
        }

        info!(
            "Scheduler run {} done in {}ms: {} selected, {} updated, {} rejected, {} skipped, {} failed",
            summary.run_id,
            summary.duration_ms,
            summary.selected,
            summary.updated,
            summary.rejected,
            summary.skipped,
            summary.failed
        );
        outcome.map(|_| summary)
    }

    async fn refresh(
        &self,
        chain: &SourceChain,
        request: &SchedulerRequest,
        summary: &mut SchedulerRunSummary,
        clock: Instant,
    ) -> Result<()> {
        let filter = refresh_filter(request.mode, &self.config, Utc::now());
        let limit = batch_size(request.mode, request.batch_size, &self.config);
        let items = self.catalog.select_for_refresh(&filter, limit)?;
        summary.selected = items.len();
        debug!("Selected {} items with {:?} (limit {})", items.len(), filter, limit);

        let deadline = self.config.run_deadline_secs.map(Duration::from_secs);
        let results: Vec<ItemRunResult> = stream::iter(items)
            .map(|item| async move {
                if deadline.is_some_and(|d| clock.elapsed() >= d) {
                    return ItemRunResult {
                        item_id: item.id.clone(),
                        attempts: Vec::new(),
                        state: ItemState::Skipped {
                            reason: SkipReason::DeadlineExceeded.as_str().to_string(),
                        },
                        errors: Vec::new(),
                    };
                }
                self.refresh_item(chain, &item).await
            })
            .buffer_unordered(self.config.max_concurrent_items.max(1))
            .collect()
            .await;

        for result in results {
            summary.add_item(result);
        }
        Ok(())
    }

    /// Walk one item through the fallback chain for its game.
    async fn refresh_item(&self, chain: &SourceChain, item: &MarketItem) -> ItemRunResult {
        let gates = chain.for_game(item.game());
        let mut result = ItemRunResult {
            item_id: item.id.clone(),
            attempts: Vec::new(),
            state: ItemState::Skipped {
                reason: SkipReason::UnsupportedGame.as_str().to_string(),
            },
            errors: Vec::new(),
        };
        if gates.is_empty() {
            debug!("No source serves {} ({})", item.id, item.game());
            return result;
        }

        let mut diagnostics = FetchDiagnostics::new();
        let mut persist_failed = false;

        for gate in gates {
            let source = gate.id();
            let ingestion = self
                .ingestor
                .process_item(item, &gate, chain.delay())
                .await;
            result.errors.extend(ingestion.errors.iter().cloned());

            match ingestion.outcome {
                ItemOutcome::Updated { .. } => {
                    diagnostics.record_success(source);
                    result.attempts.push((source, AttemptResult::Updated));
                    result.state = ItemState::Updated { source };
                    break;
                }
                ItemOutcome::Rejected { reason } => {
                    diagnostics.record_success(source);
                    result.attempts.push((source, AttemptResult::Rejected));
                    result.state = ItemState::Rejected { source, reason };
                    break;
                }
                ItemOutcome::NoUsablePrice => {
                    diagnostics.record_skip(source, SkipReason::NoUsablePrice);
                    result.attempts.push((source, AttemptResult::Skipped));
                }
                ItemOutcome::FetchFailed { kind, message } => {
                    if kind == FailureKind::NotApplicable {
                        let reason = if message.contains("identifiers") {
                            SkipReason::InsufficientIdentifiers
                        } else {
                            SkipReason::UnsupportedGame
                        };
                        diagnostics.record_skip(source, reason);
                        result.attempts.push((source, AttemptResult::Skipped));
                    } else {
                        result.errors.push(format!("{}: {}", item.id, message));
                        diagnostics.record_error(source, message);
                        result.attempts.push((source, AttemptResult::Failed));
                    }
                }
                ItemOutcome::PersistFailed => {
                    persist_failed = true;
                    diagnostics.record_error(source, "persistence failed".to_string());
                    result.attempts.push((source, AttemptResult::Failed));
                }
            }
        }

        if !diagnostics.has_success() {
            let summary = diagnostics.summary();
            result.state = if diagnostics.all_errored() || persist_failed {
                ItemState::Failed { reason: summary }
            } else {
                ItemState::Skipped { reason: summary }
            };
        }
        debug!("{}: {}", item.id, diagnostics.summary());
        result
    }

    /// Persist the run's audit entry. Failures are logged, never raised.
    async fn write_audit(&self, summary: &SchedulerRunSummary) {
        let per_source = match serde_json::to_value(&summary.per_source) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to encode per-source counters: {}", e);
                serde_json::Value::Null
            }
        };
        let entry = AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            run_id: summary.run_id.clone(),
            mode: summary.mode.to_string(),
            started_at: summary.started_at,
            finished_at: Utc::now(),
            duration_ms: summary.duration_ms,
            items_selected: summary.selected as i64,
            updated: summary.updated as i64,
            rejected: summary.rejected as i64,
            skipped: summary.skipped as i64,
            failed: summary.failed as i64,
            per_source,
            error_count: summary.error_count() as i64,
        };
        if let Err(e) = self.audit.insert_entry(entry).await {
            error!("Failed to write audit entry for run {}: {}", summary.run_id, e);
        }
    }
}
