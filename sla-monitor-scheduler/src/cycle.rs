//! Cycle Scheduler & Sessions
//!
//! Fires a monitoring cycle every `interval`, probing every registered
//! service concurrently within the cycle. Overlapping cycles are
//! suppressed outright — a tick that fires while the previous cycle is
//! still running is skipped, not queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use rand::Rng;
use sla_monitor_core::{MonitoringSession, ProbeResult, ServiceConfig};
use sla_monitor_dispatcher::Dispatcher;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct CycleScheduler {
    services: Vec<ServiceConfig>,
    pool: PgPool,
    client: Client,
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    cancel: CancellationToken,
    tick_counter: AtomicU64,
    in_flight: AtomicBool,
}

impl CycleScheduler {
    pub fn new(
        services: Vec<ServiceConfig>,
        pool: PgPool,
        dispatcher: Arc<Dispatcher>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            services,
            pool,
            client: sla_monitor_prober::build_client(),
            dispatcher,
            interval,
            cancel,
            tick_counter: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Probes every registered service concurrently, persists each result,
    /// assembles a `MonitoringSession` for logging/metrics, and fires a
    /// batch auto-detection trigger across the cycle's services. Returns
    /// regardless of whether any individual service's persistence failed —
    /// a persistence failure drops that service's row, it never aborts the
    /// cycle.
    pub async fn run_cycle(&self) -> MonitoringSession {
        let session_id = format!(
            "session-{}-{:x}",
            self.tick_counter.load(Ordering::SeqCst),
            rand::thread_rng().r#gen::<u32>()
        );
        let start_time = Utc::now();

        let tasks: Vec<_> = self
            .services
            .iter()
            .cloned()
            .map(|service| {
                let pool = self.pool.clone();
                let client = self.client.clone();
                let cancel = self.cancel.clone();
                tokio::spawn(async move { probe_and_persist(&client, &pool, &service, &cancel).await })
            })
            .collect();

        let results: Vec<ProbeResult> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .filter_map(|joined| match joined {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(error = %e, "probe task panicked, dropping its result for this cycle");
                    None
                }
            })
            .collect();

        let service_ids: Vec<String> = results.iter().map(|r| r.service_id.clone()).collect();
        self.dispatcher.analyze_batch(&service_ids).await;

        MonitoringSession::from_results(session_id, start_time, results)
    }

    /// Probes and persists a single service outside of the regular cycle,
    /// then fires the single-service auto-detection trigger. Used for
    /// ad-hoc checks that should not wait for the next scheduled tick.
    pub async fn probe_single(&self, service: &ServiceConfig) -> ProbeResult {
        let result = probe_and_persist(&self.client, &self.pool, service, &self.cancel).await;
        self.dispatcher.analyze_single(&result.service_id, None).await;
        result
    }

    /// Runs an initial cycle immediately, then fires a new cycle every
    /// `interval` until cancelled. A tick that lands while the previous
    /// cycle is still in flight is skipped outright.
    pub async fn run(self: Arc<Self>) {
        self.tick_once().await;

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await; // the interval's own first, immediate tick

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("cycle scheduler cancelled, draining");
                    return;
                }
                _ = ticker.tick() => {
                    self.tick_once().await;
                }
            }
        }
    }

    async fn tick_once(&self) {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("previous monitoring cycle still running, skipping this tick");
            return;
        }

        self.tick_counter.fetch_add(1, Ordering::SeqCst);
        let session = self.run_cycle().await;
        info!(
            session_id = %session.session_id,
            total = session.total,
            success = session.success,
            failed = session.failed,
            avg_response_time_ms = session.avg_response_time_ms,
            "monitoring cycle complete"
        );

        self.in_flight.store(false, Ordering::SeqCst);
    }
}

async fn probe_and_persist(
    client: &Client,
    pool: &PgPool,
    service: &ServiceConfig,
    cancel: &CancellationToken,
) -> ProbeResult {
    let result = sla_monitor_prober::probe(client, service, cancel).await;
    let (error_type, bucket) = sla_monitor_prober::classify(&result);

    if let Err(e) = sla_monitor_storage::record_probe_result(pool, &result, error_type, bucket).await {
        warn!(
            service_id = %service.id,
            error = %e,
            "failed to persist probe result, dropping it for this cycle and continuing"
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use super::*;

    #[test]
    fn session_id_includes_the_tick_counter() {
        let counter = AtomicUsize::new(0);
        counter.fetch_add(1, AtomicOrdering::SeqCst);
        let session_id = format!("session-{}-{:x}", counter.load(AtomicOrdering::SeqCst), 0xabu32);
        assert!(session_id.starts_with("session-1-"));
    }
}
