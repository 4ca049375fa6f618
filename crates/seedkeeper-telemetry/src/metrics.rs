//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Collector registration stays private; callers get one method per signal.
//! - Label values are the method name, action or task name; outcome labels use
//!   `ok` or the RPC error kind.

use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    rpc_requests_total: IntCounterVec,
    seeding_actions_total: IntCounterVec,
    maintenance_ticks_total: IntCounterVec,
    torrents_tracked: IntGauge,
}

/// Snapshot of selected gauges for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Torrents observed during the most recent maintenance pass.
    pub torrents_tracked: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let rpc_requests_total = counter_vec(
            "rpc_requests_total",
            "JSON-RPC requests handled by method and outcome",
            &["method", "outcome"],
        )?;
        let seeding_actions_total = counter_vec(
            "seeding_actions_total",
            "Torrents paused or removed by the seeding limit monitor",
            &["action"],
        )?;
        let maintenance_ticks_total = counter_vec(
            "maintenance_ticks_total",
            "Maintenance task executions",
            &["task"],
        )?;
        let torrents_tracked = IntGauge::with_opts(Opts::new(
            "torrents_tracked",
            "Torrents seen by the last maintenance pass",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "torrents_tracked",
            source,
        })?;

        register(&registry, "rpc_requests_total", &rpc_requests_total)?;
        register(&registry, "seeding_actions_total", &seeding_actions_total)?;
        register(&registry, "maintenance_ticks_total", &maintenance_ticks_total)?;
        register(&registry, "torrents_tracked", &torrents_tracked)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                rpc_requests_total,
                seeding_actions_total,
                maintenance_ticks_total,
                torrents_tracked,
            }),
        })
    }

    /// Increment the RPC request counter for a method and outcome.
    pub fn inc_rpc_request(&self, method: &str, outcome: &str) {
        self.inner
            .rpc_requests_total
            .with_label_values(&[method, outcome])
            .inc();
    }

    /// Increment the seeding action counter (`pause` or `delete`).
    pub fn inc_seeding_action(&self, action: &str) {
        self.inner
            .seeding_actions_total
            .with_label_values(&[action])
            .inc();
    }

    /// Increment the maintenance tick counter for a task.
    pub fn inc_maintenance_tick(&self, task: &str) {
        self.inner
            .maintenance_ticks_total
            .with_label_values(&[task])
            .inc();
    }

    /// Set the tracked torrent gauge.
    pub fn set_torrents_tracked(&self, count: usize) {
        self.inner
            .torrents_tracked
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Current value of the RPC request counter for a method and outcome.
    #[must_use]
    pub fn rpc_requests(&self, method: &str, outcome: &str) -> u64 {
        self.inner
            .rpc_requests_total
            .with_label_values(&[method, outcome])
            .get()
    }

    /// Current value of the seeding action counter.
    #[must_use]
    pub fn seeding_actions(&self, action: &str) -> u64 {
        self.inner
            .seeding_actions_total
            .with_label_values(&[action])
            .get()
    }

    /// Current value of the maintenance tick counter.
    #[must_use]
    pub fn maintenance_ticks(&self, task: &str) -> u64 {
        self.inner
            .maintenance_ticks_total
            .with_label_values(&[task])
            .get()
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the tracked gauges.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            torrents_tracked: self.inner.torrents_tracked.get(),
        }
    }
}

fn counter_vec(name: &'static str, help: &str, labels: &[&str]) -> Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}
