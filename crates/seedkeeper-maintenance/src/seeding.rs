//! Seeding-limit enforcement over one session snapshot per tick.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use seedkeeper_config::{ExpiredAction, SeedingLimits};
use seedkeeper_session::{SessionResult, TorrentInfo, TorrentSession, TorrentState};
use seedkeeper_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::timer::TimerTask;

/// Task label recorded in `maintenance_ticks_total`.
pub const TASK_NAME: &str = "seeding_limits";

/// Action applied to a torrent that crossed a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitAction {
    /// Pause the torrent.
    Pause,
    /// Remove the torrent from the session.
    Delete {
        /// Whether downloaded files are removed too.
        delete_files: bool,
    },
}

impl LimitAction {
    /// Metric and log label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Outcome of one monitor pass, by info-hash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Torrents paused during the pass.
    pub paused: Vec<String>,
    /// Torrents removed during the pass.
    pub removed: Vec<String>,
    /// Torrents whose completion time could not be evaluated.
    pub skipped: Vec<String>,
    /// Torrents whose action failed.
    pub failed: Vec<String>,
}

/// Pauses or removes torrents that exceeded the configured ratio or seeding time.
pub struct SeedingLimitMonitor {
    session: Arc<dyn TorrentSession>,
    limits: SeedingLimits,
    metrics: Metrics,
}

impl SeedingLimitMonitor {
    /// Build a monitor over `session`.
    #[must_use]
    pub fn new(session: Arc<dyn TorrentSession>, limits: SeedingLimits, metrics: Metrics) -> Self {
        Self {
            session,
            limits,
            metrics,
        }
    }

    /// Evaluate every torrent against the limits using the local wall clock.
    ///
    /// # Errors
    ///
    /// Returns the session error when the torrent listing fails; no torrent is
    /// touched in that case.
    pub async fn check(&self) -> SessionResult<MonitorReport> {
        self.check_at(Local::now().naive_local()).await
    }

    /// Evaluate every torrent against the limits as of `now`.
    ///
    /// Failures applying an action are recorded in the report and do not stop
    /// the pass.
    ///
    /// # Errors
    ///
    /// Returns the session error when the torrent listing fails.
    pub async fn check_at(&self, now: NaiveDateTime) -> SessionResult<MonitorReport> {
        self.metrics.inc_maintenance_tick(TASK_NAME);
        let torrents = self.session.get_all_torrents_info().await?;
        self.metrics.set_torrents_tracked(torrents.len());

        let mut report = MonitorReport::default();
        for torrent in &torrents {
            self.evaluate(torrent, now, &mut report).await;
        }
        Ok(report)
    }

    async fn evaluate(
        &self,
        torrent: &TorrentInfo,
        now: NaiveDateTime,
        report: &mut MonitorReport,
    ) {
        if let Some(max_ratio) = self.limits.max_ratio() {
            let ratio = torrent.upload_ratio();
            if torrent.state == TorrentState::Seeding && ratio >= max_ratio {
                debug!(info_hash = %torrent.info_hash, ratio, max_ratio, "ratio limit reached");
                self.apply(torrent, LimitAction::Pause, report).await;
            }
        }

        let Some(max_time) = self.limits.max_time() else {
            return;
        };
        let Some(completed) = torrent.completed_at() else {
            debug!(
                info_hash = %torrent.info_hash,
                completed_time = ?torrent.completed_time,
                "seeding time not evaluated: completion time unavailable"
            );
            report.skipped.push(torrent.info_hash.clone());
            return;
        };
        if !expired(now, completed, max_time) {
            return;
        }

        match self.limits.expired_action {
            ExpiredAction::Pause if torrent.state == TorrentState::Seeding => {
                self.apply(torrent, LimitAction::Pause, report).await;
            }
            ExpiredAction::Delete
                if matches!(torrent.state, TorrentState::Seeding | TorrentState::Paused) =>
            {
                let action = LimitAction::Delete {
                    delete_files: self.limits.delete_expired,
                };
                self.apply(torrent, action, report).await;
            }
            _ => {}
        }
    }

    /// Apply `action` and record the outcome.
    async fn apply(
        &self,
        torrent: &TorrentInfo,
        action: LimitAction,
        report: &mut MonitorReport,
    ) {
        let info_hash = torrent.info_hash.as_str();
        let result = match action {
            LimitAction::Pause => self.session.pause_torrent(info_hash).await,
            LimitAction::Delete { delete_files } => {
                self.session.remove_torrent(info_hash, delete_files).await
            }
        };

        match result {
            Ok(()) => {
                self.metrics.inc_seeding_action(action.label());
                info!(
                    info_hash,
                    name = %torrent.name,
                    action = action.label(),
                    "seeding limit applied"
                );
                match action {
                    LimitAction::Pause => report.paused.push(info_hash.to_owned()),
                    LimitAction::Delete { .. } => report.removed.push(info_hash.to_owned()),
                }
            }
            Err(err) => {
                warn!(
                    info_hash,
                    action = action.label(),
                    error = %err,
                    "failed to apply seeding limit"
                );
                report.failed.push(info_hash.to_owned());
            }
        }
    }
}

/// Whether at least `max_time` has passed between `completed` and `now`.
/// Completion times in the future never expire.
fn expired(now: NaiveDateTime, completed: NaiveDateTime, max_time: Duration) -> bool {
    (now - completed)
        .to_std()
        .is_ok_and(|elapsed| elapsed >= max_time)
}

#[async_trait]
impl TimerTask for SeedingLimitMonitor {
    async fn run(&self) {
        match self.check().await {
            Ok(report) => debug!(
                paused = report.paused.len(),
                removed = report.removed.len(),
                skipped = report.skipped.len(),
                failed = report.failed.len(),
                "seeding limit pass complete"
            ),
            Err(err) => warn!(error = %err, "seeding limit pass aborted: torrent listing failed"),
        }
    }
}
