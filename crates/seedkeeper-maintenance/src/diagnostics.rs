//! Debug-level dump of every torrent snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use seedkeeper_session::{SessionResult, TorrentSession};
use seedkeeper_telemetry::Metrics;
use tracing::{debug, warn};

use crate::timer::TimerTask;

/// Task label recorded in `maintenance_ticks_total`.
pub const TASK_NAME: &str = "diagnostics";

/// Logs the state and counters of every torrent in the session.
pub struct TorrentDiagnostics {
    session: Arc<dyn TorrentSession>,
    metrics: Metrics,
}

impl TorrentDiagnostics {
    /// Build the task over `session`.
    #[must_use]
    pub fn new(session: Arc<dyn TorrentSession>, metrics: Metrics) -> Self {
        Self { session, metrics }
    }

    /// Log one line per torrent and return how many were logged.
    ///
    /// # Errors
    ///
    /// Propagates a failed torrent listing.
    pub async fn log_torrents(&self) -> SessionResult<usize> {
        self.metrics.inc_maintenance_tick(TASK_NAME);
        let torrents = self.session.get_all_torrents_info().await?;
        self.metrics.set_torrents_tracked(torrents.len());
        for torrent in &torrents {
            debug!(
                info_hash = %torrent.info_hash,
                name = %torrent.name,
                state = %torrent.state,
                progress = torrent.progress,
                dl_speed = torrent.dl_speed,
                ul_speed = torrent.ul_speed,
                ratio = torrent.upload_ratio(),
                seeds = torrent.num_seeds,
                peers = torrent.num_peers,
                "torrent status"
            );
        }
        Ok(torrents.len())
    }
}

#[async_trait]
impl TimerTask for TorrentDiagnostics {
    async fn run(&self) {
        if let Err(err) = self.log_torrents().await {
            warn!(error = %err, "failed to list torrents for diagnostics");
        }
    }
}
