//! Periodic resume-data persistence.

use std::sync::Arc;

use async_trait::async_trait;
use seedkeeper_session::{SessionResult, TorrentSession};
use seedkeeper_telemetry::Metrics;
use tracing::{trace, warn};

use crate::timer::TimerTask;

/// Task label recorded in `maintenance_ticks_total`.
pub const TASK_NAME: &str = "resume_data";

/// Asks the session to persist resume data for every torrent.
pub struct ResumePersistence {
    session: Arc<dyn TorrentSession>,
    metrics: Metrics,
}

impl ResumePersistence {
    /// Build the task over `session`.
    #[must_use]
    pub fn new(session: Arc<dyn TorrentSession>, metrics: Metrics) -> Self {
        Self { session, metrics }
    }

    /// Persist resume data once.
    ///
    /// # Errors
    ///
    /// Propagates the session failure.
    pub async fn save(&self) -> SessionResult<()> {
        self.metrics.inc_maintenance_tick(TASK_NAME);
        self.session.save_all_resume_data().await
    }
}

#[async_trait]
impl TimerTask for ResumePersistence {
    async fn run(&self) {
        match self.save().await {
            Ok(()) => trace!("resume data saved"),
            Err(err) => warn!(error = %err, "failed to save resume data"),
        }
    }
}
