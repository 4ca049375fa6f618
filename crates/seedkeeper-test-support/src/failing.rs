//! Session double that fails selected operations.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use seedkeeper_session::{
    AddTorrent, BufferTorrent, SessionError, SessionResult, TorrentInfo, TorrentSession,
};
use serde_json::Value;

use crate::recording::RecordingSession;

/// Wraps a [`RecordingSession`], failing commands that target chosen
/// info-hashes and optionally the listing and resume-data calls.
///
/// Failed commands are not recorded.
#[derive(Debug, Clone)]
pub struct FailingSession {
    inner: Arc<RecordingSession>,
    failing_hashes: HashSet<String>,
    fail_listing: bool,
    fail_resume_data: bool,
}

impl FailingSession {
    /// Delegate successful calls to `inner`.
    #[must_use]
    pub fn new(inner: Arc<RecordingSession>) -> Self {
        Self {
            inner,
            failing_hashes: HashSet::new(),
            fail_listing: false,
            fail_resume_data: false,
        }
    }

    /// Fail every command targeting `info_hash`.
    #[must_use]
    pub fn failing_hash(mut self, info_hash: impl Into<String>) -> Self {
        self.failing_hashes.insert(info_hash.into());
        self
    }

    /// Fail `get_all_torrents_info`.
    #[must_use]
    pub const fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Fail `save_all_resume_data`.
    #[must_use]
    pub const fn failing_resume_data(mut self) -> Self {
        self.fail_resume_data = true;
        self
    }

    /// Underlying recorder.
    #[must_use]
    pub const fn inner(&self) -> &Arc<RecordingSession> {
        &self.inner
    }

    fn check_hash(&self, operation: &'static str, info_hash: &str) -> SessionResult<()> {
        if self.failing_hashes.contains(info_hash) {
            return Err(SessionError::operation_failed(
                operation,
                Some(info_hash),
                "injected failure",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl TorrentSession for FailingSession {
    async fn add_torrent_async(&self, request: AddTorrent) -> SessionResult<()> {
        self.inner.add_torrent_async(request).await
    }

    async fn is_torrent_added(&self) -> bool {
        self.inner.is_torrent_added().await
    }

    async fn data_buffer(&self) -> Value {
        self.inner.data_buffer().await
    }

    async fn get_torrent_info(&self, info_hash: &str) -> SessionResult<TorrentInfo> {
        self.check_hash("get_torrent_info", info_hash)?;
        self.inner.get_torrent_info(info_hash).await
    }

    async fn get_all_torrents_info(&self) -> SessionResult<Vec<TorrentInfo>> {
        if self.fail_listing {
            return Err(SessionError::operation_failed(
                "get_all_torrents_info",
                None,
                "injected failure",
            ));
        }
        self.inner.get_all_torrents_info().await
    }

    async fn pause_torrent(&self, info_hash: &str) -> SessionResult<()> {
        self.check_hash("pause_torrent", info_hash)?;
        self.inner.pause_torrent(info_hash).await
    }

    async fn resume_torrent(&self, info_hash: &str) -> SessionResult<()> {
        self.check_hash("resume_torrent", info_hash)?;
        self.inner.resume_torrent(info_hash).await
    }

    async fn remove_torrent(&self, info_hash: &str, delete_files: bool) -> SessionResult<()> {
        self.check_hash("remove_torrent", info_hash)?;
        self.inner.remove_torrent(info_hash, delete_files).await
    }

    async fn buffer_torrent_async(&self, request: BufferTorrent) -> SessionResult<()> {
        self.check_hash("buffer_torrent_async", &request.info_hash)?;
        self.inner.buffer_torrent_async(request).await
    }

    async fn is_buffering_complete(&self) -> bool {
        self.inner.is_buffering_complete().await
    }

    async fn abort_buffering(&self) -> SessionResult<()> {
        self.inner.abort_buffering().await
    }

    async fn pause_all(&self) -> SessionResult<()> {
        self.inner.pause_all().await
    }

    async fn resume_all(&self) -> SessionResult<()> {
        self.inner.resume_all().await
    }

    async fn save_all_resume_data(&self) -> SessionResult<()> {
        if self.fail_resume_data {
            return Err(SessionError::operation_failed(
                "save_all_resume_data",
                None,
                "injected failure",
            ));
        }
        self.inner.save_all_resume_data().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::info_hash;

    #[tokio::test]
    async fn selected_hashes_fail_and_others_pass_through() -> anyhow::Result<()> {
        let recorder = Arc::new(RecordingSession::default());
        let session = FailingSession::new(Arc::clone(&recorder)).failing_hash(info_hash(2));

        session.pause_torrent(&info_hash(1)).await?;
        let err = session
            .pause_torrent(&info_hash(2))
            .await
            .expect_err("injected");
        assert!(err.to_string().contains("injected failure"));
        assert_eq!(recorder.paused().await, vec![info_hash(1)]);
        Ok(())
    }

    #[tokio::test]
    async fn listing_and_resume_failures_are_opt_in() {
        let session = FailingSession::new(Arc::new(RecordingSession::default()))
            .failing_listing()
            .failing_resume_data();
        assert!(session.get_all_torrents_info().await.is_err());
        assert!(session.save_all_resume_data().await.is_err());
        assert_eq!(session.inner().resume_saves().await, 0);
    }
}
