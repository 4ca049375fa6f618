//! Session double that records every command it receives.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use seedkeeper_session::{
    AddTorrent, BufferTorrent, SessionError, SessionResult, TorrentInfo, TorrentSession,
};
use serde_json::Value;
use tokio::sync::RwLock;

/// Command observed by a [`RecordingSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// `add_torrent_async`.
    Add(AddTorrent),
    /// `pause_torrent`.
    Pause(String),
    /// `resume_torrent`.
    Resume(String),
    /// `remove_torrent`.
    Remove {
        /// Target torrent.
        info_hash: String,
        /// Whether files were to be deleted.
        delete_files: bool,
    },
    /// `buffer_torrent_async`.
    Buffer(BufferTorrent),
    /// `abort_buffering`.
    AbortBuffering,
    /// `pause_all`.
    PauseAll,
    /// `resume_all`.
    ResumeAll,
    /// `save_all_resume_data`.
    SaveResumeData,
}

/// Session that serves a fixed torrent list and records commands without
/// applying them.
#[derive(Debug, Default)]
pub struct RecordingSession {
    torrents: RwLock<Vec<TorrentInfo>>,
    commands: RwLock<Vec<SessionCommand>>,
    listings: AtomicUsize,
}

impl RecordingSession {
    /// Serve `torrents` from listing and lookup calls.
    #[must_use]
    pub fn new(torrents: impl IntoIterator<Item = TorrentInfo>) -> Self {
        Self {
            torrents: RwLock::new(torrents.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Every command received so far, in order.
    pub async fn commands(&self) -> Vec<SessionCommand> {
        self.commands.read().await.clone()
    }

    /// Info-hashes passed to `pause_torrent`.
    pub async fn paused(&self) -> Vec<String> {
        self.commands
            .read()
            .await
            .iter()
            .filter_map(|command| match command {
                SessionCommand::Pause(info_hash) => Some(info_hash.clone()),
                _ => None,
            })
            .collect()
    }

    /// `(info_hash, delete_files)` pairs passed to `remove_torrent`.
    pub async fn removed(&self) -> Vec<(String, bool)> {
        self.commands
            .read()
            .await
            .iter()
            .filter_map(|command| match command {
                SessionCommand::Remove {
                    info_hash,
                    delete_files,
                } => Some((info_hash.clone(), *delete_files)),
                _ => None,
            })
            .collect()
    }

    /// Number of `save_all_resume_data` calls.
    pub async fn resume_saves(&self) -> usize {
        self.commands
            .read()
            .await
            .iter()
            .filter(|command| matches!(command, SessionCommand::SaveResumeData))
            .count()
    }

    /// Number of `get_all_torrents_info` calls.
    #[must_use]
    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    async fn record(&self, command: SessionCommand) {
        self.commands.write().await.push(command);
    }
}

#[async_trait]
impl TorrentSession for RecordingSession {
    async fn add_torrent_async(&self, request: AddTorrent) -> SessionResult<()> {
        self.record(SessionCommand::Add(request)).await;
        Ok(())
    }

    async fn is_torrent_added(&self) -> bool {
        self.commands
            .read()
            .await
            .iter()
            .any(|command| matches!(command, SessionCommand::Add(_)))
    }

    async fn data_buffer(&self) -> Value {
        Value::Null
    }

    async fn get_torrent_info(&self, info_hash: &str) -> SessionResult<TorrentInfo> {
        self.torrents
            .read()
            .await
            .iter()
            .find(|info| info.info_hash == info_hash)
            .cloned()
            .ok_or_else(|| SessionError::NotFound {
                info_hash: info_hash.to_owned(),
            })
    }

    async fn get_all_torrents_info(&self) -> SessionResult<Vec<TorrentInfo>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(self.torrents.read().await.clone())
    }

    async fn pause_torrent(&self, info_hash: &str) -> SessionResult<()> {
        self.record(SessionCommand::Pause(info_hash.to_owned())).await;
        Ok(())
    }

    async fn resume_torrent(&self, info_hash: &str) -> SessionResult<()> {
        self.record(SessionCommand::Resume(info_hash.to_owned())).await;
        Ok(())
    }

    async fn remove_torrent(&self, info_hash: &str, delete_files: bool) -> SessionResult<()> {
        self.record(SessionCommand::Remove {
            info_hash: info_hash.to_owned(),
            delete_files,
        })
        .await;
        Ok(())
    }

    async fn buffer_torrent_async(&self, request: BufferTorrent) -> SessionResult<()> {
        self.record(SessionCommand::Buffer(request)).await;
        Ok(())
    }

    async fn is_buffering_complete(&self) -> bool {
        self.commands
            .read()
            .await
            .iter()
            .any(|command| matches!(command, SessionCommand::Buffer(_)))
    }

    async fn abort_buffering(&self) -> SessionResult<()> {
        self.record(SessionCommand::AbortBuffering).await;
        Ok(())
    }

    async fn pause_all(&self) -> SessionResult<()> {
        self.record(SessionCommand::PauseAll).await;
        Ok(())
    }

    async fn resume_all(&self) -> SessionResult<()> {
        self.record(SessionCommand::ResumeAll).await;
        Ok(())
    }

    async fn save_all_resume_data(&self) -> SessionResult<()> {
        self.record(SessionCommand::SaveResumeData).await;
        Ok(())
    }
}
