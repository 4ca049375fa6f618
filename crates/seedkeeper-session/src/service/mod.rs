//! Session capability trait implemented by torrent engine adapters.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{SessionError, SessionResult};
use crate::model::{AddTorrent, BufferTorrent, TorrentInfo};

/// Operations the control plane issues against a live torrent session.
///
/// Implementations must tolerate concurrent calls from request handlers and
/// maintenance timers at the same time; callers add no locking of their own.
#[async_trait]
pub trait TorrentSession: Send + Sync {
    /// Start adding a torrent in the background and return before it completes.
    async fn add_torrent_async(&self, request: AddTorrent) -> SessionResult<()>;

    /// Whether the most recent background add has finished.
    async fn is_torrent_added(&self) -> bool;

    /// Contents of the session data buffer (added torrent info or buffering result).
    async fn data_buffer(&self) -> Value;

    /// Snapshot a single torrent.
    async fn get_torrent_info(&self, info_hash: &str) -> SessionResult<TorrentInfo>;

    /// Snapshot every torrent in the session, in no particular order.
    async fn get_all_torrents_info(&self) -> SessionResult<Vec<TorrentInfo>>;

    /// Pause a torrent.
    async fn pause_torrent(&self, info_hash: &str) -> SessionResult<()>;

    /// Resume a paused torrent.
    async fn resume_torrent(&self, info_hash: &str) -> SessionResult<()>;

    /// Remove a torrent, optionally deleting its downloaded data.
    async fn remove_torrent(&self, info_hash: &str, delete_files: bool) -> SessionResult<()>;

    /// Start sequential buffering of a file; default implementation reports lack of support.
    async fn buffer_torrent_async(&self, request: BufferTorrent) -> SessionResult<()> {
        let _ = request;
        Err(SessionError::Unsupported {
            operation: "buffer_torrent_async",
        })
    }

    /// Whether the most recent buffering request has completed.
    async fn is_buffering_complete(&self) -> bool {
        false
    }

    /// Cancel in-progress buffering; default implementation reports lack of support.
    async fn abort_buffering(&self) -> SessionResult<()> {
        Err(SessionError::Unsupported {
            operation: "abort_buffering",
        })
    }

    /// Pause every torrent in the session.
    async fn pause_all(&self) -> SessionResult<()>;

    /// Resume every torrent in the session.
    async fn resume_all(&self) -> SessionResult<()>;

    /// Persist resume data for every torrent.
    async fn save_all_resume_data(&self) -> SessionResult<()>;
}
