//! In-memory session used by tests and by the daemon when no engine is linked.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{SessionError, SessionResult};
use crate::model::{AddTorrent, BufferTorrent, COMPLETED_TIME_FORMAT, TorrentInfo, TorrentState};
use crate::service::TorrentSession;

/// Save path used when neither the request nor the constructor supplies one.
const DEFAULT_SAVE_PATH: &str = "downloads";
const MAGNET_BTIH_PREFIX: &str = "xt=urn:btih:";

/// In-memory test double for the torrent session interface.
///
/// Only magnet links are accepted since nothing is fetched; background adds
/// and buffering complete on a spawned task so callers still have to poll.
#[derive(Clone)]
pub struct StubSession {
    inner: Arc<RwLock<StubState>>,
    default_save_path: Arc<str>,
}

#[derive(Default)]
struct StubState {
    torrents: HashMap<String, TorrentInfo>,
    torrent_added: bool,
    buffering_complete: bool,
    buffering_generation: u64,
    data_buffer: Value,
    resume_saves: u64,
}

impl Default for StubSession {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_PATH)
    }
}

impl StubSession {
    /// Create an empty session that stores new torrents under `default_save_path`.
    #[must_use]
    pub fn new(default_save_path: impl Into<String>) -> Self {
        Self::with_torrents(default_save_path, Vec::new())
    }

    /// Create a session pre-populated with the supplied snapshots.
    #[must_use]
    pub fn with_torrents(
        default_save_path: impl Into<String>,
        torrents: impl IntoIterator<Item = TorrentInfo>,
    ) -> Self {
        let torrents = torrents
            .into_iter()
            .map(|info| (info.info_hash.clone(), info))
            .collect();
        Self {
            inner: Arc::new(RwLock::new(StubState {
                torrents,
                ..StubState::default()
            })),
            default_save_path: Arc::from(default_save_path.into()),
        }
    }

    /// Number of times resume data has been saved.
    pub async fn resume_saves(&self) -> u64 {
        self.inner.read().await.resume_saves
    }

    fn resolve_save_path(&self, requested: Option<String>) -> String {
        requested
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| self.default_save_path.to_string())
    }
}

fn magnet_param<'a>(source: &'a str, key: &str) -> Option<&'a str> {
    let query = source.strip_prefix("magnet:?")?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(key))
}

fn magnet_info_hash(source: &str) -> SessionResult<String> {
    if !source.starts_with("magnet:?") {
        return Err(SessionError::InvalidInput {
            field: "source",
            reason: "only magnet links are supported",
        });
    }
    let hash = magnet_param(source, MAGNET_BTIH_PREFIX).ok_or(SessionError::InvalidInput {
        field: "source",
        reason: "magnet link lacks a btih info-hash",
    })?;
    if hash.len() != 40 || !hash.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(SessionError::InvalidInput {
            field: "source",
            reason: "info-hash must be 40 hex characters",
        });
    }
    Ok(hash.to_ascii_lowercase())
}

#[async_trait]
impl TorrentSession for StubSession {
    async fn add_torrent_async(&self, request: AddTorrent) -> SessionResult<()> {
        let info_hash = magnet_info_hash(&request.source)?;
        let name = magnet_param(&request.source, "dn=")
            .map_or_else(|| info_hash.clone(), |name| name.replace('+', " "));
        let save_path = self.resolve_save_path(request.save_path);
        let state = if request.zero_priorities {
            TorrentState::Queued
        } else {
            TorrentState::Downloading
        };

        self.inner.write().await.torrent_added = false;
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut info = TorrentInfo::new(info_hash.clone(), state);
            info.name = name;
            info.save_path = save_path;
            info.added_time = Some(Local::now().format(COMPLETED_TIME_FORMAT).to_string());

            let mut guard = inner.write().await;
            let entry = guard.torrents.entry(info_hash).or_insert(info);
            let buffer = serde_json::to_value(&*entry).unwrap_or(Value::Null);
            guard.data_buffer = buffer;
            guard.torrent_added = true;
        });
        Ok(())
    }

    async fn is_torrent_added(&self) -> bool {
        self.inner.read().await.torrent_added
    }

    async fn data_buffer(&self) -> Value {
        self.inner.read().await.data_buffer.clone()
    }

    async fn get_torrent_info(&self, info_hash: &str) -> SessionResult<TorrentInfo> {
        self.inner
            .read()
            .await
            .torrents
            .get(info_hash)
            .cloned()
            .ok_or_else(|| SessionError::NotFound {
                info_hash: info_hash.to_owned(),
            })
    }

    async fn get_all_torrents_info(&self) -> SessionResult<Vec<TorrentInfo>> {
        Ok(self.inner.read().await.torrents.values().cloned().collect())
    }

    async fn pause_torrent(&self, info_hash: &str) -> SessionResult<()> {
        let mut guard = self.inner.write().await;
        let torrent = guard
            .torrents
            .get_mut(info_hash)
            .ok_or_else(|| SessionError::NotFound {
                info_hash: info_hash.to_owned(),
            })?;
        torrent.state = TorrentState::Paused;
        Ok(())
    }

    async fn resume_torrent(&self, info_hash: &str) -> SessionResult<()> {
        let mut guard = self.inner.write().await;
        let torrent = guard
            .torrents
            .get_mut(info_hash)
            .ok_or_else(|| SessionError::NotFound {
                info_hash: info_hash.to_owned(),
            })?;
        resume_in_place(torrent);
        Ok(())
    }

    async fn remove_torrent(&self, info_hash: &str, delete_files: bool) -> SessionResult<()> {
        if self.inner.write().await.torrents.remove(info_hash).is_some() {
            debug!(info_hash, delete_files, "stub session removed torrent");
            Ok(())
        } else {
            Err(SessionError::NotFound {
                info_hash: info_hash.to_owned(),
            })
        }
    }

    async fn buffer_torrent_async(&self, request: BufferTorrent) -> SessionResult<()> {
        if !request.buffer_size_mb.is_finite() || request.buffer_size_mb <= 0.0 {
            return Err(SessionError::InvalidInput {
                field: "buffer_size_mb",
                reason: "must be a positive number",
            });
        }

        let (generation, path) = {
            let mut guard = self.inner.write().await;
            let torrent =
                guard
                    .torrents
                    .get(&request.info_hash)
                    .ok_or_else(|| SessionError::NotFound {
                        info_hash: request.info_hash.clone(),
                    })?;
            let path = format!("{}/{}", torrent.save_path, torrent.name);
            guard.buffering_generation += 1;
            guard.buffering_complete = false;
            guard.data_buffer = Value::Null;
            (guard.buffering_generation, path)
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let mut guard = inner.write().await;
            if guard.buffering_generation != generation {
                return;
            }
            guard.buffering_complete = true;
            guard.data_buffer = json!({
                "info_hash": request.info_hash,
                "file_index": request.file_index,
                "buffer_size_mb": request.buffer_size_mb,
                "path": path,
            });
        });
        Ok(())
    }

    async fn is_buffering_complete(&self) -> bool {
        self.inner.read().await.buffering_complete
    }

    async fn abort_buffering(&self) -> SessionResult<()> {
        let mut guard = self.inner.write().await;
        guard.buffering_generation += 1;
        guard.buffering_complete = false;
        guard.data_buffer = Value::Null;
        Ok(())
    }

    async fn pause_all(&self) -> SessionResult<()> {
        for torrent in self.inner.write().await.torrents.values_mut() {
            torrent.state = TorrentState::Paused;
        }
        Ok(())
    }

    async fn resume_all(&self) -> SessionResult<()> {
        for torrent in self.inner.write().await.torrents.values_mut() {
            resume_in_place(torrent);
        }
        Ok(())
    }

    async fn save_all_resume_data(&self) -> SessionResult<()> {
        self.inner.write().await.resume_saves += 1;
        Ok(())
    }
}

fn resume_in_place(torrent: &mut TorrentInfo) {
    if torrent.state == TorrentState::Paused {
        torrent.state = if torrent.completed_time.is_some() {
            TorrentState::Seeding
        } else {
            TorrentState::Downloading
        };
    }
}
