//! Torrent snapshots and command payloads shared across the workspace.

use std::fmt::{self, Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Layout of `TorrentInfo::completed_time` as reported by the session (local time).
pub const COMPLETED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lifecycle states reported by the torrent session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TorrentState {
    /// Waiting for a slot in the session queue.
    #[serde(rename = "queued")]
    Queued,
    /// Verifying pieces already on disk.
    #[serde(rename = "checking")]
    Checking,
    /// Resolving metadata for a magnet link.
    #[serde(rename = "downloading metadata")]
    DownloadingMetadata,
    /// Actively downloading pieces.
    #[serde(rename = "downloading")]
    Downloading,
    /// All wanted pieces present but not yet seeding.
    #[serde(rename = "finished")]
    Finished,
    /// Complete and uploading to peers.
    #[serde(rename = "seeding")]
    Seeding,
    /// Reserving disk space for the payload.
    #[serde(rename = "allocating")]
    Allocating,
    /// Validating fast-resume data.
    #[serde(rename = "checking fastresume")]
    CheckingFastresume,
    /// Halted by a pause command.
    #[serde(rename = "paused")]
    Paused,
}

impl TorrentState {
    /// Render the state as its wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Checking => "checking",
            Self::DownloadingMetadata => "downloading metadata",
            Self::Downloading => "downloading",
            Self::Finished => "finished",
            Self::Seeding => "seeding",
            Self::Allocating => "allocating",
            Self::CheckingFastresume => "checking fastresume",
            Self::Paused => "paused",
        }
    }
}

impl Display for TorrentState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Point-in-time snapshot of a single torrent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TorrentInfo {
    /// Lowercase hex info-hash; unique within the session.
    pub info_hash: String,
    /// Display name reported by the torrent metadata.
    #[serde(default)]
    pub name: String,
    /// Current lifecycle state.
    pub state: TorrentState,
    /// Total payload size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Completion fraction in the `0.0..=1.0` range.
    #[serde(default)]
    pub progress: f64,
    /// Current download rate in bytes per second.
    #[serde(default)]
    pub dl_speed: u64,
    /// Current upload rate in bytes per second.
    #[serde(default)]
    pub ul_speed: u64,
    /// Bytes uploaded over the torrent's lifetime in the session.
    #[serde(default)]
    pub total_upload: u64,
    /// Bytes downloaded over the torrent's lifetime in the session.
    #[serde(default)]
    pub total_download: u64,
    /// Connected seeds.
    #[serde(default)]
    pub num_seeds: u32,
    /// Connected peers.
    #[serde(default)]
    pub num_peers: u32,
    /// Local timestamp when the torrent was added.
    #[serde(default)]
    pub added_time: Option<String>,
    /// Local timestamp when the download completed, formatted with
    /// [`COMPLETED_TIME_FORMAT`]. Absent or unparseable for incomplete torrents.
    #[serde(default)]
    pub completed_time: Option<String>,
    /// Directory holding the torrent payload.
    #[serde(default)]
    pub save_path: String,
}

impl TorrentInfo {
    /// Minimal snapshot with zeroed counters, used by engines before metadata arrives.
    #[must_use]
    pub fn new(info_hash: impl Into<String>, state: TorrentState) -> Self {
        Self {
            info_hash: info_hash.into(),
            name: String::new(),
            state,
            size: 0,
            progress: 0.0,
            dl_speed: 0,
            ul_speed: 0,
            total_upload: 0,
            total_download: 0,
            num_seeds: 0,
            num_peers: 0,
            added_time: None,
            completed_time: None,
            save_path: String::new(),
        }
    }

    /// Upload ratio for this torrent; see [`upload_ratio`].
    #[must_use]
    pub fn upload_ratio(&self) -> f64 {
        upload_ratio(self.total_upload, self.total_download)
    }

    /// Parse the completion timestamp, returning `None` when it is missing or malformed.
    #[must_use]
    pub fn completed_at(&self) -> Option<NaiveDateTime> {
        let raw = self.completed_time.as_deref()?.trim();
        NaiveDateTime::parse_from_str(raw, COMPLETED_TIME_FORMAT).ok()
    }
}

/// Uploaded bytes divided by downloaded bytes; `0.0` when nothing was downloaded.
#[must_use]
pub fn upload_ratio(total_upload: u64, total_download: u64) -> f64 {
    if total_download == 0 {
        0.0
    } else {
        bytes_to_f64(total_upload) / bytes_to_f64(total_download)
    }
}

const fn bytes_to_f64(value: u64) -> f64 {
    #[expect(
        clippy::cast_precision_loss,
        reason = "byte counters only feed ratio comparisons"
    )]
    {
        value as f64
    }
}

/// Request payload for admitting a torrent into the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddTorrent {
    /// Magnet link or `.torrent` URL.
    pub source: String,
    /// Target directory; `None` selects the session default.
    pub save_path: Option<String>,
    /// Admit with every file at zero priority so nothing downloads until streaming starts.
    pub zero_priorities: bool,
}

/// Request payload for sequential buffering of one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BufferTorrent {
    /// Torrent to buffer.
    pub info_hash: String,
    /// Index of the file within the torrent.
    pub file_index: u32,
    /// Size of the leading buffer in megabytes.
    pub buffer_size_mb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ratio_treats_zero_download_as_zero() {
        assert!(upload_ratio(0, 0).abs() < f64::EPSILON);
        assert!(upload_ratio(10, 0).abs() < f64::EPSILON);
        assert!((upload_ratio(10, 5) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn completed_at_rejects_missing_and_malformed_values() {
        let mut info = TorrentInfo::new("aa", TorrentState::Seeding);
        assert!(info.completed_at().is_none());

        info.completed_time = Some(String::new());
        assert!(info.completed_at().is_none());

        info.completed_time = Some("yesterday".into());
        assert!(info.completed_at().is_none());

        info.completed_time = Some("2024-03-01 08:15:00".into());
        let parsed = info.completed_at().expect("valid timestamp");
        assert_eq!(parsed.to_string(), "2024-03-01 08:15:00");
    }

    #[test]
    fn state_uses_session_wire_names() -> anyhow::Result<()> {
        let value = serde_json::to_value(TorrentState::DownloadingMetadata)?;
        assert_eq!(value, json!("downloading metadata"));
        let parsed: TorrentState = serde_json::from_value(json!("checking fastresume"))?;
        assert_eq!(parsed, TorrentState::CheckingFastresume);
        assert_eq!(TorrentState::Seeding.to_string(), "seeding");
        Ok(())
    }

    #[test]
    fn info_decodes_with_sparse_fields() -> anyhow::Result<()> {
        let info: TorrentInfo = serde_json::from_value(json!({
            "info_hash": "21df87c3cc3209e3b6011a88053aec35a58582a9",
            "state": "paused",
            "total_upload": 300,
            "total_download": 100,
        }))?;
        assert_eq!(info.state, TorrentState::Paused);
        assert!((info.upload_ratio() - 3.0).abs() < f64::EPSILON);
        assert!(info.completed_time.is_none());
        Ok(())
    }
}
