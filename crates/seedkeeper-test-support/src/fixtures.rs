//! Torrent snapshot fixtures.

use chrono::{NaiveDateTime, TimeDelta};
use seedkeeper_session::{COMPLETED_TIME_FORMAT, TorrentInfo, TorrentState};

/// Deterministic 40-character lowercase info-hash derived from `seed`.
#[must_use]
pub fn info_hash(seed: u8) -> String {
    format!("{seed:02x}").repeat(20)
}

/// Snapshot with the fields the maintenance engine inspects.
#[must_use]
pub fn torrent_info(
    info_hash: &str,
    state: TorrentState,
    total_upload: u64,
    total_download: u64,
    completed_time: Option<&str>,
) -> TorrentInfo {
    let mut info = TorrentInfo::new(info_hash, state);
    info.name = format!("torrent-{}", &info_hash[..info_hash.len().min(8)]);
    info.total_upload = total_upload;
    info.total_download = total_download;
    info.completed_time = completed_time.map(str::to_owned);
    info
}

/// Completion timestamp `hours` before `now`, in the session's format.
#[must_use]
pub fn completed_hours_ago(now: NaiveDateTime, hours: i64) -> String {
    (now - TimeDelta::hours(hours))
        .format(COMPLETED_TIME_FORMAT)
        .to_string()
}
