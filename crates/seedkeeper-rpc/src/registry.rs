//! Static method table.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Every method the dispatcher can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Connectivity check.
    Ping,
    /// Schedule a background add.
    AddTorrent,
    /// Poll the background add flag.
    CheckTorrentAdded,
    /// Read the added torrent info from the data buffer.
    GetAddedTorrentInfo,
    /// Snapshot one torrent.
    GetTorrentInfo,
    /// Snapshot every torrent.
    GetAllTorrentInfo,
    /// Pause one torrent.
    PauseTorrent,
    /// Pause several torrents.
    PauseGroup,
    /// Resume one torrent.
    ResumeTorrent,
    /// Resume several torrents.
    ResumeGroup,
    /// Remove one torrent.
    RemoveTorrent,
    /// Remove several torrents.
    RemoveGroup,
    /// Schedule background buffering of a file.
    StreamTorrent,
    /// Poll the buffering flag.
    CheckBufferingComplete,
    /// Cancel buffering.
    AbortBuffering,
    /// Read the raw data buffer.
    GetDataBuffer,
    /// Pause every torrent.
    PauseAll,
    /// Resume every torrent.
    ResumeAll,
}

/// Registry entry: wire name, minimum positional arity and handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSpec {
    /// Case-sensitive method name.
    pub name: &'static str,
    /// Parameters required before the handler runs.
    pub min_params: usize,
    /// Handler selector.
    pub method: Method,
}

const fn entry(name: &'static str, min_params: usize, method: Method) -> MethodSpec {
    MethodSpec {
        name,
        min_params,
        method,
    }
}

/// Every registered method.
pub const METHODS: &[MethodSpec] = &[
    entry("ping", 0, Method::Ping),
    entry("add_torrent", 1, Method::AddTorrent),
    entry("check_torrent_added", 0, Method::CheckTorrentAdded),
    entry("get_added_torrent_info", 0, Method::GetAddedTorrentInfo),
    entry("get_torrent_info", 1, Method::GetTorrentInfo),
    entry("get_all_torrent_info", 0, Method::GetAllTorrentInfo),
    entry("pause_torrent", 1, Method::PauseTorrent),
    entry("pause_group", 1, Method::PauseGroup),
    entry("resume_torrent", 1, Method::ResumeTorrent),
    entry("resume_group", 1, Method::ResumeGroup),
    entry("remove_torrent", 2, Method::RemoveTorrent),
    entry("remove_group", 2, Method::RemoveGroup),
    entry("stream_torrent", 3, Method::StreamTorrent),
    entry("check_buffering_complete", 0, Method::CheckBufferingComplete),
    entry("abort_buffering", 0, Method::AbortBuffering),
    entry("get_data_buffer", 0, Method::GetDataBuffer),
    entry("pause_all", 0, Method::PauseAll),
    entry("resume_all", 0, Method::ResumeAll),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static MethodSpec>> =
    Lazy::new(|| METHODS.iter().map(|spec| (spec.name, spec)).collect());

/// Find a method by exact name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static MethodSpec> {
    BY_NAME.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = METHODS.iter().map(|spec| spec.name).collect();
        assert_eq!(names.len(), METHODS.len());
        assert_eq!(METHODS.len(), 18);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let spec = lookup("remove_group").expect("registered");
        assert_eq!(spec.min_params, 2);
        assert_eq!(spec.method, Method::RemoveGroup);
        assert!(lookup("Remove_Group").is_none());
        assert!(lookup("nonexistent").is_none());
    }
}
