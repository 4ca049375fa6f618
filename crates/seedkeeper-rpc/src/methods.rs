//! Method handlers translating positional parameters into session commands.

use seedkeeper_session::{AddTorrent, BufferTorrent, SessionError, SessionResult, TorrentSession};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{RpcError, RpcResult};
use crate::params::Params;
use crate::registry::Method;

const OK: &str = "OK";
const PONG: &str = "pong";

fn ok() -> Value {
    Value::String(OK.to_string())
}

/// Run the handler for `method` against the session.
///
/// Parameter errors surface before the session is touched.
pub(super) async fn invoke(
    method: Method,
    session: &dyn TorrentSession,
    params: Params<'_>,
) -> RpcResult<Value> {
    let name = params.method();
    let session_err = |err: SessionError| RpcError::session(name, &err);
    match method {
        Method::Ping => Ok(Value::String(PONG.to_string())),
        Method::AddTorrent => {
            let request = add_request(&params)?;
            acknowledge(session.add_torrent_async(request).await.map_err(session_err))
        }
        Method::CheckTorrentAdded => Ok(Value::Bool(session.is_torrent_added().await)),
        Method::GetAddedTorrentInfo | Method::GetDataBuffer => Ok(session.data_buffer().await),
        Method::GetTorrentInfo => {
            let info = session
                .get_torrent_info(params.str(0)?)
                .await
                .map_err(session_err)?;
            encode(name, &info)
        }
        Method::GetAllTorrentInfo => {
            let torrents = session.get_all_torrents_info().await.map_err(session_err)?;
            encode(name, &torrents)
        }
        Method::PauseTorrent => acknowledge(
            session
                .pause_torrent(params.str(0)?)
                .await
                .map_err(session_err),
        ),
        Method::ResumeTorrent => acknowledge(
            session
                .resume_torrent(params.str(0)?)
                .await
                .map_err(session_err),
        ),
        Method::RemoveTorrent => {
            let info_hash = params.str(0)?;
            let delete_files = params.bool(1)?;
            acknowledge(
                session
                    .remove_torrent(info_hash, delete_files)
                    .await
                    .map_err(session_err),
            )
        }
        Method::PauseGroup => group(session, &params, GroupCommand::Pause).await,
        Method::ResumeGroup => group(session, &params, GroupCommand::Resume).await,
        Method::RemoveGroup => {
            let delete_files = params.bool(1)?;
            group(session, &params, GroupCommand::Remove { delete_files }).await
        }
        Method::StreamTorrent => {
            let request = BufferTorrent {
                info_hash: params.str(0)?.to_owned(),
                file_index: params.u32(1)?,
                buffer_size_mb: params.f64(2)?,
            };
            acknowledge(
                session
                    .buffer_torrent_async(request)
                    .await
                    .map_err(session_err),
            )
        }
        Method::CheckBufferingComplete => Ok(Value::Bool(session.is_buffering_complete().await)),
        Method::AbortBuffering => acknowledge(session.abort_buffering().await.map_err(session_err)),
        Method::PauseAll => acknowledge(session.pause_all().await.map_err(session_err)),
        Method::ResumeAll => acknowledge(session.resume_all().await.map_err(session_err)),
    }
}

/// `save_path` empty or absent selects the session default; `zero_priorities`
/// defaults to `true`.
fn add_request(params: &Params<'_>) -> RpcResult<AddTorrent> {
    Ok(AddTorrent {
        source: params.str(0)?.to_owned(),
        save_path: params
            .opt_str(1)?
            .filter(|path| !path.is_empty())
            .map(str::to_owned),
        zero_priorities: params.opt_bool(2)?.unwrap_or(true),
    })
}

fn acknowledge(result: RpcResult<()>) -> RpcResult<Value> {
    result.map(|()| ok())
}

fn encode<T: Serialize>(method: &'static str, value: &T) -> RpcResult<Value> {
    serde_json::to_value(value).map_err(|err| RpcError::InternalError {
        method,
        message: err.to_string(),
    })
}

/// Per-item command applied by a group method.
#[derive(Clone, Copy)]
enum GroupCommand {
    Pause,
    Resume,
    Remove { delete_files: bool },
}

async fn group(
    session: &dyn TorrentSession,
    params: &Params<'_>,
    command: GroupCommand,
) -> RpcResult<Value> {
    let hashes = params.str_list(0)?;
    let mut outcome = GroupOutcome::default();
    for info_hash in hashes {
        let result = match command {
            GroupCommand::Pause => session.pause_torrent(info_hash).await,
            GroupCommand::Resume => session.resume_torrent(info_hash).await,
            GroupCommand::Remove { delete_files } => {
                session.remove_torrent(info_hash, delete_files).await
            }
        };
        outcome.record(info_hash, result);
    }
    outcome.finish(params.method())
}

/// Per-item results of a group command; every item is attempted.
#[derive(Default)]
struct GroupOutcome {
    attempted: usize,
    failures: Vec<String>,
}

impl GroupOutcome {
    fn record(&mut self, info_hash: &str, result: SessionResult<()>) {
        self.attempted += 1;
        if let Err(err) = result {
            debug!(info_hash, error = %err, "group item failed");
            self.failures.push(format!("{info_hash}: {err}"));
        }
    }

    fn finish(self, method: &'static str) -> RpcResult<Value> {
        if self.failures.is_empty() {
            return Ok(ok());
        }
        Err(RpcError::InternalError {
            method,
            message: format!(
                "{} of {} torrents failed: {}",
                self.failures.len(),
                self.attempted,
                self.failures.join("; ")
            ),
        })
    }
}
