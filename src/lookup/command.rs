use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Only the head of stderr is kept; it is used for log lines.
const STDERR_CAP: usize = 64 * 1024;

/// Fully buffered output of a finished command
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

/// Run `command` to completion, buffering its stdout.
///
/// Stdout is never allowed to grow past `byte_limit`: once it does, the child
/// is killed and the request fails with [`Error::PayloadTooLarge`] before any
/// of it reaches the client.
pub async fn run_captured(mut command: Command, byte_limit: usize) -> Result<CommandOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let program = command.as_std().get_program().to_string_lossy().into_owned();
    let mut child = command
        .spawn()
        .map_err(|e| Error::Upstream(format!("failed to start {}: {}", program, e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Internal("child stdout was not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Internal("child stderr was not captured".to_string()))?;

    // stderr is drained on its own task so a chatty child cannot block on a
    // full pipe while stdout is being read
    let stderr_task = tokio::spawn(drain_capped(stderr, STDERR_CAP));

    let mut buf = Vec::new();
    stdout
        .take(byte_limit as u64 + 1)
        .read_to_end(&mut buf)
        .await?;

    if buf.len() > byte_limit {
        tracing::warn!("{} produced more than {} bytes, killing it", program, byte_limit);
        stderr_task.abort();
        let _ = child.kill().await;
        return Err(Error::PayloadTooLarge(byte_limit));
    }

    let status = child.wait().await?;
    let stderr = stderr_task
        .await
        .map_err(|e| Error::Internal(format!("stderr reader failed: {}", e)))??;

    let stdout = String::from_utf8(buf)
        .map_err(|_| Error::UpstreamParse(format!("{} wrote non UTF-8 output", program)))?;

    Ok(CommandOutput {
        stdout,
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        status,
    })
}

/// Resolve a configured program path.
///
/// Bare names are left for `PATH` lookup. Relative paths are anchored to the
/// current directory, since commands run with a per-dataset working directory.
pub fn program_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() || path.components().count() == 1 {
        return Ok(path.to_path_buf());
    }
    Ok(std::path::absolute(path)?)
}

async fn drain_capped<R: AsyncRead + Unpin>(mut reader: R, cap: usize) -> std::io::Result<Vec<u8>> {
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let room = cap.saturating_sub(kept.len());
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }
    Ok(kept)
}
