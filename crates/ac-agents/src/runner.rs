// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Process runner: spawn, stream, capture

use crate::builder::Invocation;
use crate::traits::{AgentError, AgentResult};
use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Executes one invocation to completion
///
/// The seam exists so callers and tests can intercept spawning; the default
/// implementation is [`TokioProcessRunner`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> AgentResult<ProcessOutput>;
}

/// Spawns real child processes with tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

/// Fail with `WorkspaceNotFound` unless `dir` is an existing directory
pub async fn ensure_workspace(dir: &Path) -> AgentResult<()> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(AgentError::WorkspaceNotFound(dir.to_path_buf())),
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: &Invocation) -> AgentResult<ProcessOutput> {
        ensure_workspace(&invocation.working_dir).await?;

        debug!(
            program = %invocation.program,
            args = ?invocation.args,
            cwd = ?invocation.working_dir,
            "Spawning agent process"
        );

        let mut child = invocation.to_command().spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                AgentError::ExecutableNotFound(invocation.program.clone())
            } else {
                AgentError::ProcessSpawnFailed(e)
            }
        })?;

        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let print = invocation.print_output;
        let mut stdout_task = tokio::spawn(tee(stdout, print.then(tokio::io::stdout)));
        let mut stderr_task = tokio::spawn(tee(stderr, print.then(tokio::io::stderr)));

        // Deadline covers draining the pipes; spawned helpers can hold them open
        let finished = async {
            let status = child.wait().await?;
            let stdout = collect(&mut stdout_task).await?;
            let stderr = collect(&mut stderr_task).await?;
            Ok::<_, AgentError>((status, stdout, stderr))
        };

        let outcome = match invocation.timeout {
            Some(limit) => tokio::time::timeout(limit, finished).await.ok(),
            None => Some(finished.await),
        };

        let (status, stdout, stderr) = match outcome {
            Some(result) => result?,
            None => {
                let limit = invocation.timeout.unwrap_or_default();
                warn!(program = %invocation.program, "Agent process timed out after {:?}", limit);
                if let Err(e) = child.kill().await {
                    debug!("Agent process already gone at timeout: {}", e);
                }
                stdout_task.abort();
                stderr_task.abort();
                return Err(AgentError::TimedOut { timeout: limit });
            }
        };

        let exit_code = status.code();

        if !status.success() {
            let error_text = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            debug!(?exit_code, "Agent process failed");
            return Err(AgentError::ProcessExecution {
                exit_code,
                stderr: error_text,
            });
        }

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

fn missing_pipe(name: &str) -> AgentError {
    AgentError::ProcessSpawnFailed(io::Error::new(
        io::ErrorKind::BrokenPipe,
        format!("child {} was not captured", name),
    ))
}

async fn collect(task: &mut JoinHandle<io::Result<Vec<u8>>>) -> AgentResult<String> {
    let bytes = task.await.map_err(|e| AgentError::ProcessSpawnFailed(io::Error::other(e)))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read `reader` to the end, fanning every chunk out to the capture buffer and,
/// when present, the console sink.
///
/// A failing console sink is dropped; capture continues.
async fn tee<R, W>(mut reader: R, mut console: Option<W>) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        captured.extend_from_slice(&buf[..n]);

        let relay_failed = match console.as_mut() {
            Some(sink) => {
                let written = match sink.write_all(&buf[..n]).await {
                    Ok(()) => sink.flush().await,
                    Err(e) => Err(e),
                };
                if let Err(e) = &written {
                    warn!("Console relay failed, continuing capture only: {}", e);
                }
                written.is_err()
            }
            None => false,
        };
        if relay_failed {
            console = None;
        }
    }

    Ok(captured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tee_captures_and_relays() {
        let input: &[u8] = b"line one\nline two\n";
        let mut console = Vec::new();
        let captured = tee(input, Some(&mut console)).await.unwrap();
        assert_eq!(captured, input);
        assert_eq!(console, input);
    }

    #[tokio::test]
    async fn test_tee_without_console() {
        let input: &[u8] = b"quiet";
        let captured = tee(input, None::<Vec<u8>>).await.unwrap();
        assert_eq!(captured, b"quiet");
    }

    #[tokio::test]
    async fn test_ensure_workspace() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(ensure_workspace(dir.path()).await.is_ok());

        let missing = dir.path().join("missing");
        let err = ensure_workspace(&missing).await.unwrap_err();
        assert!(matches!(err, AgentError::WorkspaceNotFound(p) if p == missing));
    }

    #[tokio::test]
    async fn test_workspace_that_is_a_file_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            ensure_workspace(&file).await,
            Err(AgentError::WorkspaceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let dir = tempfile::TempDir::new().unwrap();
        let invocation = Invocation::new("definitely-not-an-installed-agent-cli", dir.path());
        let err = TokioProcessRunner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, AgentError::ExecutableNotFound(_)));
    }
}
