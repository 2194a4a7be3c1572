// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real process runner backed by `tokio::process`

use super::{ProcessError, ProcessOutput, ProcessRunner, ProcessSpec, DEFAULT_OUTPUT_LIMIT};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Runs each process in its own process group so a timeout, or dropping
/// the run future, takes down everything it spawned.
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    output_limit: usize,
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_LIMIT)
    }
}

impl SubprocessRunner {
    pub fn new(output_limit: usize) -> Self {
        Self { output_limit }
    }

    pub fn output_limit(&self) -> usize {
        self.output_limit
    }
}

#[async_trait]
impl ProcessRunner for SubprocessRunner {
    async fn run(&self, spec: ProcessSpec) -> Result<ProcessOutput, ProcessError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| ProcessError::LaunchFailure {
            description: spec.description.clone(),
            source,
        })?;
        let pid = child.id();
        let mut group = GroupGuard::new(pid);
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.output_limit;
        let description = spec.description.as_str();

        let collect = async {
            let (out, err) = tokio::try_join!(
                read_capped(stdout, limit, "stdout", description),
                read_capped(stderr, limit, "stderr", description),
            )?;
            let status = child.wait().await.map_err(|source| ProcessError::Io {
                description: description.to_string(),
                source,
            })?;
            Ok::<_, ProcessError>((out, err, status))
        };

        let error = match tokio::time::timeout(spec.timeout, collect).await {
            Ok(Ok((out, err, status))) => {
                group.disarm();
                return Ok(ProcessOutput {
                    stdout: String::from_utf8_lossy(&out).into_owned(),
                    stderr: String::from_utf8_lossy(&err).into_owned(),
                    exit_code: status.code().unwrap_or(-1),
                });
            }
            Ok(Err(e)) => e,
            Err(_elapsed) => ProcessError::Timeout {
                description: spec.description.clone(),
                timeout: spec.timeout,
            },
        };

        terminate(&mut child, pid).await;
        group.disarm();
        Err(error)
    }
}

/// Kills the process group when dropped while armed, so a cancelled run
/// leaves nothing behind.
struct GroupGuard {
    pgid: Option<u32>,
}

impl GroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            tracing::debug!(pgid, "run dropped, killing process group");
            kill_group(pgid);
        }
    }
}

/// Read a stream to EOF, failing once more than `limit` bytes arrive.
async fn read_capped<R>(
    reader: Option<R>,
    limit: usize,
    stream: &'static str,
    description: &str,
) -> Result<Vec<u8>, ProcessError>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|source| ProcessError::Io {
                description: description.to_string(),
                source,
            })?;
        if n == 0 {
            return Ok(buf);
        }
        if buf.len() + n > limit {
            return Err(ProcessError::OutputTooLarge {
                description: description.to_string(),
                stream,
                limit,
            });
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// SIGKILL every process in the group led by `pgid`.
fn kill_group(pgid: u32) {
    #[cfg(unix)]
    if let Ok(raw) = i32::try_from(pgid) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
            tracing::debug!(pgid, error = %e, "killpg failed (group may be gone)");
        }
    }
    #[cfg(not(unix))]
    let _ = pgid;
}

/// Kill the whole process group, then the direct child, and reap it.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    if let Some(pgid) = pid {
        kill_group(pgid);
    }

    if let Err(e) = child.kill().await {
        tracing::debug!(error = %e, "kill failed (process may have exited)");
    }
}
