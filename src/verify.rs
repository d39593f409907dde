//! Verification harness.
//!
//! Drives one external proxy-client process per descriptor: render the
//! configuration, stage it to a per-attempt temporary file, spawn the client
//! against it, and classify the outcome by whether the process survives the
//! grace window. The staged file is owned by the attempt and removed on
//! every exit path; the child never outlives the attempt.

use crate::config::VerifierConfig;
use crate::descriptor::ConfigDescriptor;
use crate::error::RenderError;
use crate::render::render_client_config;

use anyhow::Context;
use log::{debug, warn};
use std::io::Write;
use std::process::{ExitStatus, Stdio};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time;

const STDERR_EXCERPT_LIMIT: usize = 4096;

/// Why a descriptor was classified not working.
#[derive(Debug, Error)]
pub enum FailureReason {
    /// The configuration document could not be rendered.
    #[error("configuration could not be rendered: {0}")]
    Render(#[from] RenderError),
    /// The client process could not be spawned (binary missing, permission
    /// denied, resource exhaustion).
    #[error("client process failed to launch: {0}")]
    Launch(#[from] std::io::Error),
    /// The client exited before the grace window elapsed.
    #[error("client exited within the grace period ({status})")]
    ExitedEarly {
        status: ExitStatus,
        /// Trailing stderr output, diagnostic only.
        stderr: String,
    },
}

/// Outcome of one verification attempt.
///
/// "Working" means only that the client was still alive at the end of the
/// grace window. A client that starts and hangs without ever establishing a
/// tunnel is indistinguishable from a functioning one; no traffic probe is
/// attempted.
#[derive(Debug)]
pub enum Verdict {
    Working,
    Failed(FailureReason),
}

impl Verdict {
    pub fn is_working(&self) -> bool {
        matches!(self, Self::Working)
    }
}

/// Runs verification attempts, one descriptor at a time.
pub struct VerificationRunner {
    config: VerifierConfig,
}

impl VerificationRunner {
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Verify one descriptor.
    ///
    /// Classification failures are reported in the `Verdict`; only I/O
    /// failures while staging the configuration file are fatal and surface
    /// as `Err`.
    pub async fn verify(&self, descriptor: &ConfigDescriptor) -> anyhow::Result<Verdict> {
        let document = match render_client_config(descriptor, &self.config) {
            Ok(document) => document,
            Err(e) => return Ok(Verdict::Failed(FailureReason::Render(e))),
        };

        // Holding the handle for the whole attempt guarantees the staged
        // file is removed on every path out of this function.
        let staged = self.stage(&document)?;

        let mut child = match Command::new(&self.config.client_binary)
            .arg("-config")
            .arg(staged.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return Ok(Verdict::Failed(FailureReason::Launch(e))),
        };

        match time::timeout(self.config.grace_period, child.wait()).await {
            // Still alive at the grace boundary: working. Terminate and reap
            // so no process outlives the attempt.
            Err(_) => {
                if let Err(e) = child.start_kill() {
                    warn!("Failed to terminate client process: {e}");
                }
                let _ = child.wait().await;
                Ok(Verdict::Working)
            }
            Ok(Ok(status)) => {
                let stderr = drain_stderr(&mut child).await;
                debug!("Client exited early ({status}): {stderr}");
                Ok(Verdict::Failed(FailureReason::ExitedEarly { status, stderr }))
            }
            Ok(Err(e)) => Ok(Verdict::Failed(FailureReason::Launch(e))),
        }
    }

    /// Write the configuration document to a unique temporary file scoped to
    /// this attempt.
    fn stage(&self, document: &serde_json::Value) -> anyhow::Result<NamedTempFile> {
        let mut staged = tempfile::Builder::new()
            .prefix("verify-")
            .suffix(".json")
            .tempfile_in(&self.config.staging_dir)
            .with_context(|| {
                format!(
                    "failed to stage configuration in {}",
                    self.config.staging_dir.display()
                )
            })?;
        let rendered =
            serde_json::to_string_pretty(document).context("failed to serialize configuration")?;
        staged
            .write_all(rendered.as_bytes())
            .context("failed to write staged configuration")?;
        staged.flush().context("failed to flush staged configuration")?;
        Ok(staged)
    }
}

/// Read whatever the exited child left on stderr, bounded, for diagnostics.
async fn drain_stderr(child: &mut Child) -> String {
    let mut buffer = Vec::new();
    if let Some(mut stderr) = child.stderr.take() {
        let _ = stderr.read_to_end(&mut buffer).await;
    }
    buffer.truncate(STDERR_EXCERPT_LIMIT);
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn descriptor() -> ConfigDescriptor {
        crate::link::parse_shadowsocks("ss://aes-256-gcm:pw@1.2.3.4:8388#test").unwrap()
    }

    fn runner_for(binary: impl Into<PathBuf>, staging: &Path) -> VerificationRunner {
        let config = VerifierConfig::builder()
            .client_binary(binary)
            .grace_period(Duration::from_millis(300))
            .staging_dir(staging)
            .build();
        VerificationRunner::new(config)
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn staging_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_long_lived_client_is_working_and_reaped() {
        let dir = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "client", "sleep 30");

        let runner = runner_for(script, staging.path());
        let verdict = runner.verify(&descriptor()).await.unwrap();

        assert!(verdict.is_working());
        assert!(staging_is_empty(staging.path()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_early_exit_is_not_working() {
        let dir = tempfile::tempdir().unwrap();
        let staging = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "client", "echo boom >&2\nexit 3");

        let runner = runner_for(script, staging.path());
        let verdict = runner.verify(&descriptor()).await.unwrap();

        match verdict {
            Verdict::Failed(FailureReason::ExitedEarly { status, stderr }) => {
                assert_eq!(status.code(), Some(3));
                assert!(stderr.contains("boom"));
            }
            other => panic!("expected early exit, got {other:?}"),
        }
        assert!(staging_is_empty(staging.path()));
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_working() {
        let staging = tempfile::tempdir().unwrap();
        let runner = runner_for("/nonexistent/proxy-client-binary", staging.path());
        let verdict = runner.verify(&descriptor()).await.unwrap();

        assert!(matches!(
            verdict,
            Verdict::Failed(FailureReason::Launch(_))
        ));
        assert!(staging_is_empty(staging.path()));
    }

    #[tokio::test]
    async fn test_render_failure_is_not_working_without_staging() {
        let staging = tempfile::tempdir().unwrap();
        let runner = runner_for("/nonexistent/proxy-client-binary", staging.path());
        let broken = ConfigDescriptor::default();
        let verdict = runner.verify(&broken).await.unwrap();

        assert!(matches!(
            verdict,
            Verdict::Failed(FailureReason::Render(RenderError::MissingAddress))
        ));
        assert!(staging_is_empty(staging.path()));
    }
}
