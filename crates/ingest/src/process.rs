use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::AcquisitionError;

/// Run an external tool to completion and return its stdout.
///
/// The child is killed if `timeout` elapses first. A non-zero exit becomes
/// [`AcquisitionError::Failed`] carrying the last stderr line.
pub(crate) async fn run_tool<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, AcquisitionError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(AcquisitionError::TimedOut {
                url: url.to_string(),
                secs: timeout.as_secs(),
            })
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(program = %program.display(), stderr = %stderr, "tool failed");
        let message = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("exited with {}", output.status));
        return Err(AcquisitionError::Failed {
            url: url.to_string(),
            message,
        });
    }
    Ok(output.stdout)
}
