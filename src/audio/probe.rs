use crate::audio::error::{AudioError, AudioResult};
use serde::Deserialize;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

/// Reports an audio file's length in seconds.
///
/// Combining and chapter extraction use the reported durations for
/// irrevocable offset arithmetic, so implementations must fail hard
/// rather than return a partial or guessed value.
#[allow(async_fn_in_trait)]
pub trait DurationProbe {
    async fn duration_secs(&self, path: &Path) -> AudioResult<f64>;
}

#[derive(Deserialize)]
struct FfprobeDocument {
    format: FfprobeFormat,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    duration: String,
}

/// Queries durations by shelling out to ffprobe.
pub struct FfprobeDuration {
    timeout: Duration,
}

impl FfprobeDuration {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

impl Default for FfprobeDuration {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a probe command under a wall-clock deadline. The child is killed
/// when the deadline drops the in-flight future, so a hung probe cannot
/// outlive the run it aborted.
async fn run_with_deadline(
    mut command: Command,
    deadline: Duration,
    path: &Path,
) -> AudioResult<Output> {
    command.kill_on_drop(true);

    let output = timeout(deadline, command.output())
        .await
        .map_err(|_| AudioError::ProbeTimeout {
            path: path.to_path_buf(),
            seconds: deadline.as_secs(),
        })??;

    Ok(output)
}

impl DurationProbe for FfprobeDuration {
    async fn duration_secs(&self, path: &Path) -> AudioResult<f64> {
        let mut command = Command::new("ffprobe");
        command
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path);

        let output = run_with_deadline(command, self.timeout, path).await?;

        if !output.status.success() {
            return Err(AudioError::ProbeFailed(path.to_path_buf()));
        }

        let document: FfprobeDocument = serde_json::from_slice(&output.stdout)?;

        document
            .format
            .duration
            .parse::<f64>()
            .map_err(|_| AudioError::InvalidProbeOutput(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_cancels_a_hung_probe() {
        let mut command = Command::new("sleep");
        command.arg("30");

        let result =
            run_with_deadline(command, Duration::from_millis(50), Path::new("slow.flac")).await;

        match result {
            Err(AudioError::ProbeTimeout { path, .. }) => {
                assert_eq!(path, Path::new("slow.flac"))
            }
            other => panic!("expected ProbeTimeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fast_commands_finish_under_the_deadline() {
        let mut command = Command::new("echo");
        command.arg("done");

        let output = run_with_deadline(command, Duration::from_secs(5), Path::new("fast.flac"))
            .await
            .unwrap();

        assert!(output.status.success());
    }
}
