use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};

use crate::core::model::OcrAttemptConfig;
use crate::ocr::{OcrEngine, OcrError};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Runs the `tesseract` binary once per attempt.
///
/// Input, output and stderr all go through a scratch directory so the child
/// never blocks on a full pipe while we wait on the deadline.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    tessdata: Option<PathBuf>,
    timeout: Duration,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractCli {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            tessdata: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_binary(mut self, binary: PathBuf) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_tessdata(mut self, tessdata: Option<PathBuf>) -> Self {
        self.tessdata = tessdata;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(dir) = &self.tessdata {
            cmd.env("TESSDATA_PREFIX", dir);
        }
        cmd
    }

    /// Language packs reported by `tesseract --list-langs`.
    pub fn available_languages(&self) -> Result<Vec<String>> {
        let output = self
            .command()
            .arg("--list-langs")
            .output()
            .with_context(|| format!("failed to run {} --list-langs", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tesseract --list-langs failed: {}", stderr.trim());
        }

        // first line is a "List of available languages" header
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn spawn(
        &self,
        input: &Path,
        out_base: &Path,
        stderr: File,
        config: &OcrAttemptConfig,
    ) -> Result<Child, OcrError> {
        self.command()
            .arg(input)
            .arg(out_base)
            .arg("-l")
            .arg(&config.language)
            .arg("--oem")
            .arg(config.oem.to_string())
            .arg("--psm")
            .arg(config.psm.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(|source| OcrError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(
        &self,
        image: &DynamicImage,
        config: &OcrAttemptConfig,
    ) -> Result<String, OcrError> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("input.png");
        let out_base = scratch.path().join("output");
        let stderr_path = scratch.path().join("stderr.log");

        image.save_with_format(&input, ImageFormat::Png)?;
        let stderr = File::create(&stderr_path)?;

        let mut child = self.spawn(&input, &out_base, stderr, config)?;
        let status = wait_with_deadline(&mut child, self.timeout)?;

        if !status.success() {
            let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
            return Err(OcrError::Failed {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        // tesseract appends .txt to the output base
        Ok(fs::read_to_string(out_base.with_extension("txt"))?)
    }
}

/// Waits for `child` until `timeout`. On every error path the child is
/// killed and reaped before returning.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, OcrError> {
    wait_with_deadline_using(child, timeout, Child::try_wait)
}

fn wait_with_deadline_using<F>(
    child: &mut Child,
    timeout: Duration,
    mut poll: F,
) -> Result<ExitStatus, OcrError>
where
    F: FnMut(&mut Child) -> io::Result<Option<ExitStatus>>,
{
    let started = Instant::now();
    loop {
        match poll(child) {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(err) => {
                reap(child);
                return Err(OcrError::Io(err));
            }
        }
        if started.elapsed() >= timeout {
            reap(child);
            return Err(OcrError::Timeout {
                secs: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let engine = TesseractCli::new().with_binary(PathBuf::from("/nonexistent/tesseract-bin"));
        let image = DynamicImage::new_luma8(4, 4);
        let err = engine
            .recognize(&image, &OcrAttemptConfig::new("jpn", 6))
            .unwrap_err();
        assert!(matches!(err, OcrError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn slow_child_is_killed_at_deadline() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let started = Instant::now();
        let err = wait_with_deadline(&mut child, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, OcrError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn failed_poll_still_reaps_child() {
        let mut child = Command::new("sleep").arg("5").spawn().unwrap();
        let started = Instant::now();
        let err = wait_with_deadline_using(&mut child, Duration::from_secs(30), |_| {
            Err(io::Error::other("poll failed"))
        })
        .unwrap_err();
        assert!(matches!(err, OcrError::Io(_)));
        // reaped: the exit status is already known
        assert!(child.try_wait().unwrap().is_some());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    #[ignore] // needs a local tesseract install
    fn lists_installed_languages() {
        let langs = TesseractCli::new().available_languages().unwrap();
        assert!(!langs.is_empty());
    }
}
