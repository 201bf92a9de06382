//! Word-processing document to PDF conversion.
//!
//! Conversion is delegated to external programs. A [`Converter`] holds an ordered list
//! of [`ConversionStrategy`] values and tries each until one leaves a file at the
//! requested output path; that file's existence is the only success signal.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

pub mod office;
pub mod textutil;
pub mod word;

pub use office::HeadlessOffice;
pub use textutil::TextUtil;
pub use word::WordAutomation;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Upper bound for a single external conversion call
    pub timeout: Duration,
    /// Explicit office suite binary; probed from known install paths when unset
    pub soffice: Option<PathBuf>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            timeout: DEFAULT_TIMEOUT,
            soffice: None,
        }
    }
}

#[async_trait]
pub trait ConversionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Try to write `output` from `input`.
    ///
    /// `Ok(())` alone does not mean success; see [`ConversionStrategy::attempt`].
    async fn convert(&self, input: &Path, output: &Path) -> Result<()>;

    /// Run the strategy and report whether `output` now exists.
    ///
    /// A strategy that errors has anything it left at `output` removed.
    async fn attempt(&self, input: &Path, output: &Path) -> bool {
        match self.convert(input, output).await {
            Ok(()) if output.exists() => true,
            Ok(()) => {
                warn!(
                    strategy = self.name(),
                    "finished without producing {}",
                    output.display()
                );
                false
            }
            Err(e) => {
                warn!(strategy = self.name(), "conversion failed: {:#}", e);
                remove_if_present(output).await;
                false
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("All conversion methods failed for {}. Please install LibreOffice or Microsoft Word.", .0.display())]
    AllStrategiesFailed(PathBuf),

    #[error("Failed to clear previous output {}: {source}", .path.display())]
    StaleOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub struct Converter {
    strategies: Vec<Box<dyn ConversionStrategy>>,
}

impl Converter {
    pub fn new(strategies: Vec<Box<dyn ConversionStrategy>>) -> Self {
        Converter { strategies }
    }

    /// Headless office suite, then desktop automation, then `textutil`.
    pub fn with_defaults(config: &ConverterConfig) -> Self {
        Converter::new(vec![
            Box::new(HeadlessOffice::new(config)),
            Box::new(WordAutomation::new(config.timeout)),
            Box::new(TextUtil::new(config.timeout)),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        match tokio::fs::remove_file(output).await {
            Ok(()) => debug!("removed stale {}", output.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ConvertError::StaleOutput {
                    path: output.to_path_buf(),
                    source,
                })
            }
        }

        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), input = %input.display(), "trying");
            if strategy.attempt(input, output).await {
                info!(
                    strategy = strategy.name(),
                    "converted {} to {}",
                    input.display(),
                    output.display()
                );
                return Ok(());
            }
        }

        error!(input = %input.display(), "all conversion strategies failed");
        Err(ConvertError::AllStrategiesFailed(input.to_path_buf()))
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

/// Run an external program, killing it if it outlives `timeout`.
///
/// A non-zero exit status is not an error here; strategies judge success by their output.
pub(crate) async fn run_command(command: &mut Command, timeout: Duration) -> Result<Output> {
    command.stdin(Stdio::null()).kill_on_drop(true);
    let program = format!("{:?}", command.as_std().get_program());

    let output = tokio::time::timeout(timeout, command.output())
        .await
        .with_context(|| format!("{} timed out after {}s", program, timeout.as_secs()))?
        .with_context(|| format!("Failed to launch {}", program))?;

    if !output.status.success() {
        debug!(
            %program,
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "non-zero exit"
        );
    }
    Ok(output)
}

pub(crate) async fn remove_if_present(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("failed to remove {}: {}", path.display(), e);
        }
    }
}

/// Absolute form of `path`, for programs that run with a different working directory.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("Failed to read current directory")?
            .join(path))
    }
}

/// Writes a fixture PDF instead of converting anything.
#[cfg(test)]
pub(crate) struct SamplePdfStrategy {
    pub pages: u32,
}

#[cfg(test)]
#[async_trait]
impl ConversionStrategy for SamplePdfStrategy {
    fn name(&self) -> &'static str {
        "sample-pdf"
    }

    async fn convert(&self, _input: &Path, output: &Path) -> Result<()> {
        tokio::fs::write(output, crate::pdf::fixtures::sample_pdf(self.pages)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy)]
    enum Behaviour {
        Fail,
        FailLeavingPartial,
        Silent,
        Write,
    }

    struct Scripted {
        name: &'static str,
        behaviour: Behaviour,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl ConversionStrategy for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn convert(&self, _input: &Path, output: &Path) -> Result<()> {
            self.calls.lock().unwrap().push(self.name);
            match self.behaviour {
                Behaviour::Fail => anyhow::bail!("{} is not installed", self.name),
                Behaviour::FailLeavingPartial => {
                    std::fs::write(output, b"%PDF-1.7 truncated")?;
                    anyhow::bail!("{} crashed", self.name)
                }
                Behaviour::Silent => Ok(()),
                Behaviour::Write => {
                    std::fs::write(output, crate::pdf::fixtures::sample_pdf(2))?;
                    Ok(())
                }
            }
        }
    }

    fn scripted(plan: &[(&'static str, Behaviour)]) -> (Converter, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let strategies = plan
            .iter()
            .map(|&(name, behaviour)| {
                Box::new(Scripted {
                    name,
                    behaviour,
                    calls: Arc::clone(&calls),
                }) as Box<dyn ConversionStrategy>
            })
            .collect();
        (Converter::new(strategies), calls)
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let dir = tempfile::tempdir().unwrap();
        let (converter, calls) = scripted(&[
            ("first", Behaviour::Fail),
            ("second", Behaviour::Write),
            ("third", Behaviour::Write),
        ]);
        let output = dir.path().join("out.pdf");

        converter.convert(&dir.path().join("in.docx"), &output).await.unwrap();

        assert!(output.exists());
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_ok_without_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (converter, calls) =
            scripted(&[("silent", Behaviour::Silent), ("writer", Behaviour::Write)]);
        let output = dir.path().join("out.pdf");

        converter.convert(&dir.path().join("in.docx"), &output).await.unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["silent", "writer"]);
    }

    #[tokio::test]
    async fn test_all_fail() {
        let dir = tempfile::tempdir().unwrap();
        let (converter, calls) = scripted(&[
            ("a", Behaviour::Fail),
            ("b", Behaviour::FailLeavingPartial),
            ("c", Behaviour::Silent),
        ]);
        let output = dir.path().join("out.pdf");

        let err = converter
            .convert(&dir.path().join("in.docx"), &output)
            .await
            .unwrap_err();

        assert!(matches!(err, ConvertError::AllStrategiesFailed(_)));
        assert_eq!(calls.lock().unwrap().len(), 3);
        assert!(!output.exists(), "partial output must not survive");
    }

    #[tokio::test]
    async fn test_stale_output_is_not_success() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        std::fs::write(&output, crate::pdf::fixtures::sample_pdf(1)).unwrap();

        let (converter, _) = scripted(&[("silent", Behaviour::Silent)]);
        assert!(converter
            .convert(&dir.path().join("in.docx"), &output)
            .await
            .is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_default_order() {
        let converter = Converter::with_defaults(&ConverterConfig::default());
        assert_eq!(
            converter.strategy_names(),
            vec!["headless-office", "desktop-automation", "textutil"]
        );
    }

    #[tokio::test]
    async fn test_run_command_timeout() {
        if cfg!(windows) {
            return;
        }
        let mut command = Command::new("sleep");
        command.arg("5");
        let err = run_command(&mut command, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_run_command_missing_program() {
        let mut command = Command::new("docsplit-no-such-program");
        let err = run_command(&mut command, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to launch"));
    }
}
