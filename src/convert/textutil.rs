use anyhow::Result;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use super::{remove_if_present, run_command, ConversionStrategy};

/// Ceiling for the last-resort strategy, below the general converter timeout
pub const TEXTUTIL_TIMEOUT: Duration = Duration::from_secs(10);

/// macOS `textutil`, the last resort.
///
/// `textutil` can only get as far as HTML, so this strategy never yields a PDF. It runs the
/// conversion for the log trail, removes the HTML it produced and reports failure.
pub struct TextUtil {
    timeout: Duration,
}

impl TextUtil {
    pub fn new(timeout: Duration) -> Self {
        TextUtil {
            timeout: timeout.min(TEXTUTIL_TIMEOUT),
        }
    }
}

fn html_path(input: &Path) -> PathBuf {
    let mut path = OsString::from(input.as_os_str());
    path.push(".html");
    PathBuf::from(path)
}

#[async_trait]
impl ConversionStrategy for TextUtil {
    fn name(&self) -> &'static str {
        "textutil"
    }

    async fn convert(&self, input: &Path, _output: &Path) -> Result<()> {
        if std::env::consts::OS != "macos" {
            anyhow::bail!("textutil is only available on macOS");
        }

        let html = html_path(input);
        let result = run_command(
            Command::new("textutil")
                .arg("-convert")
                .arg("html")
                .arg(input)
                .arg("-output")
                .arg(&html),
            self.timeout,
        )
        .await;
        remove_if_present(&html).await;
        result?;

        anyhow::bail!("textutil produced HTML only; no PDF renderer is available")
    }
}
