use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use super::{remove_if_present, run_command, ConversionStrategy, ConverterConfig};

/// Install locations checked before falling back to `soffice` on `PATH`
const SOFFICE_CANDIDATES: &[&str] = &[
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    "/usr/local/bin/soffice",
    "/usr/bin/soffice",
    "/opt/libreoffice/program/soffice",
    "/snap/bin/libreoffice",
    r"C:\Program Files\LibreOffice\program\soffice.exe",
];

const SOFFICE_COMMAND: &str = "soffice";

/// LibreOffice (or any `soffice`-compatible suite) in headless mode.
pub struct HeadlessOffice {
    program: PathBuf,
    timeout: Duration,
}

impl HeadlessOffice {
    pub fn new(config: &ConverterConfig) -> Self {
        let program = config.soffice.clone().unwrap_or_else(locate_soffice);
        debug!(program = %program.display(), "office suite");
        HeadlessOffice {
            program,
            timeout: config.timeout,
        }
    }
}

pub fn locate_soffice() -> PathBuf {
    locate_in(SOFFICE_CANDIDATES)
}

fn locate_in(candidates: &[&str]) -> PathBuf {
    candidates
        .iter()
        .map(Path::new)
        .find(|path| path.is_file())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(SOFFICE_COMMAND))
}

/// The file `soffice --convert-to pdf` writes for `input`: same stem, `.pdf`, in `out_dir`.
fn generated_path(input: &Path, out_dir: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .with_context(|| format!("Input has no file name: {}", input.display()))?;
    let mut name = OsString::from(stem);
    name.push(".pdf");
    Ok(out_dir.join(name))
}

#[async_trait]
impl ConversionStrategy for HeadlessOffice {
    fn name(&self) -> &'static str {
        "headless-office"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let out_dir = match output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let generated = generated_path(input, out_dir)?;
        let result = self.run(input, output, out_dir, &generated).await;
        if result.is_err() && generated != input {
            remove_if_present(&generated).await;
        }
        result
    }
}

impl HeadlessOffice {
    async fn run(
        &self,
        input: &Path,
        output: &Path,
        out_dir: &Path,
        generated: &Path,
    ) -> Result<()> {
        let result = run_command(
            Command::new(&self.program)
                .arg("--headless")
                .arg("--convert-to")
                .arg("pdf")
                .arg("--outdir")
                .arg(out_dir)
                .arg(input),
            self.timeout,
        )
        .await?;

        if !generated.exists() {
            anyhow::bail!(
                "{} produced no {} ({}): {}",
                self.program.display(),
                generated.display(),
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            );
        }

        if generated != output {
            tokio::fs::rename(generated, output).await.with_context(|| {
                format!(
                    "Failed to move {} to {}",
                    generated.display(),
                    output.display()
                )
            })?;
        }
        Ok(())
    }
}
