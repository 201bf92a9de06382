use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use super::{absolute, run_command, ConversionStrategy};

/// Word's `wdFormatPDF` value for `Document.SaveAs`
const WD_FORMAT_PDF: u32 = 17;

/// Drives an installed Microsoft Word: AppleScript on macOS, COM through PowerShell on Windows.
pub struct WordAutomation {
    timeout: Duration,
}

impl WordAutomation {
    pub fn new(timeout: Duration) -> Self {
        WordAutomation { timeout }
    }
}

fn applescript_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn powershell_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn applescript(input: &Path, output: &Path) -> String {
    format!(
        "tell application \"Microsoft Word\"\n\
         \topen POSIX file {input}\n\
         \tset theDoc to active document\n\
         \tsave as theDoc file name {output} file format format PDF\n\
         \tclose theDoc saving no\n\
         end tell",
        input = applescript_string(&input.to_string_lossy()),
        output = applescript_string(&output.to_string_lossy()),
    )
}

fn powershell_script(input: &Path, output: &Path) -> String {
    format!(
        "$word = New-Object -ComObject Word.Application; \
         $word.Visible = $false; \
         try {{ \
         $doc = $word.Documents.Open({input}, $false, $true); \
         $doc.SaveAs([ref] {output}, [ref] {format}); \
         $doc.Close($false) \
         }} finally {{ $word.Quit() }}",
        input = powershell_string(&input.to_string_lossy()),
        output = powershell_string(&output.to_string_lossy()),
        format = WD_FORMAT_PDF,
    )
}

#[async_trait]
impl ConversionStrategy for WordAutomation {
    fn name(&self) -> &'static str {
        "desktop-automation"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        let input = absolute(input)?;
        let output = absolute(output)?;

        let mut command = match std::env::consts::OS {
            "macos" => {
                let mut command = Command::new("osascript");
                command.arg("-e").arg(applescript(&input, &output));
                command
            }
            "windows" => {
                let mut command = Command::new("powershell");
                command
                    .arg("-NoProfile")
                    .arg("-NonInteractive")
                    .arg("-Command")
                    .arg(powershell_script(&input, &output));
                command
            }
            other => anyhow::bail!("Desktop automation is not available on {}", other),
        };

        let result = run_command(&mut command, self.timeout).await?;
        if !result.status.success() {
            anyhow::bail!(
                "Word automation failed ({}): {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            );
        }
        Ok(())
    }
}
