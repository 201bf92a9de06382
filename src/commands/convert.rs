use crate::convert::{Converter, ConverterConfig};
use crate::pdf::PdfDocument;
use crate::session::allowed_file;
use anyhow::Result;
use std::path::Path;
use tracing::warn;

pub async fn run(input: &Path, output: &Path, config: &ConverterConfig) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("No such file: {}", input.display());
    }
    if !allowed_file(&input.to_string_lossy()) {
        warn!("{} is not a .docx or .doc file; trying anyway", input.display());
    }

    let converter = Converter::with_defaults(config);
    converter.convert(input, output).await?;

    let pages = PdfDocument::open(output)?.page_count();
    println!(
        "Converted {} to {} ({} pages)",
        input.display(),
        output.display(),
        pages
    );

    Ok(())
}
