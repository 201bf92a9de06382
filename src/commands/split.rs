use crate::page_range::SplitSpec;
use crate::pdf::splitter::{split, SplitReport};
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::path::Path;

pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(input: P, specs: &[String], output_dir: Q) -> Result<()> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let total_pages = PdfDocument::open(input)?.page_count();
    let requests = specs
        .iter()
        .map(|spec| SplitSpec::parse(spec).map(|spec| spec.resolve(total_pages)))
        .collect::<Result<Vec<_>>>()?;

    let report = SplitReport::new(split(input, &requests, output_dir), requests.len());

    for result in &report.results {
        let status = if result.is_success() { "ok" } else { "error" };
        println!(
            "{:<6} {}: {}",
            status,
            result.filename().unwrap_or("-"),
            result.message()
        );
    }
    println!("{}", report.message);

    if !report.success {
        anyhow::bail!("No output files were created");
    }
    Ok(())
}
