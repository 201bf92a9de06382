use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_router,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::convert::{Converter, ConverterConfig};
use crate::pdf::splitter::{split, SplitReport, SplitRequest};
use crate::pdf::PdfDocument;

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the PDF file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SplitEntry {
    #[schemars(description = "Output file name; '.pdf' is appended when missing")]
    pub filename: String,
    #[schemars(description = "First page to include (1-indexed)")]
    pub start_page: i64,
    #[schemars(description = "Last page to include (inclusive)")]
    pub end_page: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PdfSplitRequest {
    #[schemars(description = "Path to the source PDF file")]
    pub path: String,
    #[schemars(description = "Files to create, each with an inclusive page range")]
    pub splits: Vec<SplitEntry>,
    #[schemars(description = "Existing directory to write the files into")]
    pub output_dir: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertRequest {
    #[schemars(description = "Path to the .docx or .doc document")]
    pub input: String,
    #[schemars(description = "Path of the PDF to write")]
    pub output: String,
}

#[derive(Debug, Clone)]
pub struct PdfServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
    converter: Arc<Converter>,
}

impl PdfServer {
    pub fn new(converter: Converter) -> Self {
        Self {
            tool_router: Self::tool_router(),
            converter: Arc::new(converter),
        }
    }
}

#[tool_router]
impl PdfServer {
    #[tool(description = "Count the pages of a PDF")]
    fn pdf_page_count(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        match PdfDocument::open(&path) {
            Ok(doc) => {
                let result = PageCountResult {
                    page_count: doc.page_count(),
                    path,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }

    #[tool(description = "Split a PDF into named files, one per inclusive 1-indexed page range. Invalid ranges are reported per file; the others are still written.")]
    fn pdf_split(&self, Parameters(req): Parameters<PdfSplitRequest>) -> String {
        let output_dir = Path::new(&req.output_dir);
        if !output_dir.is_dir() {
            return "Error: Output folder does not exist".to_string();
        }
        if req.splits.is_empty() {
            return "Error: No split configurations provided".to_string();
        }

        let requests: Vec<SplitRequest> = req
            .splits
            .into_iter()
            .map(|s| SplitRequest::new(s.filename, s.start_page, s.end_page))
            .collect();
        let report = SplitReport::new(
            split(Path::new(&req.path), &requests, output_dir),
            requests.len(),
        );
        serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("Error: {}", e))
    }

    #[tool(description = "Convert a .docx or .doc document to PDF with the locally installed converters and report the page count")]
    async fn convert_document(&self, Parameters(req): Parameters<ConvertRequest>) -> String {
        let output = Path::new(&req.output);
        if let Err(e) = self.converter.convert(Path::new(&req.input), output).await {
            return format!("Error: {}", e);
        }
        match PdfDocument::open(output) {
            Ok(doc) => {
                let result = PageCountResult {
                    page_count: doc.page_count(),
                    path: req.output,
                };
                serde_json::to_string_pretty(&result).unwrap_or_else(|e| format!("Error: {}", e))
            }
            Err(e) => format!("Error: {:#}", e),
        }
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageCountResult {
    pub path: String,
    pub page_count: u32,
}

impl ServerHandler for PdfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Document conversion and PDF splitting tools. Use convert_document to turn a \
                 Word document into a PDF, pdf_page_count to inspect a PDF, and pdf_split to \
                 write page ranges of a PDF to separate files."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(config: &ConverterConfig) -> Result<()> {
    let server = PdfServer::new(Converter::with_defaults(config));

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}
