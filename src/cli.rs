use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ConverterArgs, ServeArgs};

#[derive(Parser)]
#[command(name = "docsplit")]
#[command(about = "Convert word-processing documents to PDF and split them by page range")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP upload/split service
    Serve(ServeArgs),

    /// Run as MCP server over stdin/stdout
    Mcp {
        #[command(flatten)]
        converter: ConverterArgs,
    },

    /// Convert a .docx/.doc document to PDF
    Convert {
        /// Document to convert
        input: PathBuf,

        /// Output PDF
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        converter: ConverterArgs,
    },

    /// Split a PDF into named files by page range
    Split {
        /// PDF file to split
        path: PathBuf,

        /// Output file and inclusive pages, e.g. "intro=1-3" or "rest=4-end"
        #[arg(short, long = "split", required = true)]
        splits: Vec<String>,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Show page count and producer
    Info {
        /// PDF file to inspect
        path: PathBuf,
    },
}
