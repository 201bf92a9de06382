mod cli;
mod commands;
mod config;
mod convert;
mod mcp;
mod page_range;
mod pdf;
mod server;
mod session;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the MCP transport on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("docsplit=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => {
            let config = config::ServerConfig::from_args(&args)?;
            server::run_server(config).await?;
        }
        Commands::Mcp { converter } => {
            mcp::run_server(&converter.to_config()).await?;
        }
        Commands::Convert {
            input,
            output,
            converter,
        } => {
            commands::convert::run(&input, &output, &converter.to_config()).await?;
        }
        Commands::Split {
            path,
            splits,
            output_dir,
        } => {
            commands::split::run(&path, &splits, &output_dir)?;
        }
        Commands::Info { path } => {
            commands::info::run(&path)?;
        }
    }

    Ok(())
}
