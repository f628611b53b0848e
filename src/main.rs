//! gridfill - Main Entry Point
//!
//! Fills gaps in gridded measurement tables from neighboring cells.

use clap::Parser;
use gridfill::cli::{cmd_clean, cmd_config, cmd_fill, cmd_info, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridfill=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fill(args) => {
            cmd_fill(&args)?;
        }
        Commands::Info { data, rows, cols, id_column } => {
            cmd_info(&data, rows, cols, &id_column)?;
        }
        Commands::Clean(args) => {
            cmd_clean(&args)?;
        }
        Commands::Config { output } => {
            cmd_config(output.as_deref())?;
        }
    }

    Ok(())
}
