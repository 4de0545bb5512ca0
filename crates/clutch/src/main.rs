//! Clutch CLI - static site generator for Prismic-backed sites.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "clutch")]
#[command(about = "Static site generator for Prismic-backed sites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to clutch.toml config file
    #[arg(short, long, default_value = "clutch.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every page of the site to static HTML
    Generate {
        /// Output directory (defaults to config or "static")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of pages rendered at once
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },

    /// Remove the pages a previous generate wrote
    Clean {
        /// Output directory (defaults to config or "static")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview the generated site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to the configured output)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let config = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Generate {
            output,
            concurrency,
        } => {
            commands::generate::run(&config, output, concurrency).await?;
        }
        Commands::Clean { output } => {
            commands::clean::run(&config, output).await?;
        }
        Commands::Serve { port, dir, no_open } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.generate.output));
            commands::serve::run(port, dir, !no_open).await?;
        }
    }

    Ok(())
}
