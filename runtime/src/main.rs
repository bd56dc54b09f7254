// Copyright 2026 Sift Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use sift_runtime::cli;

#[derive(Parser)]
#[command(
    name = "sift",
    about = "Sift: fetch a page, render it if needed and extract structured sections",
    version,
    after_help = "Run 'sift <command> --help' for details on each command."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one URL and print the result as JSON
    Scrape {
        /// Absolute URL to scrape
        url: String,
        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
        /// Never launch a browser
        #[arg(long)]
        no_render: bool,
    },
    /// Serve the REST API
    Serve {
        /// Interface to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,
        /// Never launch a browser
        #[arg(long)]
        no_render: bool,
    },
    /// Check environment and diagnose issues
    Doctor,
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "sift_runtime=debug" } else { "sift_runtime=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Scrape {
            url,
            compact,
            no_render,
        } => cli::scrape_cmd::run(&url, compact, no_render).await,
        Commands::Serve {
            host,
            port,
            no_render,
        } => cli::serve_cmd::run(&host, port, no_render).await,
        Commands::Doctor => cli::doctor::run().await,
    };

    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
