// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use actionkit_cli::commands;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "actionkit")]
#[command(author = "Maravilla Labs")]
#[command(version)]
#[command(about = "Action gateway server and headless action client", long_about = None)]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Path to the configuration file (default: actionkit.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the action gateway and the demo page
    Serve {
        /// Port to run the server on
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
    /// Print a fresh application key
    Keygen,
    /// Activate a demo action on a running server
    Exec {
        /// Name of the demo action
        action: String,
        /// Base URL of the server
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server: String,
        /// Modal form field, repeatable: name=value
        #[arg(short, long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,
        /// Record ids to select for bulk actions
        #[arg(long = "select", value_name = "ID")]
        selected: Vec<String>,
        /// Answer confirmations with yes
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with the specified log level
    let filter = EnvFilter::try_new(&cli.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Serve { port, host } => {
            commands::serve::run(cli.config.as_deref(), host, port).await
        }
        Commands::Keygen => commands::keygen::run(),
        Commands::Exec {
            action,
            server,
            fields,
            selected,
            yes,
        } => {
            let options = commands::exec::ExecOptions {
                server,
                action,
                fields,
                selected,
                assume_yes: yes,
            };
            commands::exec::run(options).await
        }
    }
}
