// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Gateway server command.
//!
//! Serves the execution endpoint, the demo page and the demo attribute
//! endpoint used by `actionkit exec`.

use std::path::Path;
use std::sync::Arc;

use console::style;

use crate::config::Config;
use crate::server::http::{create_router, spawn_purge_task, AppState};

/// Runs the gateway server. Flags override the configuration file.
pub async fn run(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::load(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = Arc::new(AppState::new(config)?);

    println!("{}", style("Starting action gateway...").cyan().bold());
    if state.ephemeral_key {
        println!(
            "{} no application key configured; using an ephemeral key. Run {} to create one.",
            style("Warning:").yellow().bold(),
            style("actionkit keygen").cyan()
        );
        tracing::warn!("Using an ephemeral application key");
    }
    if state.config.app.debug {
        println!(
            "{}",
            style("Debug mode: handler error messages are sent to clients").yellow()
        );
    }

    spawn_purge_task(state.clone());

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let endpoint = state.config.actions.endpoint.clone();
    let app = create_router(state);

    println!();
    println!(
        "{} {}",
        style("Gateway running at").green().bold(),
        style(format!("http://{}", addr)).cyan().underlined()
    );
    println!("{} {}", style("Execution endpoint:").dim(), endpoint);
    println!("{}", style("Press Ctrl+C to stop").dim());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
