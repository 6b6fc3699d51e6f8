// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Headless client command.
//!
//! Fetches a demo button's declarative attributes from a running server and
//! activates it through [`ActionController`], exactly as a page would:
//! confirmation, modal submission with the `--field` values, execution and
//! reconciliation.

use std::sync::Arc;
use std::time::Duration;

use actionkit::client::{ElementRef, ModalConfig};
use actionkit::{ActionController, ActivationOutcome, Attributes};
use anyhow::{bail, Context};
use console::style;
use serde_json::Value as JsonValue;

use crate::terminal::{terminal_host, ReqwestTransport, TerminalDocument};

/// How long to wait for a declared modal to open before giving up.
const MODAL_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Options of the `exec` command.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    /// Base URL of the server.
    pub server: String,
    /// Demo action name.
    pub action: String,
    /// `name=value` modal fields.
    pub fields: Vec<String>,
    /// Selected record ids for bulk actions.
    pub selected: Vec<String>,
    /// Answer confirmations with yes.
    pub assume_yes: bool,
}

/// Runs the command.
pub async fn run(options: ExecOptions) -> anyhow::Result<()> {
    let pairs = parse_fields(&options.fields)?;
    let selected = options.selected.iter().map(String::as_str).map(parse_record_id).collect();

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .build()?;
    let base = options.server.trim_end_matches('/').to_string();

    let url = format!("{}/_actions/demo/{}", base, options.action);
    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Could not reach {}", base))?;
    if !response.status().is_success() {
        bail!("Unknown demo action '{}' ({})", options.action, response.status());
    }
    let attributes: Attributes = response.json().await?;

    let document = Arc::new(TerminalDocument::new(selected, options.assume_yes));
    let host = terminal_host(ReqwestTransport::new(client, base), document);
    let controller = ActionController::new(host).with_modal_exit_delay(Duration::ZERO);
    let element = ElementRef::new(options.action.clone(), attributes);

    let has_modal = ModalConfig::is_declared(&element.attributes);
    let submit = async {
        if !has_modal {
            return true;
        }
        let deadline = tokio::time::Instant::now() + MODAL_OPEN_TIMEOUT;
        while tokio::time::Instant::now() < deadline {
            if controller.submit_modal(&pairs) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    };

    let (outcome, submitted) = tokio::join!(controller.handle_activation(&element), submit);
    if !submitted {
        bail!("The action form never opened");
    }

    report(&outcome);
    match outcome {
        ActivationOutcome::Executed(result) if !result.success => {
            bail!("Action '{}' failed", options.action)
        }
        _ => Ok(()),
    }
}

/// Parses `name=value` pairs.
pub fn parse_fields(fields: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    fields
        .iter()
        .map(|field| match field.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => bail!("Invalid field '{}': expected NAME=VALUE", field),
        })
        .collect()
}

/// Numeric ids become numbers, anything else stays a string.
fn parse_record_id(id: &str) -> JsonValue {
    id.trim()
        .parse::<u64>()
        .map(JsonValue::from)
        .unwrap_or_else(|_| JsonValue::String(id.to_string()))
}

fn report(outcome: &ActivationOutcome) {
    match outcome {
        ActivationOutcome::Executed(result) => {
            if let Some(data) = &result.data {
                println!("{} {}", style("Data:").dim(), data);
            }
        }
        ActivationOutcome::Copied(true) => {}
        ActivationOutcome::Copied(false) => println!("{}", style("Nothing was copied").red()),
        ActivationOutcome::Printed(_) => {}
        ActivationOutcome::Cancelled => println!("{}", style("Cancelled").dim()),
        ActivationOutcome::Declined => println!("{}", style("Not confirmed").dim()),
        ActivationOutcome::Ignored => println!("{}", style("Ignored").dim()),
        ActivationOutcome::Rejected(reason) => {
            println!("{} {:?}", style("Rejected:").red(), reason)
        }
    }
}
