// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Demo actions served on the index page.
//!
//! Each request builds fresh [`Action`]s, so every page view issues new
//! one-time tokens for the visitor's session.

use std::sync::{Arc, Mutex, MutexGuard};

use actionkit::action::{CopyFormat, CopyOptions, PrintOptions};
use actionkit::html::{attr, document, escape};
use actionkit::{Action, ActionOutcome, DeleteBulkAction, Notification, SchemaField, SessionScope};
use serde_json::{json, Value as JsonValue};

/// Names of the demo actions, in page order.
pub const ACTION_NAMES: &[&str] = &[
    "greet",
    "archive",
    "open_docs",
    "explode",
    DeleteBulkAction::NAME,
    "copy_config",
    "print_page",
];

const PAGE_CSS: &str = "body { font-family: sans-serif; margin: 2rem; } \
    .ak-button { margin: 0 .5rem .5rem 0; } \
    table { border-collapse: collapse; margin-top: 1rem; } \
    td, th { border: 1px solid #ccc; padding: .25rem .75rem; }";

/// A row the bulk delete action operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoRecord {
    /// Record id.
    pub id: u64,
    /// Display title.
    pub title: String,
}

/// The demo action set and its record table.
#[derive(Debug, Clone)]
pub struct DemoActions {
    records: Arc<Mutex<Vec<DemoRecord>>>,
}

impl Default for DemoActions {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoActions {
    /// Creates the demo with a few sample records.
    pub fn new() -> Self {
        let records = (1..=5)
            .map(|id| DemoRecord {
                id,
                title: format!("Post #{}", id),
            })
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    /// Returns a snapshot of the records.
    pub fn records(&self) -> Vec<DemoRecord> {
        lock(&self.records).clone()
    }

    /// Builds a demo action by name.
    pub fn find(&self, name: &str) -> Option<Action> {
        let action = match name {
            "greet" => Action::new("greet")
                .label("Say hello")
                .icon("hand")
                .handler(|_| Ok(ActionOutcome::message("Hello from ActionKit!"))),

            "archive" => Action::new("archive")
                .label("Archive post")
                .color("warning")
                .record(json!(1))
                .modal_heading("Archive post")
                .modal_description("The post is hidden from readers.")
                .modal_submit_label("Archive")
                .schema(vec![
                    SchemaField::textarea("reason")
                        .label("Reason")
                        .placeholder("Why is this post archived?")
                        .required(),
                    SchemaField::checkbox("notify").label("Notify the author"),
                ])
                .handler(|input| {
                    let reason = input.str_field("reason").unwrap_or("").trim().to_string();
                    if reason.is_empty() {
                        return Ok(ActionOutcome::payload(json!({
                            "success": false,
                            "message": "A reason is required",
                        })));
                    }
                    let mut notifications = vec![Notification::success("Post archived").body(reason)];
                    if input.bool_field("notify") {
                        notifications.push(Notification::info("The author was notified"));
                    }
                    Ok(ActionOutcome::payload(json!({
                        "notifications": notifications,
                        "data": { "record": input.record },
                    })))
                }),

            "open_docs" => Action::new("open_docs")
                .label("Open docs")
                .color("gray")
                .preserve_scroll()
                .handler(|_| Ok(ActionOutcome::redirect("/?docs=1"))),

            "explode" => Action::new("explode")
                .label("Fail on purpose")
                .color("danger")
                .requires_confirmation()
                .modal_heading("Run a failing action?")
                .handler(|_| Err("database connection refused".into())),

            DeleteBulkAction::NAME => {
                let records = self.records.clone();
                DeleteBulkAction::make(move |ids: &[JsonValue]| {
                    let ids: Vec<u64> = ids.iter().filter_map(record_id).collect();
                    let mut records = lock(&records);
                    let before = records.len();
                    records.retain(|record| !ids.contains(&record.id));
                    Ok::<usize, std::convert::Infallible>(before - records.len())
                })
            }

            "copy_config" => Action::new("copy_config")
                .label("Copy config")
                .color("gray")
                .copy(
                    CopyOptions::value(r#"{"endpoint":"/_actions/execute","ttl":7200}"#)
                        .copy_as(CopyFormat::Json)
                        .message("Config copied"),
                ),

            "print_page" => Action::new("print_page")
                .label("Print")
                .color("gray")
                .print(PrintOptions::element("#records").title("Records")),

            _ => return None,
        };
        Some(action)
    }

    /// Builds every demo action.
    pub fn all(&self) -> Vec<Action> {
        ACTION_NAMES.iter().filter_map(|name| self.find(name)).collect()
    }

    /// Renders the demo page for a session.
    pub fn render_page(&self, scope: &SessionScope) -> actionkit::Result<String> {
        let mut buttons = String::new();
        for action in self.all() {
            buttons.push_str(&action.render_button(scope)?);
            buttons.push('\n');
        }

        let rows: String = self
            .records()
            .iter()
            .map(|record| {
                format!(
                    "<tr{}><td><input type=\"checkbox\" class=\"ak-select\"{}></td><td>{}</td><td>{}</td></tr>\n",
                    attr("data-record", &record.id.to_string()),
                    attr("value", &record.id.to_string()),
                    record.id,
                    escape(&record.title),
                )
            })
            .collect();

        let body = format!(
            "<h1>ActionKit demo</h1>\n<div class=\"ak-actions\">\n{}</div>\n\
             <table id=\"records\"><thead><tr><th></th><th>Id</th><th>Title</th></tr></thead>\n\
             <tbody>\n{}</tbody></table>",
            buttons, rows
        );
        Ok(document("ActionKit demo", Some(PAGE_CSS), &body))
    }
}

fn record_id(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
