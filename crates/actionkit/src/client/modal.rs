// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Modal markup and the open-modal slot.

use super::config::ModalConfig;
use crate::html::{attr, bool_attr, escape};
use crate::schema::{collect_form_data, render_form, SchemaField};
use serde_json::{Map, Value as JsonValue};
use tokio::sync::oneshot;

/// Attribute marking controls that dismiss the modal (backdrop, close, cancel).
pub const CLOSE_ATTR: &str = "data-modal-close";

/// Attribute marking the submit control.
pub const SUBMIT_ATTR: &str = "data-modal-submit";

/// Renders the full modal markup.
///
/// The form body is the pre-rendered markup when supplied, otherwise the
/// schema rendered with its defaults.
pub fn render_modal(config: &ModalConfig) -> String {
    let body = match &config.schema_html {
        Some(html) => html.clone(),
        None => render_form(&config.schema, &config.schema_defaults, &config.id),
    };

    let class = if config.slide_over {
        "ak-modal ak-modal-slide-over"
    } else {
        "ak-modal"
    };
    let width = config
        .width
        .as_deref()
        .map(|w| attr("data-width", w))
        .unwrap_or_default();
    let icon = config
        .icon
        .as_deref()
        .map(|i| format!("<span class=\"ak-modal-icon\"{}></span>", attr("data-icon", i)))
        .unwrap_or_default();
    let description = config
        .description
        .as_deref()
        .map(|d| format!("<p class=\"ak-modal-description\">{}</p>", escape(d)))
        .unwrap_or_default();
    let heading_id = format!("{}-heading", config.id);

    format!(
        concat!(
            "<div{id}{class} role=\"dialog\" aria-modal=\"true\"{labelled}{width} hidden>",
            "<div class=\"ak-modal-backdrop\" {close}></div>",
            "<div class=\"ak-modal-panel\">",
            "<header class=\"ak-modal-header\">{icon}<h2{heading_id} class=\"ak-modal-heading\">{heading}</h2>{description}",
            "<button type=\"button\" class=\"ak-modal-close\" {close} aria-label=\"Close\">&times;</button></header>",
            "<form class=\"ak-modal-form\"{form_id}>",
            "<div class=\"ak-modal-body\">{body}</div>",
            "<footer class=\"ak-modal-footer\">",
            "<button type=\"button\" class=\"ak-button ak-button-gray\" {close}>{cancel}</button>",
            "<button type=\"submit\"{submit_class} {submit}>{submit_label}</button>",
            "</footer></form></div></div>"
        ),
        id = attr("id", &config.id),
        class = attr("class", class),
        labelled = attr("aria-labelledby", &heading_id),
        width = width,
        close = CLOSE_ATTR,
        icon = icon,
        heading_id = attr("id", &heading_id),
        heading = escape(&config.heading),
        description = description,
        form_id = attr("id", &format!("{}-form", config.id)),
        body = body,
        cancel = escape(&config.cancel_label),
        submit_class = attr("class", &format!("ak-button ak-button-{}", config.color)),
        submit = SUBMIT_ATTR,
        submit_label = escape(&config.submit_label),
    )
}

/// Resolves with the submitted data, or `None` when the modal is dismissed.
pub(crate) type ModalReceiver = oneshot::Receiver<Option<Map<String, JsonValue>>>;

/// The single open modal of a controller.
pub(crate) struct ModalSession {
    pub(crate) id: String,
    fields: Vec<SchemaField>,
    resolve: Option<oneshot::Sender<Option<Map<String, JsonValue>>>>,
}

impl ModalSession {
    pub(crate) fn new(
        id: String,
        fields: Vec<SchemaField>,
    ) -> (Self, ModalReceiver) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                id,
                fields,
                resolve: Some(tx),
            },
            rx,
        )
    }

    /// Returns true until the modal has been resolved.
    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.resolve.is_some()
    }

    /// Resolves with the submitted form data, backfilling booleans.
    pub(crate) fn submit(&mut self, pairs: &[(String, String)]) -> bool {
        let data = collect_form_data(&self.fields, pairs);
        self.resolve_with(Some(data))
    }

    /// Resolves as dismissed.
    pub(crate) fn dismiss(&mut self) -> bool {
        self.resolve_with(None)
    }

    fn resolve_with(&mut self, value: Option<Map<String, JsonValue>>) -> bool {
        match self.resolve.take() {
            // A dropped receiver still counts as resolved.
            Some(tx) => {
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }
}
