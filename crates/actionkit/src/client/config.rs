// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Per-activation configuration parsed from declarative attributes.

use super::host::{ConfirmRequest, NavigateOptions};
use crate::protocol::{attr_flag, attr_str, attrs, Attributes, HttpMethod};
use crate::schema::{validate_schema, SchemaField};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value as JsonValue};

/// Confirmation body used when the element declares none.
pub const DEFAULT_CONFIRM_DESCRIPTION: &str = "Are you sure you would like to do this?";
const DEFAULT_MODAL_ID: &str = "action-modal";

/// Modal text and chrome declared on a button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalText {
    /// Modal id base.
    pub id: Option<String>,
    /// Heading.
    pub heading: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Submit label.
    pub submit_label: Option<String>,
    /// Cancel label.
    pub cancel_label: Option<String>,
    /// Icon.
    pub icon: Option<String>,
    /// Width.
    pub width: Option<String>,
    /// Slide-over layout.
    pub slide_over: bool,
}

/// Execution descriptor of one activation.
///
/// Built once per activation and not changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionConfig {
    /// Action name.
    pub name: String,
    /// Gateway URL.
    pub action_url: Option<String>,
    /// Encrypted token.
    pub action_token: Option<String>,
    /// HTTP method.
    pub method: HttpMethod,
    /// Ask before executing.
    pub requires_confirmation: bool,
    /// Danger styling of the confirmation.
    pub confirm_danger: bool,
    /// Modal text.
    pub modal: ModalText,
    /// Button color.
    pub color: Option<String>,
    /// Keep scroll position on redirect.
    pub preserve_scroll: bool,
    /// Keep component state on redirect.
    pub preserve_state: bool,
    /// Record sent to the handler.
    pub record: Option<JsonValue>,
    /// Bulk action.
    pub bulk: bool,
    /// Clear the selection after a successful bulk execution.
    pub deselect_records_after_completion: bool,
}

impl ActionConfig {
    /// Parses the configuration from button attributes.
    ///
    /// A record that is not valid JSON is kept as a string; an unknown method
    /// falls back to POST.
    pub fn from_attributes(attributes: &Attributes) -> Self {
        let method = match attr_str(attributes, attrs::METHOD) {
            Some(raw) => raw.parse().unwrap_or_else(|err: String| {
                tracing::warn!("{}; using POST", err);
                HttpMethod::Post
            }),
            None => HttpMethod::Post,
        };

        let record = attr_str(attributes, attrs::RECORD).map(|raw| {
            serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
        });

        let text = |name: &str| attr_str(attributes, name).map(str::to_string);

        Self {
            name: attributes.get(attrs::ACTION).cloned().unwrap_or_default(),
            action_url: text(attrs::URL),
            action_token: text(attrs::TOKEN),
            method,
            requires_confirmation: attr_flag(attributes, attrs::REQUIRES_CONFIRMATION),
            confirm_danger: attr_flag(attributes, attrs::CONFIRM_DANGER),
            modal: ModalText {
                id: text(attrs::MODAL_ID),
                heading: text(attrs::MODAL_HEADING),
                description: text(attrs::MODAL_DESCRIPTION),
                submit_label: text(attrs::MODAL_SUBMIT_LABEL),
                cancel_label: text(attrs::MODAL_CANCEL_LABEL),
                icon: text(attrs::MODAL_ICON),
                width: text(attrs::MODAL_WIDTH),
                slide_over: attr_flag(attributes, attrs::MODAL_SLIDE_OVER),
            },
            color: text(attrs::COLOR),
            preserve_scroll: attr_flag(attributes, attrs::PRESERVE_SCROLL),
            preserve_state: attr_flag(attributes, attrs::PRESERVE_STATE),
            record,
            bulk: attr_flag(attributes, attrs::BULK),
            deselect_records_after_completion: attr_flag(attributes, attrs::DESELECT_RECORDS),
        }
    }

    /// Returns true when both URL and token are present.
    pub fn is_executable(&self) -> bool {
        self.action_url.is_some() && self.action_token.is_some()
    }

    /// Returns the navigation options for redirects.
    pub fn navigate_options(&self) -> NavigateOptions {
        NavigateOptions {
            preserve_scroll: self.preserve_scroll,
            preserve_state: self.preserve_state,
        }
    }

    /// Returns the human label derived from the name.
    pub fn title(&self) -> String {
        let words = self.name.replace(['_', '-'], " ");
        let mut chars = words.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "Confirm".to_string(),
        }
    }

    /// Builds the confirmation dialog content.
    pub fn confirm_request(&self) -> ConfirmRequest {
        ConfirmRequest {
            heading: self.modal.heading.clone().unwrap_or_else(|| self.title()),
            description: self
                .modal
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_CONFIRM_DESCRIPTION.to_string()),
            confirm_label: self
                .modal
                .submit_label
                .clone()
                .unwrap_or_else(|| "Confirm".to_string()),
            cancel_label: self
                .modal
                .cancel_label
                .clone()
                .unwrap_or_else(|| "Cancel".to_string()),
            danger: self.confirm_danger,
        }
    }
}

/// Descriptor of one modal lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalConfig {
    /// Unique element id.
    pub id: String,
    /// Heading.
    pub heading: String,
    /// Description.
    pub description: Option<String>,
    /// Submit label.
    pub submit_label: String,
    /// Cancel label.
    pub cancel_label: String,
    /// Header icon.
    pub icon: Option<String>,
    /// Width.
    pub width: Option<String>,
    /// Slide-over layout.
    pub slide_over: bool,
    /// Submit button color.
    pub color: String,
    /// Form fields.
    pub schema: Vec<SchemaField>,
    /// Field defaults.
    pub schema_defaults: Map<String, JsonValue>,
    /// Pre-rendered form markup, used instead of the schema renderer.
    pub schema_html: Option<String>,
    /// Token to execute on submit.
    pub action_token: Option<String>,
    /// URL to execute on submit.
    pub action_url: Option<String>,
    /// Method to execute with.
    pub method: HttpMethod,
}

impl ModalConfig {
    /// Returns true when the attributes declare a form.
    pub fn is_declared(attributes: &Attributes) -> bool {
        attributes.contains_key(attrs::SCHEMA) || attributes.contains_key(attrs::SCHEMA_HTML)
    }

    /// Builds the modal for an activation.
    ///
    /// `sequence` makes the element id unique per instantiation. An invalid
    /// schema is logged and dropped, leaving the pre-rendered markup or an
    /// empty form.
    pub fn from_action(config: &ActionConfig, attributes: &Attributes, sequence: u64) -> Self {
        let base = config.modal.id.as_deref().unwrap_or(DEFAULT_MODAL_ID);
        let id = format!("{}-{}", base, sequence);

        let schema = parse_schema(attributes, &id);
        let schema_defaults = attr_str(attributes, attrs::SCHEMA_DEFAULTS)
            .and_then(|raw| match serde_json::from_str::<JsonValue>(raw) {
                Ok(JsonValue::Object(map)) => Some(map),
                Ok(_) | Err(_) => {
                    tracing::warn!(action = %config.name, "Ignoring malformed schema defaults");
                    None
                }
            })
            .unwrap_or_default();
        let schema_html = attr_str(attributes, attrs::SCHEMA_HTML).and_then(|encoded| {
            let decoded = STANDARD
                .decode(encoded.trim())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());
            if decoded.is_none() {
                tracing::warn!(action = %config.name, "Ignoring undecodable schema markup");
            }
            decoded
        });

        let color = if config.confirm_danger {
            "danger".to_string()
        } else {
            config.color.clone().unwrap_or_else(|| "primary".to_string())
        };

        Self {
            id,
            heading: config.modal.heading.clone().unwrap_or_else(|| config.title()),
            description: config.modal.description.clone(),
            submit_label: config
                .modal
                .submit_label
                .clone()
                .unwrap_or_else(|| "Submit".to_string()),
            cancel_label: config
                .modal
                .cancel_label
                .clone()
                .unwrap_or_else(|| "Cancel".to_string()),
            icon: config.modal.icon.clone(),
            width: config.modal.width.clone(),
            slide_over: config.modal.slide_over,
            color,
            schema,
            schema_defaults,
            schema_html,
            action_token: config.action_token.clone(),
            action_url: config.action_url.clone(),
            method: config.method,
        }
    }
}

fn parse_schema(attributes: &Attributes, id_prefix: &str) -> Vec<SchemaField> {
    let Some(raw) = attr_str(attributes, attrs::SCHEMA) else {
        return Vec::new();
    };
    let fields: Vec<SchemaField> = match serde_json::from_str(raw) {
        Ok(fields) => fields,
        Err(err) => {
            tracing::warn!("Ignoring malformed schema: {}", err);
            return Vec::new();
        }
    };
    match validate_schema(&fields, id_prefix) {
        Ok(()) => fields,
        Err(err) => {
            tracing::warn!("Ignoring invalid schema: {}", err);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_action_config() {
        let config = ActionConfig::from_attributes(&attributes(&[
            (attrs::ACTION, "archive_post"),
            (attrs::URL, "/_actions/execute"),
            (attrs::TOKEN, "tok"),
            (attrs::METHOD, "get"),
            (attrs::REQUIRES_CONFIRMATION, "true"),
            (attrs::PRESERVE_SCROLL, ""),
            (attrs::RECORD, r#"{"id":5}"#),
        ]));

        assert!(config.is_executable());
        assert_eq!(config.method, HttpMethod::Get);
        assert!(config.requires_confirmation);
        assert!(config.preserve_scroll);
        assert!(!config.preserve_state);
        assert_eq!(config.record, Some(json!({ "id": 5 })));
        assert_eq!(config.title(), "Archive post");
    }

    #[test]
    fn test_lenient_values() {
        let config = ActionConfig::from_attributes(&attributes(&[
            (attrs::METHOD, "TRACE"),
            (attrs::RECORD, "not-json"),
            (attrs::TOKEN, "  "),
        ]));

        assert_eq!(config.method, HttpMethod::Post);
        assert_eq!(config.record, Some(json!("not-json")));
        assert!(!config.is_executable());
    }

    #[test]
    fn test_confirm_request_defaults() {
        let config = ActionConfig::from_attributes(&attributes(&[
            (attrs::ACTION, "delete"),
            (attrs::CONFIRM_DANGER, "1"),
        ]));
        let request = config.confirm_request();
        assert_eq!(request.heading, "Delete");
        assert_eq!(request.description, "Are you sure you would like to do this?");
        assert_eq!(request.confirm_label, "Confirm");
        assert!(request.danger);
    }

    #[test]
    fn test_modal_ids_are_unique_per_instance() {
        let attrs_map = attributes(&[(attrs::ACTION, "edit"), (attrs::SCHEMA, "[]")]);
        let config = ActionConfig::from_attributes(&attrs_map);

        let a = ModalConfig::from_action(&config, &attrs_map, 1);
        let b = ModalConfig::from_action(&config, &attrs_map, 2);
        assert_ne!(a.id, b.id);
        assert!(ModalConfig::is_declared(&attrs_map));
    }

    #[test]
    fn test_modal_schema_and_html() {
        let html = STANDARD.encode("<p>Custom</p>");
        let attrs_map = attributes(&[
            (attrs::ACTION, "edit"),
            (attrs::SCHEMA, r#"[{"type":"Checkbox","name":"notify"}]"#),
            (attrs::SCHEMA_DEFAULTS, r#"{"notify":true}"#),
            (attrs::SCHEMA_HTML, html.as_str()),
            (attrs::CONFIRM_DANGER, "true"),
        ]);
        let config = ActionConfig::from_attributes(&attrs_map);
        let modal = ModalConfig::from_action(&config, &attrs_map, 1);

        assert_eq!(modal.schema.len(), 1);
        assert_eq!(modal.schema_defaults["notify"], true);
        assert_eq!(modal.schema_html.as_deref(), Some("<p>Custom</p>"));
        assert_eq!(modal.color, "danger");
    }

    #[test]
    fn test_invalid_schema_is_dropped() {
        let attrs_map = attributes(&[
            (attrs::SCHEMA, r#"[{"type":"TextInput","name":"a"},{"type":"Textarea","name":"a"}]"#),
        ]);
        let config = ActionConfig::from_attributes(&attrs_map);
        assert!(ModalConfig::from_action(&config, &attrs_map, 1).schema.is_empty());

        let attrs_map = attributes(&[(attrs::SCHEMA, "{oops")]);
        assert!(ModalConfig::from_action(&config, &attrs_map, 1).schema.is_empty());
    }
}
