// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Wire contract between rendered buttons, the client controller and the gateway.
//!
//! Both sides import their names from here: [`Action`](crate::Action) emits the
//! declarative attributes listed in [`attrs`], the client parses the same keys,
//! and the execution request travels as [`ExecutionRequest`] either in the query
//! string (GET/HEAD) or as a JSON body (everything else).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Declarative attributes of a rendered button (`data-*` name to value).
pub type Attributes = BTreeMap<String, String>;

/// HTTP methods an action can be executed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`, payload in the query string.
    Get,
    /// `HEAD`, payload in the query string.
    Head,
    /// `POST`, payload as JSON body.
    #[default]
    Post,
    /// `PUT`, payload as JSON body.
    Put,
    /// `PATCH`, payload as JSON body.
    Patch,
    /// `DELETE`, payload as JSON body.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Returns true when the payload travels in the query string.
    pub fn uses_query(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Head)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!("Unsupported HTTP method: {}", other)),
        }
    }
}

/// Logical payload of an execution request.
///
/// The same value is encoded as query parameters for GET/HEAD and as a JSON
/// body for other methods; the gateway decodes both to an identical value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// The encrypted action token.
    #[serde(default)]
    pub action_token: Option<String>,
    /// The record the action runs against (any JSON value).
    #[serde(default)]
    pub record: Option<JsonValue>,
    /// Form data collected before execution.
    #[serde(default)]
    pub data: Map<String, JsonValue>,
}

impl ExecutionRequest {
    /// Creates a request carrying only a token.
    pub fn new(action_token: impl Into<String>) -> Self {
        Self {
            action_token: Some(action_token.into()),
            record: None,
            data: Map::new(),
        }
    }

    /// Sets the record.
    pub fn with_record(mut self, record: Option<JsonValue>) -> Self {
        self.record = record;
        self
    }

    /// Sets the form data.
    pub fn with_data(mut self, data: Map<String, JsonValue>) -> Self {
        self.data = data;
        self
    }

    /// Encodes the request as query pairs.
    ///
    /// `record` is always present (JSON `null` when absent); `data` only when
    /// it is non-empty.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(token) = &self.action_token {
            pairs.push((fields::ACTION_TOKEN, token.clone()));
        }
        let record = self.record.clone().unwrap_or(JsonValue::Null);
        pairs.push((fields::RECORD, record.to_string()));
        if !self.data.is_empty() {
            pairs.push((fields::DATA, JsonValue::Object(self.data.clone()).to_string()));
        }
        pairs
    }

    /// Encodes the request as a JSON body.
    pub fn to_json_body(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Field names of the execution request.
pub mod fields {
    /// Encrypted token field.
    pub const ACTION_TOKEN: &str = "action_token";
    /// Record field.
    pub const RECORD: &str = "record";
    /// Form data field.
    pub const DATA: &str = "data";
}

/// Header names and values sent with every execution request.
pub mod headers {
    /// `Content-Type` header.
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// `Accept` header.
    pub const ACCEPT: &str = "Accept";
    /// AJAX marker header.
    pub const REQUESTED_WITH: &str = "X-Requested-With";
    /// CSRF token header.
    pub const CSRF_TOKEN: &str = "X-CSRF-TOKEN";
    /// JSON media type.
    pub const JSON: &str = "application/json";
    /// Value of the AJAX marker header.
    pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";
}

/// Declarative attribute names rendered on action buttons.
pub mod attrs {
    /// Action name.
    pub const ACTION: &str = "data-action";
    /// Gateway URL.
    pub const URL: &str = "data-action-url";
    /// Encrypted action token.
    pub const TOKEN: &str = "data-action-token";
    /// HTTP method.
    pub const METHOD: &str = "data-action-method";
    /// Client-only action kind (`copy` or `print`).
    pub const CLIENT_ACTION: &str = "data-client-action";
    /// Confirmation requirement.
    pub const REQUIRES_CONFIRMATION: &str = "data-requires-confirmation";
    /// Danger styling of the confirmation.
    pub const CONFIRM_DANGER: &str = "data-confirm-danger";
    /// Preserve scroll position on client-side navigation.
    pub const PRESERVE_SCROLL: &str = "data-preserve-scroll";
    /// Preserve page state on client-side navigation.
    pub const PRESERVE_STATE: &str = "data-preserve-state";
    /// JSON-encoded record.
    pub const RECORD: &str = "data-record";
    /// JSON array of schema fields.
    pub const SCHEMA: &str = "data-schema";
    /// JSON map of schema defaults.
    pub const SCHEMA_DEFAULTS: &str = "data-schema-defaults";
    /// Base64-encoded pre-rendered form HTML.
    pub const SCHEMA_HTML: &str = "data-schema-html";
    /// Bulk action marker.
    pub const BULK: &str = "data-bulk";
    /// Deselect records once a bulk action succeeds.
    pub const DESELECT_RECORDS: &str = "data-deselect-records-after-completion";
    /// Button color.
    pub const COLOR: &str = "data-color";
    /// Modal element id.
    pub const MODAL_ID: &str = "data-modal-id";
    /// Modal heading.
    pub const MODAL_HEADING: &str = "data-modal-heading";
    /// Modal description.
    pub const MODAL_DESCRIPTION: &str = "data-modal-description";
    /// Modal submit label.
    pub const MODAL_SUBMIT_LABEL: &str = "data-modal-submit-label";
    /// Modal cancel label.
    pub const MODAL_CANCEL_LABEL: &str = "data-modal-cancel-label";
    /// Modal icon.
    pub const MODAL_ICON: &str = "data-modal-icon";
    /// Modal width.
    pub const MODAL_WIDTH: &str = "data-modal-width";
    /// Render the modal as a slide-over.
    pub const MODAL_SLIDE_OVER: &str = "data-modal-slide-over";

    /// Copy mode (`value`, `attribute`, `element`, `selection`).
    pub const COPY_MODE: &str = "data-copy-mode";
    /// Literal text to copy.
    pub const COPY_VALUE: &str = "data-copy-value";
    /// Selector of the element to copy from.
    pub const COPY_SELECTOR: &str = "data-copy-selector";
    /// Element content to copy (`text` or `html`).
    pub const COPY_CONTENT: &str = "data-copy-content";
    /// Output format (`text` or `json`).
    pub const COPY_AS: &str = "data-copy-as";
    /// Show a notification after copying.
    pub const COPY_NOTIFY: &str = "data-copy-notify";
    /// Success notification message.
    pub const COPY_MESSAGE: &str = "data-copy-message";
    /// Failure notification message.
    pub const COPY_ERROR_MESSAGE: &str = "data-copy-error-message";
    /// Notification severity.
    pub const COPY_STATUS: &str = "data-copy-status";
    /// Notification duration in milliseconds.
    pub const COPY_DURATION: &str = "data-copy-duration";

    /// Print mode (`page`, `element`, `html`, `url`).
    pub const PRINT_MODE: &str = "data-print-mode";
    /// Selector of the element to print.
    pub const PRINT_SELECTOR: &str = "data-print-selector";
    /// Base64-encoded markup to print.
    pub const PRINT_HTML: &str = "data-print-html";
    /// URL to print.
    pub const PRINT_URL: &str = "data-print-url";
    /// Document title of the print frame.
    pub const PRINT_TITLE: &str = "data-print-title";
    /// Extra CSS injected while printing.
    pub const PRINT_CSS: &str = "data-print-css";
    /// Delay before opening the print dialog, in milliseconds.
    pub const PRINT_DELAY: &str = "data-print-delay";
}

/// Reads a boolean attribute.
///
/// A present attribute is true unless its value is `false`, `0`, `no` or `off`.
pub fn attr_flag(attributes: &Attributes, name: &str) -> bool {
    match attributes.get(name) {
        Some(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "false" | "0" | "no" | "off"
        ),
        None => false,
    }
}

/// Reads a non-empty string attribute.
pub fn attr_str<'a>(attributes: &'a Attributes, name: &str) -> Option<&'a str> {
    attributes
        .get(name)
        .map(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!(" Patch ".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("TRACE".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::default(), HttpMethod::Post);
    }

    #[test]
    fn test_query_methods() {
        assert!(HttpMethod::Get.uses_query());
        assert!(HttpMethod::Head.uses_query());
        assert!(!HttpMethod::Delete.uses_query());
    }

    #[test]
    fn test_query_pairs_skip_empty_data() {
        let request = ExecutionRequest::new("tok");
        let pairs = request.to_query_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("action_token", "tok".to_string()));
        assert_eq!(pairs[1], ("record", "null".to_string()));
    }

    #[test]
    fn test_query_pairs_encode_json() {
        let mut data = Map::new();
        data.insert("reason".into(), JsonValue::from("spam"));
        let request = ExecutionRequest::new("tok")
            .with_record(Some(serde_json::json!({ "id": 7 })))
            .with_data(data);
        let pairs = request.to_query_pairs();
        assert_eq!(pairs[1].1, r#"{"id":7}"#);
        assert_eq!(pairs[2].1, r#"{"reason":"spam"}"#);
    }

    #[test]
    fn test_json_body_has_all_fields() {
        let body = ExecutionRequest::new("tok").to_json_body();
        let value: JsonValue = serde_json::from_str(&body).unwrap();
        assert_eq!(value["action_token"], "tok");
        assert!(value["record"].is_null());
        assert!(value["data"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_attr_flag() {
        let mut attributes = Attributes::new();
        attributes.insert("a".into(), "".into());
        attributes.insert("b".into(), "false".into());
        attributes.insert("c".into(), "true".into());
        assert!(attr_flag(&attributes, "a"));
        assert!(!attr_flag(&attributes, "b"));
        assert!(attr_flag(&attributes, "c"));
        assert!(!attr_flag(&attributes, "missing"));
    }
}
