// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Server-side action descriptors.
//!
//! An [`Action`] describes a button: label and styling, an optional
//! confirmation or form modal, and what happens on click. That is one of
//! a server handler (executed through the gateway), a plain URL, or a
//! client-only copy or print.
//!
//! # Token memoization
//!
//! The handler is registered lazily, the first time the token is requested,
//! and the token is cached on the instance. Rendering the same `Action` twice
//! therefore yields the same token, while a new `Action` (for example on the
//! next page render) registers a fresh one.
//!
//! # Example
//!
//! ```rust,ignore
//! use actionkit::{Action, ActionOutcome, SchemaField};
//!
//! let archive = Action::new("archive")
//!     .label("Archive")
//!     .color("warning")
//!     .record(serde_json::json!({ "id": 42 }))
//!     .schema(vec![SchemaField::textarea("reason").label("Reason").required()])
//!     .handler(|input| {
//!         let reason = input.str_field("reason").unwrap_or_default();
//!         Ok(ActionOutcome::message(format!("Archived: {}", reason)))
//!     });
//!
//! let html = archive.render_button(&session)?;
//! ```

mod bulk;
mod local;

pub use bulk::DeleteBulkAction;
pub use local::{
    ContentKind, CopyFormat, CopyOptions, CopySource, PrintOptions, PrintTarget,
    DEFAULT_COPY_DURATION_MS, DEFAULT_COPY_ERROR_MESSAGE, DEFAULT_COPY_MESSAGE,
};

use crate::error::{ActionError, Result};
use crate::gateway::SessionScope;
use crate::html::{attr, escape};
use crate::protocol::{attrs, Attributes, HttpMethod};
use crate::schema::{validate_schema, SchemaField};
use crate::store::{ActionHandler, ActionInput, HandlerResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Text and chrome of the confirmation or form modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalOptions {
    /// Element id base.
    pub id: Option<String>,
    /// Heading.
    pub heading: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Submit button label.
    pub submit_label: Option<String>,
    /// Cancel button label.
    pub cancel_label: Option<String>,
    /// Header icon.
    pub icon: Option<String>,
    /// Width (`sm`, `md`, `lg`, ...).
    pub width: Option<String>,
    /// Render as a slide-over panel.
    pub slide_over: bool,
}

enum Behavior {
    None,
    Handler(ActionHandler),
    Url { url: String, new_tab: bool },
    Copy(CopyOptions),
    Print(PrintOptions),
}

/// Authorization callback.
pub type AuthorizeFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// A clickable action.
pub struct Action {
    name: String,
    label: Option<String>,
    color: Option<String>,
    icon: Option<String>,
    method: HttpMethod,
    behavior: Behavior,
    authorize: Option<AuthorizeFn>,
    requires_confirmation: bool,
    confirm_danger: bool,
    modal: ModalOptions,
    preserve_scroll: bool,
    preserve_state: bool,
    record: Option<JsonValue>,
    schema: Vec<SchemaField>,
    schema_defaults: Map<String, JsonValue>,
    schema_html: Option<String>,
    bulk: bool,
    deselect_records_after_completion: bool,
    token: Mutex<Option<String>>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("has_handler", &self.has_handler())
            .field("bulk", &self.bulk)
            .finish_non_exhaustive()
    }
}

impl Action {
    /// Creates an action with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            color: None,
            icon: None,
            method: HttpMethod::Post,
            behavior: Behavior::None,
            authorize: None,
            requires_confirmation: false,
            confirm_danger: false,
            modal: ModalOptions::default(),
            preserve_scroll: false,
            preserve_state: false,
            record: None,
            schema: Vec::new(),
            schema_defaults: Map::new(),
            schema_html: None,
            bulk: false,
            deselect_records_after_completion: false,
            token: Mutex::new(None),
        }
    }

    /// Creates a bulk action; its record is the host's record selection.
    pub fn bulk(name: impl Into<String>) -> Self {
        let mut action = Self::new(name);
        action.bulk = true;
        action
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the color (`primary`, `danger`, ...).
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the icon.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Sets the HTTP method used for execution.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the server handler.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ActionInput) -> HandlerResult + Send + Sync + 'static,
    {
        self.behavior = Behavior::Handler(Arc::new(handler));
        self
    }

    /// Makes this a plain link.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.behavior = Behavior::Url {
            url: url.into(),
            new_tab: false,
        };
        self
    }

    /// Opens the link in a new tab.
    pub fn open_in_new_tab(mut self) -> Self {
        if let Behavior::Url { new_tab, .. } = &mut self.behavior {
            *new_tab = true;
        }
        self
    }

    /// Makes this a client-side copy action.
    pub fn copy(mut self, options: CopyOptions) -> Self {
        self.behavior = Behavior::Copy(options);
        self
    }

    /// Makes this a client-side print action.
    pub fn print(mut self, options: PrintOptions) -> Self {
        self.behavior = Behavior::Print(options);
        self
    }

    /// Sets the authorization callback; unauthorized actions render nothing.
    pub fn authorize<F>(mut self, authorize: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.authorize = Some(Arc::new(authorize));
        self
    }

    /// Requires confirmation before executing.
    pub fn requires_confirmation(mut self) -> Self {
        self.requires_confirmation = true;
        self
    }

    /// Styles the confirmation as dangerous.
    pub fn confirm_danger(mut self) -> Self {
        self.confirm_danger = true;
        self
    }

    /// Sets the modal id base.
    pub fn modal_id(mut self, id: impl Into<String>) -> Self {
        self.modal.id = Some(id.into());
        self
    }

    /// Sets the modal heading.
    pub fn modal_heading(mut self, heading: impl Into<String>) -> Self {
        self.modal.heading = Some(heading.into());
        self
    }

    /// Sets the modal description.
    pub fn modal_description(mut self, description: impl Into<String>) -> Self {
        self.modal.description = Some(description.into());
        self
    }

    /// Sets the modal submit label.
    pub fn modal_submit_label(mut self, label: impl Into<String>) -> Self {
        self.modal.submit_label = Some(label.into());
        self
    }

    /// Sets the modal cancel label.
    pub fn modal_cancel_label(mut self, label: impl Into<String>) -> Self {
        self.modal.cancel_label = Some(label.into());
        self
    }

    /// Sets the modal icon.
    pub fn modal_icon(mut self, icon: impl Into<String>) -> Self {
        self.modal.icon = Some(icon.into());
        self
    }

    /// Sets the modal width.
    pub fn modal_width(mut self, width: impl Into<String>) -> Self {
        self.modal.width = Some(width.into());
        self
    }

    /// Renders the modal as a slide-over.
    pub fn slide_over(mut self) -> Self {
        self.modal.slide_over = true;
        self
    }

    /// Preserves the scroll position when redirected.
    pub fn preserve_scroll(mut self) -> Self {
        self.preserve_scroll = true;
        self
    }

    /// Preserves page state when redirected.
    pub fn preserve_state(mut self) -> Self {
        self.preserve_state = true;
        self
    }

    /// Sets the record passed to the handler.
    pub fn record(mut self, record: JsonValue) -> Self {
        self.record = Some(record);
        self
    }

    /// Sets the form schema.
    pub fn schema(mut self, schema: Vec<SchemaField>) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the form defaults.
    pub fn schema_defaults(mut self, defaults: Map<String, JsonValue>) -> Self {
        self.schema_defaults = defaults;
        self
    }

    /// Supplies pre-rendered form markup used instead of the schema renderer.
    pub fn schema_html(mut self, html: impl Into<String>) -> Self {
        self.schema_html = Some(html.into());
        self
    }

    /// Deselects the record selection after a successful bulk execution.
    pub fn deselect_records_after_completion(mut self, deselect: bool) -> Self {
        self.deselect_records_after_completion = deselect;
        self
    }

    /// Returns the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display label.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => {
                let words = self.name.replace(['_', '-'], " ");
                let mut chars = words.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    /// Returns true if a server handler is attached.
    pub fn has_handler(&self) -> bool {
        matches!(self.behavior, Behavior::Handler(_))
    }

    /// Returns true for bulk actions.
    pub fn is_bulk(&self) -> bool {
        self.bulk
    }

    /// Returns true if the selection is cleared after success.
    pub fn deselects_records_after_completion(&self) -> bool {
        self.deselect_records_after_completion
    }

    /// Returns true if the action may be shown and executed.
    pub fn is_authorized(&self) -> bool {
        self.authorize.as_ref().map(|f| f()).unwrap_or(true)
    }

    /// Returns the action token, registering the handler on first use.
    ///
    /// `None` when the action has no handler or is not authorized.
    pub fn action_token(&self, scope: &SessionScope) -> Result<Option<String>> {
        let Behavior::Handler(handler) = &self.behavior else {
            return Ok(None);
        };
        if !self.is_authorized() {
            return Ok(None);
        }

        let mut cached = self.token.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = cached.as_ref() {
            return Ok(Some(token.clone()));
        }

        let token = scope.issue(&self.name, handler.clone())?;
        *cached = Some(token.clone());
        Ok(Some(token))
    }

    /// Returns the execution URL, `None` when the action has no handler.
    pub fn action_url(&self, scope: &SessionScope) -> Option<String> {
        match self.behavior {
            Behavior::Handler(_) if self.is_authorized() => Some(scope.endpoint().to_string()),
            _ => None,
        }
    }

    /// Returns the declarative attributes read by the client controller.
    pub fn attributes(&self, scope: &SessionScope) -> Result<Attributes> {
        let mut out = Attributes::new();
        out.insert(attrs::ACTION.into(), self.name.clone());

        match &self.behavior {
            Behavior::Copy(options) => options.write_attributes(&mut out),
            Behavior::Print(options) => options.write_attributes(&mut out),
            Behavior::Handler(_) => {
                if let (Some(url), Some(token)) = (self.action_url(scope), self.action_token(scope)?) {
                    out.insert(attrs::URL.into(), url);
                    out.insert(attrs::TOKEN.into(), token);
                    out.insert(attrs::METHOD.into(), self.method.to_string());
                }
            }
            Behavior::Url { .. } | Behavior::None => {}
        }

        let flags = [
            (attrs::REQUIRES_CONFIRMATION, self.requires_confirmation),
            (attrs::CONFIRM_DANGER, self.confirm_danger),
            (attrs::PRESERVE_SCROLL, self.preserve_scroll),
            (attrs::PRESERVE_STATE, self.preserve_state),
            (attrs::BULK, self.bulk),
            (attrs::MODAL_SLIDE_OVER, self.modal.slide_over),
        ];
        for (name, enabled) in flags {
            if enabled {
                out.insert(name.into(), "true".into());
            }
        }
        if self.bulk {
            out.insert(
                attrs::DESELECT_RECORDS.into(),
                self.deselect_records_after_completion.to_string(),
            );
        }

        if let Some(record) = &self.record {
            out.insert(attrs::RECORD.into(), record.to_string());
        }

        let id_base = self.modal.id.clone().unwrap_or_else(|| format!("action-modal-{}", self.name));
        if !self.schema.is_empty() {
            match validate_schema(&self.schema, &id_base) {
                Ok(()) => {
                    let schema = serde_json::to_string(&self.schema)
                        .map_err(|e| ActionError::InvalidPayload(e.to_string()))?;
                    out.insert(attrs::SCHEMA.into(), schema);
                }
                Err(err) => {
                    tracing::warn!(action = %self.name, "Dropping invalid schema: {}", err);
                }
            }
        }
        if !self.schema_defaults.is_empty() {
            out.insert(
                attrs::SCHEMA_DEFAULTS.into(),
                JsonValue::Object(self.schema_defaults.clone()).to_string(),
            );
        }
        if let Some(html) = &self.schema_html {
            out.insert(attrs::SCHEMA_HTML.into(), STANDARD.encode(html));
        }

        let optional = [
            (attrs::COLOR, &self.color),
            (attrs::MODAL_ID, &self.modal.id),
            (attrs::MODAL_HEADING, &self.modal.heading),
            (attrs::MODAL_DESCRIPTION, &self.modal.description),
            (attrs::MODAL_SUBMIT_LABEL, &self.modal.submit_label),
            (attrs::MODAL_CANCEL_LABEL, &self.modal.cancel_label),
            (attrs::MODAL_ICON, &self.modal.icon),
            (attrs::MODAL_WIDTH, &self.modal.width),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                out.insert(name.into(), value.clone());
            }
        }

        Ok(out)
    }

    /// Renders the action as HTML.
    ///
    /// Plain URL actions render as `<a>`, everything else as a
    /// `<button type="button">` carrying the declarative attributes.
    /// Unauthorized actions render as an empty string.
    pub fn render_button(&self, scope: &SessionScope) -> Result<String> {
        if !self.is_authorized() {
            return Ok(String::new());
        }

        let color = self.color.as_deref().unwrap_or("primary");
        let class = format!("ak-action ak-action-{}", color);
        let icon = self
            .icon
            .as_deref()
            .map(|i| format!("<span class=\"ak-icon\"{}></span>", attr("data-icon", i)))
            .unwrap_or_default();
        let label = escape(&self.display_label());

        if let Behavior::Url { url, new_tab } = &self.behavior {
            let target = if *new_tab {
                " target=\"_blank\" rel=\"noopener noreferrer\""
            } else {
                ""
            };
            return Ok(format!(
                "<a{}{}{}{}>{}{}</a>",
                attr("href", url),
                attr("class", &class),
                attr(attrs::ACTION, &self.name),
                target,
                icon,
                label
            ));
        }

        let attributes: String = self
            .attributes(scope)?
            .iter()
            .map(|(name, value)| attr(name, value))
            .collect();
        Ok(format!(
            "<button type=\"button\"{}{}>{}{}</button>",
            attr("class", &class),
            attributes,
            icon,
            label
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{Gateway, GatewayConfig};
    use crate::protocol::ExecutionRequest;
    use crate::result::ActionOutcome;
    use crate::store::MemoryCallbackStore;
    use crate::token::TokenCipher;
    use serde_json::json;

    fn scope() -> SessionScope {
        Gateway::new(
            TokenCipher::from_secret("test-key"),
            Arc::new(MemoryCallbackStore::new()),
            GatewayConfig::default(),
        )
        .session("s1")
    }

    #[test]
    fn test_token_is_memoized_per_instance() {
        let scope = scope();
        let first = Action::new("archive").handler(|_| Ok(ActionOutcome::Empty));
        let second = Action::new("archive").handler(|_| Ok(ActionOutcome::Empty));

        let a = first.action_token(&scope).unwrap().unwrap();
        let b = first.action_token(&scope).unwrap().unwrap();
        assert_eq!(a, b);

        let c = second.action_token(&scope).unwrap().unwrap();
        assert_ne!(a, c);

        assert_eq!(scope.gateway().store().count("s1").unwrap(), 2);
    }

    #[test]
    fn test_no_handler_means_no_token() {
        let scope = scope();
        let action = Action::new("noop").label("Nothing");
        assert_eq!(action.action_token(&scope).unwrap(), None);
        assert_eq!(action.action_url(&scope), None);

        let attributes = action.attributes(&scope).unwrap();
        assert!(!attributes.contains_key(attrs::TOKEN));
        assert!(!attributes.contains_key(attrs::URL));
    }

    #[test]
    fn test_attributes() {
        let scope = scope();
        let action = Action::new("archive")
            .method(HttpMethod::Patch)
            .requires_confirmation()
            .confirm_danger()
            .record(json!({ "id": 3 }))
            .modal_heading("Archive post?")
            .color("warning")
            .handler(|_| Ok(ActionOutcome::Empty));

        let attributes = action.attributes(&scope).unwrap();
        assert_eq!(attributes[attrs::URL], "/_actions/execute");
        assert_eq!(attributes[attrs::METHOD], "PATCH");
        assert_eq!(attributes[attrs::REQUIRES_CONFIRMATION], "true");
        assert_eq!(attributes[attrs::CONFIRM_DANGER], "true");
        assert_eq!(attributes[attrs::RECORD], r#"{"id":3}"#);
        assert_eq!(attributes[attrs::MODAL_HEADING], "Archive post?");
        assert_eq!(
            attributes[attrs::TOKEN],
            action.action_token(&scope).unwrap().unwrap()
        );
        assert!(!attributes.contains_key(attrs::PRESERVE_SCROLL));
    }

    #[test]
    fn test_issued_token_executes_handler() {
        let scope = scope();
        let action = Action::new("greet").handler(|_| Ok(ActionOutcome::message("Hi")));
        let token = action.action_token(&scope).unwrap().unwrap();

        let response = scope.execute(&ExecutionRequest::new(token));
        assert_eq!(response.body.message.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_invalid_schema_is_dropped() {
        let scope = scope();
        let action = Action::new("edit")
            .schema(vec![SchemaField::text_input("a"), SchemaField::text_input("a")])
            .handler(|_| Ok(ActionOutcome::Empty));

        let attributes = action.attributes(&scope).unwrap();
        assert!(!attributes.contains_key(attrs::SCHEMA));
    }

    #[test]
    fn test_render_button() {
        let scope = scope();
        let html = Action::new("send_invoice")
            .icon("mail")
            .handler(|_| Ok(ActionOutcome::Empty))
            .render_button(&scope)
            .unwrap();

        assert!(html.starts_with("<button type=\"button\" class=\"ak-action ak-action-primary\""));
        assert!(html.contains(" data-action=\"send_invoice\""));
        assert!(html.contains(" data-action-token=\""));
        assert!(html.ends_with("<span class=\"ak-icon\" data-icon=\"mail\"></span>Send invoice</button>"));
    }

    #[test]
    fn test_render_link() {
        let scope = scope();
        let html = Action::new("docs")
            .label("Docs")
            .url("https://example.com/?a=1&b=2")
            .open_in_new_tab()
            .render_button(&scope)
            .unwrap();

        assert_eq!(
            html,
            "<a href=\"https://example.com/?a=1&amp;b=2\" class=\"ak-action ak-action-primary\" data-action=\"docs\" target=\"_blank\" rel=\"noopener noreferrer\">Docs</a>"
        );
    }

    #[test]
    fn test_unauthorized_renders_nothing() {
        let scope = scope();
        let action = Action::new("secret")
            .authorize(|| false)
            .handler(|_| Ok(ActionOutcome::Empty));

        assert_eq!(action.render_button(&scope).unwrap(), "");
        assert_eq!(action.action_token(&scope).unwrap(), None);
        assert_eq!(scope.gateway().store().count("s1").unwrap(), 0);
    }

    #[test]
    fn test_copy_action_needs_no_token() {
        let scope = scope();
        let attributes = Action::new("copy_id")
            .copy(CopyOptions::value("INV-7"))
            .attributes(&scope)
            .unwrap();

        assert_eq!(attributes[attrs::CLIENT_ACTION], "copy");
        assert_eq!(attributes[attrs::COPY_VALUE], "INV-7");
        assert!(!attributes.contains_key(attrs::TOKEN));
    }
}
