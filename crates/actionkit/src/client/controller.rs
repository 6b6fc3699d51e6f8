// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The action controller.
//!
//! One controller serves a whole page. An activation walks through
//! client-only actions (copy, print), the optional schema modal or
//! confirmation, the execution request and finally reconciliation of the
//! result with the page.

use super::config::{ActionConfig, ModalConfig};
use super::copy::run_copy;
use super::error::ClientError;
use super::host::{ElementRef, Host, HttpRequest};
use super::modal::{render_modal, ModalReceiver, ModalSession};
use super::print::run_print;
use super::reconcile::{reconcile, report_exception};
use crate::action::{CopyOptions, PrintOptions};
use crate::protocol::{attr_str, attrs, headers, ExecutionRequest};
use crate::result::ActionResult;
use futures_util::future::join;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Message returned when an element lacks its URL or token.
pub const MISSING_CONFIGURATION: &str = "Missing action configuration";

/// Length of the modal exit transition.
pub const DEFAULT_MODAL_EXIT_DELAY: Duration = Duration::from_millis(200);

/// Called with the result when the gateway reports success.
pub type SuccessCallback = Box<dyn FnOnce(&ActionResult) + Send>;

/// Called when the gateway reports failure or the request fails.
pub type ErrorCallback = Box<dyn FnOnce(&ClientError) + Send>;

/// Called once after every execution.
pub type CompleteCallback = Box<dyn FnOnce() + Send>;

/// Extra data and callbacks for one execution.
#[derive(Default)]
pub struct ExecuteOptions {
    /// Data merged into the request (modal data is added on top).
    pub data: Map<String, JsonValue>,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    on_complete: Option<CompleteCallback>,
}

impl ExecuteOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request data.
    pub fn with_data(mut self, data: Map<String, JsonValue>) -> Self {
        self.data = data;
        self
    }

    /// Sets the success callback.
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&ActionResult) + Send + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Sets the error callback.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&ClientError) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Sets the completion callback.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for ExecuteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteOptions")
            .field("data", &self.data)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Why an activation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Another modal is open.
    ModalBusy,
    /// The element carries an unknown or incomplete client action.
    InvalidClientAction,
}

/// What an activation ended in.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationOutcome {
    /// The element already had a request in flight, or could not be found.
    Ignored,
    /// The activation was refused.
    Rejected(RejectReason),
    /// A copy action ran; true when the clipboard was written.
    Copied(bool),
    /// A print action ran; true when the dialog opened.
    Printed(bool),
    /// The modal was dismissed.
    Cancelled,
    /// The confirmation was declined.
    Declined,
    /// The execution request was made (or short-circuited).
    Executed(ActionResult),
}

/// Target of a programmatic trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerTarget {
    /// Looked up through [`Document::find`](super::Document::find).
    Selector(String),
    /// An element the caller already holds.
    Element(ElementRef),
}

impl From<&str> for TriggerTarget {
    fn from(selector: &str) -> Self {
        TriggerTarget::Selector(selector.to_string())
    }
}

impl From<String> for TriggerTarget {
    fn from(selector: String) -> Self {
        TriggerTarget::Selector(selector)
    }
}

impl From<ElementRef> for TriggerTarget {
    fn from(element: ElementRef) -> Self {
        TriggerTarget::Element(element)
    }
}

/// Clears the loading state of an execution when dropped.
struct LoadingGuard<'a> {
    host: &'a Host,
    element: &'a str,
    modal: Option<String>,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(host: &'a Host, element: &'a str, modal: Option<String>) -> Self {
        host.document.set_loading(element, true);
        if let Some(modal) = &modal {
            host.modals.set_submit_busy(modal, true);
        }
        Self { host, element, modal }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.host.document.set_loading(self.element, false);
        if let Some(modal) = &self.modal {
            self.host.modals.set_submit_busy(modal, false);
        }
    }
}

/// Owns the controller's modal slot from mount to removal.
///
/// Dropping it removes the modal and frees the slot, also when the
/// activation future is dropped while the modal is still open.
struct ModalGuard<'a> {
    controller: &'a ActionController,
    id: String,
}

impl Drop for ModalGuard<'_> {
    fn drop(&mut self) {
        self.controller.host.modals.remove(&self.id);
        let mut slot = self.controller.slot();
        if slot.as_ref().map(|s| s.id == self.id).unwrap_or(false) {
            *slot = None;
        }
    }
}

/// Drives action elements on one page.
pub struct ActionController {
    host: Host,
    modal: Mutex<Option<ModalSession>>,
    modal_sequence: AtomicU64,
    modal_exit_delay: Duration,
}

impl ActionController {
    /// Creates a controller.
    pub fn new(host: Host) -> Self {
        Self {
            host,
            modal: Mutex::new(None),
            modal_sequence: AtomicU64::new(0),
            modal_exit_delay: DEFAULT_MODAL_EXIT_DELAY,
        }
    }

    /// Sets how long a closing modal stays mounted.
    pub fn with_modal_exit_delay(mut self, delay: Duration) -> Self {
        self.modal_exit_delay = delay;
        self
    }

    /// Returns the host.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Returns true while a modal is mounted.
    pub fn has_open_modal(&self) -> bool {
        self.slot().is_some()
    }

    /// Returns the id of the mounted modal.
    pub fn active_modal_id(&self) -> Option<String> {
        self.slot().as_ref().map(|session| session.id.clone())
    }

    /// Handles a user activation of an element.
    pub async fn handle_activation(&self, element: &ElementRef) -> ActivationOutcome {
        self.activate(element, ExecuteOptions::default()).await
    }

    /// Activates an element programmatically, with extra data and callbacks.
    pub async fn trigger(
        &self,
        target: impl Into<TriggerTarget>,
        options: ExecuteOptions,
    ) -> ActivationOutcome {
        let element = match target.into() {
            TriggerTarget::Element(element) => element,
            TriggerTarget::Selector(selector) => match self.host.document.find(&selector) {
                Some(element) => element,
                None => {
                    tracing::warn!("No action element matches {}", selector);
                    return ActivationOutcome::Ignored;
                }
            },
        };
        self.activate(&element, options).await
    }

    async fn activate(&self, element: &ElementRef, mut options: ExecuteOptions) -> ActivationOutcome {
        if self.host.document.is_loading(&element.id) {
            tracing::debug!(element = %element.id, "Ignoring activation while loading");
            return ActivationOutcome::Ignored;
        }
        if self.has_open_modal() {
            tracing::warn!(element = %element.id, "Ignoring activation while a modal is open");
            return ActivationOutcome::Rejected(RejectReason::ModalBusy);
        }

        if let Some(kind) = attr_str(&element.attributes, attrs::CLIENT_ACTION) {
            return self.run_client_action(element, kind).await;
        }

        let mut config = ActionConfig::from_attributes(&element.attributes);
        if config.bulk {
            config.record = Some(JsonValue::Array(self.host.document.selected_records()));
        }

        if ModalConfig::is_declared(&element.attributes) {
            let sequence = self.modal_sequence.fetch_add(1, Ordering::SeqCst) + 1;
            let modal = ModalConfig::from_action(&config, &element.attributes, sequence);

            let (guard, receiver) = match self.claim_modal(&modal) {
                Some(claimed) => claimed,
                None => return ActivationOutcome::Rejected(RejectReason::ModalBusy),
            };
            let data = match self.show_modal(&modal, receiver).await {
                Some(data) => data,
                None => {
                    self.close_modal(guard).await;
                    return ActivationOutcome::Cancelled;
                }
            };

            options.data.extend(data);
            let (result, ()) = join(
                self.execute_action(element, &config, options),
                self.close_modal(guard),
            )
            .await;
            return ActivationOutcome::Executed(result);
        }

        if config.requires_confirmation && !self.confirm(&config).await {
            return ActivationOutcome::Declined;
        }

        ActivationOutcome::Executed(self.execute_action(element, &config, options).await)
    }

    async fn run_client_action(&self, element: &ElementRef, kind: &str) -> ActivationOutcome {
        match kind {
            "copy" => match CopyOptions::from_attributes(&element.attributes) {
                Some(options) => {
                    ActivationOutcome::Copied(run_copy(&self.host, &element.id, &options).await)
                }
                None => {
                    tracing::warn!(element = %element.id, "Copy action without a source");
                    ActivationOutcome::Rejected(RejectReason::InvalidClientAction)
                }
            },
            "print" => match PrintOptions::from_attributes(&element.attributes) {
                Some(options) => {
                    ActivationOutcome::Printed(run_print(&self.host, &element.id, &options).await)
                }
                None => {
                    tracing::warn!(element = %element.id, "Print action without a target");
                    ActivationOutcome::Rejected(RejectReason::InvalidClientAction)
                }
            },
            other => {
                tracing::warn!(element = %element.id, "Unknown client action: {}", other);
                ActivationOutcome::Rejected(RejectReason::InvalidClientAction)
            }
        }
    }

    async fn confirm(&self, config: &ActionConfig) -> bool {
        let request = config.confirm_request();
        match &self.host.confirm {
            Some(service) => service.confirm(&request).await,
            None => self.host.document.blocking_confirm(&request.message()),
        }
    }

    /// Sends the execution request and applies its result.
    ///
    /// The element is marked loading, and the open modal's submit control
    /// busy, until the request settles, whatever the outcome. Transport and
    /// parse failures show the generic error notification and resolve to a
    /// failure result instead of propagating.
    pub async fn execute_action(
        &self,
        element: &ElementRef,
        config: &ActionConfig,
        options: ExecuteOptions,
    ) -> ActionResult {
        let ExecuteOptions {
            data,
            on_success,
            on_error,
            on_complete,
        } = options;

        let request = match self.build_request(config, data) {
            Some(request) => request,
            None => {
                tracing::warn!(element = %element.id, action = %config.name, "{}", MISSING_CONFIGURATION);
                return ActionResult::failure(MISSING_CONFIGURATION);
            }
        };

        let guard = LoadingGuard::acquire(&self.host, &element.id, self.active_modal_id());

        let result = match self.send(request).await {
            Ok(result) => {
                match reconcile(&self.host, &element.id, config, &result) {
                    Ok(()) => {
                        if let Some(callback) = on_success {
                            callback(&result);
                        }
                    }
                    Err(err) => {
                        if let Some(callback) = on_error {
                            callback(&err);
                        }
                    }
                }
                result
            }
            Err(err) => {
                tracing::warn!(action = %config.name, "Action request failed: {}", err);
                report_exception(&self.host);
                let message = err.to_string();
                if let Some(callback) = on_error {
                    callback(&err);
                }
                if message.is_empty() {
                    ActionResult::failure("Unknown error")
                } else {
                    ActionResult::failure(message)
                }
            }
        };

        drop(guard);
        if let Some(callback) = on_complete {
            callback();
        }
        result
    }

    /// Builds the HTTP request for an execution; `None` without URL or token.
    pub fn build_request(
        &self,
        config: &ActionConfig,
        data: Map<String, JsonValue>,
    ) -> Option<HttpRequest> {
        let url = config.action_url.as_deref()?;
        let token = config.action_token.as_deref()?;

        let request = ExecutionRequest::new(token)
            .with_record(config.record.clone())
            .with_data(data);

        let mut request_headers = vec![
            (headers::CONTENT_TYPE.to_string(), headers::JSON.to_string()),
            (headers::ACCEPT.to_string(), headers::JSON.to_string()),
            (headers::REQUESTED_WITH.to_string(), headers::XML_HTTP_REQUEST.to_string()),
        ];
        if let Some(csrf) = self.host.document.csrf_token() {
            request_headers.push((headers::CSRF_TOKEN.to_string(), csrf));
        }

        if config.method.uses_query() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(request.to_query_pairs())
                .finish();
            Some(HttpRequest {
                method: config.method,
                url: append_query(url, &query),
                headers: request_headers,
                body: None,
            })
        } else {
            Some(HttpRequest {
                method: config.method,
                url: url.to_string(),
                headers: request_headers,
                body: Some(request.to_json_body()),
            })
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<ActionResult, ClientError> {
        let response = self.host.transport.send(request).await?;
        serde_json::from_str::<ActionResult>(&response.body).map_err(|err| {
            ClientError::InvalidResponse(format!("HTTP {}: {}", response.status, err))
        })
    }

    /// Takes the modal slot; `None` when another modal holds it.
    fn claim_modal(&self, modal: &ModalConfig) -> Option<(ModalGuard<'_>, ModalReceiver)> {
        let mut slot = self.slot();
        if slot.is_some() {
            return None;
        }
        let (session, receiver) = ModalSession::new(modal.id.clone(), modal.schema.clone());
        *slot = Some(session);
        let guard = ModalGuard {
            controller: self,
            id: modal.id.clone(),
        };
        Some((guard, receiver))
    }

    /// Mounts the claimed modal and waits for the submitted data, `None`
    /// for a dismissal.
    async fn show_modal(
        &self,
        modal: &ModalConfig,
        receiver: ModalReceiver,
    ) -> Option<Map<String, JsonValue>> {
        self.host.modals.mount(&modal.id, &render_modal(modal));
        self.host.timer.next_frame().await;
        self.host.modals.set_visible(&modal.id, true);

        receiver.await.unwrap_or(None)
    }

    /// Plays the exit transition; dropping the guard removes the modal.
    async fn close_modal(&self, guard: ModalGuard<'_>) {
        self.host.modals.set_visible(&guard.id, false);
        self.host.timer.sleep(self.modal_exit_delay).await;
        drop(guard);
    }

    /// Submits the open modal with its form pairs; false when none is pending.
    pub fn submit_modal(&self, pairs: &[(String, String)]) -> bool {
        self.slot()
            .as_mut()
            .map(|session| session.submit(pairs))
            .unwrap_or(false)
    }

    /// Dismisses the open modal (backdrop, close or cancel control).
    pub fn dismiss_modal(&self) -> bool {
        self.slot()
            .as_mut()
            .map(|session| session.dismiss())
            .unwrap_or(false)
    }

    /// Handles a key press; Escape dismisses the open modal.
    pub fn handle_key(&self, key: &str) -> bool {
        key == "Escape" && self.dismiss_modal()
    }

    fn slot(&self) -> MutexGuard<'_, Option<ModalSession>> {
        self.modal.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for ActionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionController")
            .field("active_modal", &self.active_modal_id())
            .field("modal_exit_delay", &self.modal_exit_delay)
            .finish()
    }
}

/// Appends a query string to a URL, before any fragment.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let (base, fragment) = match url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (url, None),
    };
    let separator = if !base.contains('?') {
        "?"
    } else if base.ends_with('?') || base.ends_with('&') {
        ""
    } else {
        "&"
    };
    match fragment {
        Some(fragment) => format!("{}{}{}#{}", base, separator, query, fragment),
        None => format!("{}{}{}", base, separator, query),
    }
}
