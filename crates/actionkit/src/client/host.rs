// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Host seams of the client controller.
//!
//! The controller owns the protocol; everything that touches a real page
//! (network, document, notifications, modals, clipboard, printing, timers)
//! goes through the traits in this module. A browser binding implements them
//! on top of the DOM, the CLI implements them for a terminal, and tests use
//! recording doubles.

use super::error::TransportError;
use crate::action::ContentKind;
use crate::protocol::{Attributes, HttpMethod};
use crate::result::Notification;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Names of the events dispatched on the triggering element.
pub mod events {
    /// The gateway reported success; detail is the full result.
    pub const ACTION_SUCCESS: &str = "action:success";
    /// The gateway reported failure; detail is the full result.
    pub const ACTION_ERROR: &str = "action:error";
    /// Text was copied; detail is `{text}`.
    pub const COPY_SUCCESS: &str = "copy:success";
    /// Copying failed; detail is `{error}`.
    pub const COPY_ERROR: &str = "copy:error";
    /// The print dialog was opened.
    pub const PRINT_SUCCESS: &str = "print:success";
    /// Printing failed; detail is `{error}`.
    pub const PRINT_ERROR: &str = "print:error";
    /// A bulk action succeeded and the selection should be cleared.
    pub const BULK_DESELECT: &str = "bulk:deselect";
}

/// An element the controller acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    /// Host-assigned element id.
    pub id: String,
    /// Declarative attributes of the element.
    pub attributes: Attributes,
}

impl ElementRef {
    /// Creates an element reference.
    pub fn new(id: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }
}

/// A bubbling custom event.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientEvent {
    /// Event name, one of [`events`].
    pub name: &'static str,
    /// Event detail.
    pub detail: JsonValue,
}

impl ClientEvent {
    /// Creates an event.
    pub fn new(name: &'static str, detail: JsonValue) -> Self {
        Self { name, detail }
    }
}

/// How a redirect should navigate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Keep the scroll position.
    pub preserve_scroll: bool,
    /// Keep component state.
    pub preserve_state: bool,
}

/// Content of a confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    /// Dialog title.
    pub heading: String,
    /// Dialog body.
    pub description: String,
    /// Confirm button label.
    pub confirm_label: String,
    /// Cancel button label.
    pub cancel_label: String,
    /// Danger styling.
    pub danger: bool,
}

impl ConfirmRequest {
    /// Returns the text for a plain blocking confirm.
    pub fn message(&self) -> String {
        if self.description.is_empty() {
            self.heading.clone()
        } else {
            format!("{}\n\n{}", self.heading, self.description)
        }
    }
}

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: HttpMethod,
    /// Absolute or page-relative URL, including the query string.
    pub url: String,
    /// Headers in sending order.
    pub headers: Vec<(String, String)>,
    /// JSON body, absent for GET/HEAD.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Returns a header value, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Body text.
    pub body: String,
}

/// Sends execution requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the response, whatever its status.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// The page the controller runs in.
pub trait Document: Send + Sync {
    /// CSRF token from a meta tag or hidden field, if any.
    fn csrf_token(&self) -> Option<String>;

    /// Returns true while the element has a request in flight.
    fn is_loading(&self, element: &str) -> bool;

    /// Sets or clears the loading flag of an element.
    fn set_loading(&self, element: &str, loading: bool);

    /// Dispatches a bubbling event on an element.
    fn dispatch(&self, element: &str, event: ClientEvent);

    /// Navigates to a URL.
    fn navigate(&self, url: &str, options: NavigateOptions);

    /// Finds an element by selector.
    fn find(&self, selector: &str) -> Option<ElementRef>;

    /// Reads the content of the element matching a selector.
    fn element_content(&self, selector: &str, kind: ContentKind) -> Option<String>;

    /// Returns the current text selection.
    fn selected_text(&self) -> Option<String>;

    /// Returns the ids of the currently selected records.
    fn selected_records(&self) -> Vec<JsonValue>;

    /// Platform blocking confirm, used when no [`ConfirmService`] is set.
    fn blocking_confirm(&self, message: &str) -> bool;
}

/// Shows notifications.
pub trait Notifier: Send + Sync {
    /// Shows a notification, styled by its status.
    fn notify(&self, notification: &Notification, duration: Option<Duration>);
}

/// Host-provided confirmation dialog.
#[async_trait]
pub trait ConfirmService: Send + Sync {
    /// Asks the user; true when confirmed.
    async fn confirm(&self, request: &ConfirmRequest) -> bool;
}

/// Mounts and animates modal markup.
pub trait ModalSurface: Send + Sync {
    /// Mounts the modal markup, initially invisible.
    fn mount(&self, modal_id: &str, html: &str);

    /// Starts the entrance or exit transition.
    fn set_visible(&self, modal_id: &str, visible: bool);

    /// Sets the busy state of the submit control.
    fn set_submit_busy(&self, modal_id: &str, busy: bool);

    /// Removes the modal from the document.
    fn remove(&self, modal_id: &str);
}

/// Writes to the platform clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Writes text.
    async fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Content of a print frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    /// A complete HTML document.
    Document(String),
    /// A URL to load.
    Url(String),
}

/// Printing primitives.
#[async_trait]
pub trait PrintHost: Send + Sync {
    /// Injects a style block into the page; returns a handle.
    fn inject_style(&self, css: &str) -> String;

    /// Removes an injected style block.
    fn remove_style(&self, handle: &str);

    /// Prints the page; resolves when the dialog closes.
    async fn print_page(&self) -> Result<(), String>;

    /// Creates an isolated off-screen frame; returns its handle.
    fn create_frame(&self, source: FrameSource) -> Result<String, String>;

    /// Resolves when the frame signals load. May never resolve.
    async fn frame_loaded(&self, frame: &str);

    /// Opens the print dialog of a frame.
    fn print_frame(&self, frame: &str) -> Result<(), String>;

    /// Resolves when the frame signals "after print". May never resolve.
    async fn after_print(&self, frame: &str);

    /// Removes a frame.
    fn remove_frame(&self, frame: &str);
}

/// Time source.
#[async_trait]
pub trait Timer: Send + Sync {
    /// Sleeps for a duration.
    async fn sleep(&self, duration: Duration);

    /// Waits for the next paint.
    async fn next_frame(&self);
}

/// Timer backed by tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn next_frame(&self) {
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
}

/// Everything the controller needs from its host.
#[derive(Clone)]
pub struct Host {
    /// Network.
    pub transport: Arc<dyn Transport>,
    /// Page.
    pub document: Arc<dyn Document>,
    /// Notifications.
    pub notifier: Arc<dyn Notifier>,
    /// Optional confirm dialog; falls back to [`Document::blocking_confirm`].
    pub confirm: Option<Arc<dyn ConfirmService>>,
    /// Modals.
    pub modals: Arc<dyn ModalSurface>,
    /// Clipboard.
    pub clipboard: Arc<dyn Clipboard>,
    /// Printing.
    pub printer: Arc<dyn PrintHost>,
    /// Timers.
    pub timer: Arc<dyn Timer>,
}

impl Host {
    /// Creates a host with the tokio timer and no confirm service.
    pub fn new(
        transport: Arc<dyn Transport>,
        document: Arc<dyn Document>,
        notifier: Arc<dyn Notifier>,
        modals: Arc<dyn ModalSurface>,
        clipboard: Arc<dyn Clipboard>,
        printer: Arc<dyn PrintHost>,
    ) -> Self {
        Self {
            transport,
            document,
            notifier,
            confirm: None,
            modals,
            clipboard,
            printer,
            timer: Arc::new(TokioTimer),
        }
    }

    /// Sets the confirm service.
    pub fn with_confirm(mut self, confirm: Arc<dyn ConfirmService>) -> Self {
        self.confirm = Some(confirm);
        self
    }

    /// Sets the timer.
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("confirm", &self.confirm.is_some())
            .finish_non_exhaustive()
    }
}
