// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Terminal host for the headless client.
//!
//! Implements the controller's host seams for a terminal session: requests go
//! over reqwest, notifications and redirects are printed, confirmations are
//! asked on stdin and the "clipboard" is stdout. Printing is not available.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actionkit::action::ContentKind;
use actionkit::client::{
    ClientEvent, Clipboard, Document, ElementRef, FrameSource, Host, HttpRequest, HttpResponse,
    ModalSurface, NavigateOptions, Notifier, PrintHost, Transport, TransportError,
};
use actionkit::{Notification, NotificationStatus};
use async_trait::async_trait;
use console::style;
use serde_json::Value as JsonValue;

const PRINT_UNAVAILABLE: &str = "Printing is not available in a terminal";

/// Transport backed by a reqwest client.
///
/// Page-relative URLs are resolved against the base URL. The client should
/// keep cookies so the session survives between the attribute fetch and the
/// execution request.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves a page-relative URL.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let mut builder = self.client.request(method, self.resolve(&request.url));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        Ok(HttpResponse { status, body })
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

/// The terminal "page": a record selection and a confirm prompt.
#[derive(Debug, Default)]
pub struct TerminalDocument {
    selected: Vec<JsonValue>,
    assume_yes: bool,
    loading: Mutex<HashSet<String>>,
    navigations: Mutex<Vec<String>>,
}

impl TerminalDocument {
    /// Creates a document with a record selection.
    pub fn new(selected: Vec<JsonValue>, assume_yes: bool) -> Self {
        Self {
            selected,
            assume_yes,
            ..Self::default()
        }
    }

    /// Returns the URLs navigated to.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

impl Document for TerminalDocument {
    fn csrf_token(&self) -> Option<String> {
        None
    }

    fn is_loading(&self, element: &str) -> bool {
        self.loading
            .lock()
            .map(|l| l.contains(element))
            .unwrap_or(false)
    }

    fn set_loading(&self, element: &str, loading: bool) {
        if let Ok(mut set) = self.loading.lock() {
            if loading {
                set.insert(element.to_string());
            } else {
                set.remove(element);
            }
        }
    }

    fn dispatch(&self, element: &str, event: ClientEvent) {
        tracing::debug!(element = %element, event = event.name, "{}", event.detail);
    }

    fn navigate(&self, url: &str, options: NavigateOptions) {
        tracing::debug!(preserve_scroll = options.preserve_scroll, "Navigating");
        println!("{} {}", style("Redirect").cyan().bold(), style(url).underlined());
        if let Ok(mut navigations) = self.navigations.lock() {
            navigations.push(url.to_string());
        }
    }

    fn find(&self, _selector: &str) -> Option<ElementRef> {
        None
    }

    fn element_content(&self, _selector: &str, _kind: ContentKind) -> Option<String> {
        None
    }

    fn selected_text(&self) -> Option<String> {
        None
    }

    fn selected_records(&self) -> Vec<JsonValue> {
        self.selected.clone()
    }

    fn blocking_confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [y/N] ", style(message).yellow());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

/// Prints notifications, colored by status.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification, _duration: Option<Duration>) {
        let title = notification.title.clone().unwrap_or_default();
        let label = match notification.status {
            NotificationStatus::Success => style("✓").green().bold(),
            NotificationStatus::Info => style("i").cyan().bold(),
            NotificationStatus::Warning => style("!").yellow().bold(),
            NotificationStatus::Danger => style("✗").red().bold(),
        };
        match &notification.body {
            Some(body) => println!("{} {} {}", label, style(title).bold(), style(body).dim()),
            None => println!("{} {}", label, style(title).bold()),
        }
    }
}

/// Logs modal transitions; form data comes from the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalModals;

impl ModalSurface for TerminalModals {
    fn mount(&self, modal_id: &str, _html: &str) {
        tracing::debug!(modal = %modal_id, "Mounted modal");
    }

    fn set_visible(&self, modal_id: &str, visible: bool) {
        tracing::debug!(modal = %modal_id, visible, "Modal visibility");
    }

    fn set_submit_busy(&self, modal_id: &str, busy: bool) {
        tracing::debug!(modal = %modal_id, busy, "Modal submit busy");
    }

    fn remove(&self, modal_id: &str) {
        tracing::debug!(modal = %modal_id, "Removed modal");
    }
}

/// Writes "copied" text to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutClipboard;

#[async_trait]
impl Clipboard for StdoutClipboard {
    async fn write_text(&self, text: &str) -> Result<(), String> {
        println!("{}", text);
        Ok(())
    }
}

/// Print host that always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrinter;

#[async_trait]
impl PrintHost for NoPrinter {
    fn inject_style(&self, _css: &str) -> String {
        String::new()
    }

    fn remove_style(&self, _handle: &str) {}

    async fn print_page(&self) -> Result<(), String> {
        Err(PRINT_UNAVAILABLE.to_string())
    }

    fn create_frame(&self, _source: FrameSource) -> Result<String, String> {
        Err(PRINT_UNAVAILABLE.to_string())
    }

    async fn frame_loaded(&self, _frame: &str) {}

    fn print_frame(&self, _frame: &str) -> Result<(), String> {
        Err(PRINT_UNAVAILABLE.to_string())
    }

    async fn after_print(&self, _frame: &str) {}

    fn remove_frame(&self, _frame: &str) {}
}

/// Builds a terminal host talking to a server.
pub fn terminal_host(transport: ReqwestTransport, document: Arc<TerminalDocument>) -> Host {
    Host::new(
        Arc::new(transport),
        document,
        Arc::new(TerminalNotifier),
        Arc::new(TerminalModals),
        Arc::new(StdoutClipboard),
        Arc::new(NoPrinter),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let transport = ReqwestTransport::new(reqwest::Client::new(), "http://localhost:3000/");
        assert_eq!(
            transport.resolve("/_actions/execute?x=1"),
            "http://localhost:3000/_actions/execute?x=1"
        );
        assert_eq!(transport.resolve("https://example.com/a"), "https://example.com/a");
        assert_eq!(transport.resolve("relative"), "http://localhost:3000/relative");
    }

    #[test]
    fn test_document_selection_and_loading() {
        let document = TerminalDocument::new(vec![JsonValue::from(1)], true);
        assert_eq!(document.selected_records(), vec![JsonValue::from(1)]);
        assert!(document.blocking_confirm("Sure?"));

        document.set_loading("btn", true);
        assert!(document.is_loading("btn"));
        document.set_loading("btn", false);
        assert!(!document.is_loading("btn"));
    }

    #[test]
    fn test_clipboard_writes_to_stdout() {
        assert_eq!(tokio_test::block_on(StdoutClipboard.write_text("copied")), Ok(()));
    }

    #[tokio::test]
    async fn test_printing_is_unavailable() {
        assert_eq!(NoPrinter.print_page().await, Err(PRINT_UNAVAILABLE.to_string()));
    }
}
