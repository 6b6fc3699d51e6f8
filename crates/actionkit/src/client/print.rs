// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Print handler.
//!
//! Page prints use the page itself, optionally with a temporary style block.
//! Element, markup and URL prints go through an isolated frame: wait for its
//! load signal (bounded, since written documents do not always fire one),
//! wait the configured delay, open the dialog, then remove the frame on its
//! "after print" signal or after a fallback timeout, whichever comes first.

use super::host::{events, ClientEvent, FrameSource, Host};
use crate::action::{ContentKind, PrintOptions, PrintTarget};
use crate::html;
use serde_json::json;
use std::time::Duration;

/// Longest wait for a frame's load signal.
pub const FRAME_LOAD_TIMEOUT: Duration = Duration::from_millis(1000);

/// Longest wait for a frame's "after print" signal before removing it.
pub const AFTER_PRINT_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_TITLE: &str = "Print";

/// Builds the frame content for a target, `None` for page prints.
pub fn frame_source(host: &Host, options: &PrintOptions) -> Result<Option<FrameSource>, String> {
    let title = options.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let css = options.css.as_deref();

    match &options.target {
        PrintTarget::Page => Ok(None),
        PrintTarget::Element(selector) => host
            .document
            .element_content(selector, ContentKind::Outer)
            .map(|markup| Some(FrameSource::Document(html::document(title, css, &markup))))
            .ok_or_else(|| format!("Print target not found: {}", selector)),
        PrintTarget::Html(markup) => Ok(Some(FrameSource::Document(html::document(title, css, markup)))),
        PrintTarget::Url(url) => Ok(Some(FrameSource::Url(url.clone()))),
    }
}

/// Runs a print action; returns true when the dialog was opened.
pub(crate) async fn run_print(host: &Host, element: &str, options: &PrintOptions) -> bool {
    let delay = Duration::from_millis(options.delay_ms);

    let outcome = match frame_source(host, options) {
        Ok(None) => print_page(host, options.css.as_deref(), delay).await.map(|()| None),
        Ok(Some(source)) => open_frame(host, source, delay).await.map(Some),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(frame) => {
            host.document
                .dispatch(element, ClientEvent::new(events::PRINT_SUCCESS, json!({})));
            if let Some(frame) = frame {
                teardown_frame(host, &frame).await;
            }
            true
        }
        Err(error) => {
            tracing::warn!("Print failed: {}", error);
            host.document
                .dispatch(element, ClientEvent::new(events::PRINT_ERROR, json!({ "error": error })));
            false
        }
    }
}

async fn print_page(host: &Host, css: Option<&str>, delay: Duration) -> Result<(), String> {
    let style = css
        .filter(|css| !css.trim().is_empty())
        .map(|css| host.printer.inject_style(css));

    if !delay.is_zero() {
        host.timer.sleep(delay).await;
    }
    let printed = host.printer.print_page().await;

    if let Some(style) = style {
        host.printer.remove_style(&style);
    }
    printed
}

async fn open_frame(host: &Host, source: FrameSource, delay: Duration) -> Result<String, String> {
    let frame = host.printer.create_frame(source)?;

    tokio::select! {
        _ = host.printer.frame_loaded(&frame) => {}
        _ = host.timer.sleep(FRAME_LOAD_TIMEOUT) => {
            tracing::debug!(frame = %frame, "Print frame did not signal load; printing anyway");
        }
    }

    if !delay.is_zero() {
        host.timer.sleep(delay).await;
    }

    match host.printer.print_frame(&frame) {
        Ok(()) => Ok(frame),
        Err(err) => {
            host.printer.remove_frame(&frame);
            Err(err)
        }
    }
}

async fn teardown_frame(host: &Host, frame: &str) {
    tokio::select! {
        _ = host.printer.after_print(frame) => {}
        _ = host.timer.sleep(AFTER_PRINT_TIMEOUT) => {}
    }
    host.printer.remove_frame(frame);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::TestHost;

    #[tokio::test]
    async fn test_print_page_with_css() {
        let test = TestHost::new();
        let options = PrintOptions::page().css("nav { display: none }");

        assert!(run_print(&test.host, "btn", &options).await);
        assert_eq!(
            test.printer.log(),
            vec!["inject_style:nav { display: none }", "print_page", "remove_style:style-1"]
        );
        assert_eq!(test.document.event_names("btn"), vec!["print:success"]);
    }

    #[tokio::test]
    async fn test_print_html_in_frame() {
        let test = TestHost::new();
        let options = PrintOptions::html("<h1>Invoice</h1>").title("Invoice 7").delay_ms(250);

        assert!(run_print(&test.host, "btn", &options).await);
        assert_eq!(
            test.printer.log(),
            vec!["create_frame", "frame_loaded:frame-1", "print_frame:frame-1", "after_print:frame-1", "remove_frame:frame-1"]
        );
        let frames = test.printer.frames();
        match &frames[0] {
            FrameSource::Document(doc) => {
                assert!(doc.starts_with("<!DOCTYPE html>"));
                assert!(doc.contains("<title>Invoice 7</title>"));
                assert!(doc.contains("<h1>Invoice</h1>"));
            }
            other => panic!("unexpected frame source: {:?}", other),
        }
        assert!(test.timer.slept().contains(&Duration::from_millis(250)));
    }

    #[tokio::test]
    async fn test_silent_frame_falls_back_to_timeouts() {
        let test = TestHost::new();
        test.printer.set_silent(true);
        let options = PrintOptions::url("/invoices/7.pdf");

        assert!(run_print(&test.host, "btn", &options).await);
        assert_eq!(
            test.printer.log(),
            vec!["create_frame", "print_frame:frame-1", "remove_frame:frame-1"]
        );
        let slept = test.timer.slept();
        assert!(slept.contains(&FRAME_LOAD_TIMEOUT));
        assert!(slept.contains(&AFTER_PRINT_TIMEOUT));
    }

    #[tokio::test]
    async fn test_missing_element_fails() {
        let test = TestHost::new();
        let options = PrintOptions::element("#invoice");

        assert!(!run_print(&test.host, "btn", &options).await);
        assert!(test.printer.log().is_empty());
        assert_eq!(test.document.event_names("btn"), vec!["print:error"]);
    }

    #[tokio::test]
    async fn test_print_element_uses_outer_markup() {
        let test = TestHost::new();
        test.document.set_content("#invoice", "<section id=\"invoice\">Total: 7</section>");
        let options = PrintOptions::element("#invoice");

        assert!(run_print(&test.host, "btn", &options).await);
        match &test.printer.frames()[0] {
            FrameSource::Document(doc) => assert!(doc.contains("<section id=\"invoice\">Total: 7</section>")),
            other => panic!("unexpected frame source: {:?}", other),
        }
    }
}
