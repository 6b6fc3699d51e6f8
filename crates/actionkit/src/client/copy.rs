// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Clipboard copy handler.

use super::host::{events, ClientEvent, Host};
use crate::action::{CopyFormat, CopyOptions, CopySource};
use crate::result::Notification;
use serde_json::{json, Value as JsonValue};
use std::time::Duration;

/// Formats copied text.
///
/// JSON output pretty-prints the source when it parses and falls back to the
/// raw text otherwise.
pub fn format_copy_text(text: &str, format: CopyFormat) -> String {
    match format {
        CopyFormat::Text => text.to_string(),
        CopyFormat::Json => serde_json::from_str::<JsonValue>(text)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
            .unwrap_or_else(|| text.to_string()),
    }
}

/// Resolves the text a copy action would write.
pub fn resolve_copy_text(host: &Host, options: &CopyOptions) -> Option<String> {
    let raw = match &options.source {
        CopySource::Value(value) | CopySource::Attribute(value) => Some(value.clone()),
        CopySource::Element { selector, content } => {
            host.document.element_content(selector, *content)
        }
        CopySource::Selection => host.document.selected_text().filter(|s| !s.is_empty()),
    }?;
    Some(format_copy_text(&raw, options.format))
}

/// Runs a copy action; returns true when the clipboard was written.
pub(crate) async fn run_copy(host: &Host, element: &str, options: &CopyOptions) -> bool {
    let written = match resolve_copy_text(host, options) {
        Some(text) => host
            .clipboard
            .write_text(&text)
            .await
            .map(|()| text),
        None => Err("Nothing to copy".to_string()),
    };

    let duration = Some(Duration::from_millis(options.duration_ms));
    match written {
        Ok(text) => {
            host.document
                .dispatch(element, ClientEvent::new(events::COPY_SUCCESS, json!({ "text": text })));
            if options.notify {
                host.notifier
                    .notify(&Notification::new(options.status, options.message.clone()), duration);
            }
            true
        }
        Err(error) => {
            tracing::warn!("Copy failed: {}", error);
            host.document
                .dispatch(element, ClientEvent::new(events::COPY_ERROR, json!({ "error": error })));
            if options.notify {
                host.notifier
                    .notify(&Notification::danger(options.error_message.clone()), duration);
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ContentKind;
    use crate::client::test_support::TestHost;
    use crate::result::NotificationStatus;

    #[test]
    fn test_json_is_pretty_printed() {
        assert_eq!(format_copy_text(r#"{"a":1}"#, CopyFormat::Json), "{\n  \"a\": 1\n}");
        assert_eq!(format_copy_text("not json", CopyFormat::Json), "not json");
        assert_eq!(format_copy_text(r#"{"a":1}"#, CopyFormat::Text), r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_copy_value_as_json() {
        let test = TestHost::new();
        let options = CopyOptions::value(r#"{"a":1}"#).copy_as(CopyFormat::Json);

        assert!(run_copy(&test.host, "btn", &options).await);
        assert_eq!(test.clipboard.written(), vec!["{\n  \"a\": 1\n}".to_string()]);
        assert_eq!(test.document.event_names("btn"), vec!["copy:success"]);

        let shown = test.notifier.shown();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0.title.as_deref(), Some("Copied to clipboard"));
        assert_eq!(shown[0].1, Some(Duration::from_millis(2000)));
    }

    #[tokio::test]
    async fn test_copy_element_content() {
        let test = TestHost::new();
        test.document.set_content("#code", "let x = 1;");
        let options = CopyOptions::element("#code")
            .notify(false);

        assert!(run_copy(&test.host, "btn", &options).await);
        assert_eq!(test.clipboard.written(), vec!["let x = 1;".to_string()]);
        assert!(test.notifier.shown().is_empty());
        assert_eq!(test.document.content_requests(), vec![("#code".to_string(), ContentKind::Text)]);
    }

    #[tokio::test]
    async fn test_empty_selection_fails() {
        let test = TestHost::new();
        let options = CopyOptions::selection().status(NotificationStatus::Info);

        assert!(!run_copy(&test.host, "btn", &options).await);
        assert!(test.clipboard.written().is_empty());
        assert_eq!(test.document.event_names("btn"), vec!["copy:error"]);
        assert_eq!(test.notifier.notifications(), vec![Notification::danger("Copy failed")]);
    }

    #[tokio::test]
    async fn test_clipboard_rejection() {
        let test = TestHost::new();
        test.clipboard.fail_with("permission denied");
        let options = CopyOptions::value("abc").error_message("No clipboard access");

        assert!(!run_copy(&test.host, "btn", &options).await);
        let events = test.document.events("btn");
        assert_eq!(events[0].detail["error"], "permission denied");
        assert_eq!(
            test.notifier.notifications(),
            vec![Notification::danger("No clipboard access")]
        );
    }
}
