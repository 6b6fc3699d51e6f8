// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Applying an action result to the page.

use super::config::ActionConfig;
use super::error::ClientError;
use super::host::{events, ClientEvent, Host};
use crate::result::{ActionResult, Notification};
use serde_json::Value as JsonValue;

/// Title of the notification shown when a request fails in transit.
pub const GENERIC_ERROR_TITLE: &str = "Something went wrong";

/// Body of the notification shown when a request fails in transit.
pub const GENERIC_ERROR_BODY: &str = "The action could not be completed. Please try again.";

/// Applies a parsed result.
///
/// On success: navigate when `redirect` is set (notifications are left to the
/// destination page), otherwise show the notifications or the plain message;
/// then dispatch `action:success` and, for bulk actions that ask for it,
/// `bulk:deselect`. On failure: show the message as a danger notification and
/// dispatch `action:error`; the returned error is handed to the caller's
/// error callback.
pub(crate) fn reconcile(
    host: &Host,
    element: &str,
    config: &ActionConfig,
    result: &ActionResult,
) -> Result<(), ClientError> {
    let detail = serde_json::to_value(result).unwrap_or(JsonValue::Null);

    if result.success {
        if let Some(url) = &result.redirect {
            host.document.navigate(url, config.navigate_options());
        } else if !result.notifications.is_empty() {
            for notification in &result.notifications {
                host.notifier.notify(notification, None);
            }
        } else if let Some(message) = &result.message {
            host.notifier.notify(&Notification::success(message.clone()), None);
        }

        host.document
            .dispatch(element, ClientEvent::new(events::ACTION_SUCCESS, detail));

        if config.bulk && config.deselect_records_after_completion {
            let records = config.record.clone().unwrap_or(JsonValue::Null);
            host.document
                .dispatch(element, ClientEvent::new(events::BULK_DESELECT, records));
        }
        return Ok(());
    }

    if let Some(message) = &result.message {
        host.notifier.notify(&Notification::danger(message.clone()), None);
    }
    host.document
        .dispatch(element, ClientEvent::new(events::ACTION_ERROR, detail));

    Err(ClientError::Declared(
        result
            .message
            .clone()
            .unwrap_or_else(|| "Action failed".to_string()),
    ))
}

/// Shows the generic failure notification for transport and parse errors.
pub(crate) fn report_exception(host: &Host) {
    host.notifier
        .notify(&Notification::danger(GENERIC_ERROR_TITLE).body(GENERIC_ERROR_BODY), None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::host::NavigateOptions;
    use crate::client::test_support::TestHost;
    use crate::protocol::{attrs, Attributes};
    use crate::result::NotificationStatus;
    use serde_json::json;

    fn config(pairs: &[(&str, &str)]) -> ActionConfig {
        let attributes: Attributes = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ActionConfig::from_attributes(&attributes)
    }

    #[test]
    fn test_redirect_suppresses_notifications() {
        let test = TestHost::new();
        let result = ActionResult::success()
            .with_redirect("/posts")
            .with_message("Saved")
            .with_notification(Notification::success("Saved"));

        let config = config(&[(attrs::PRESERVE_SCROLL, "true")]);
        reconcile(&test.host, "btn", &config, &result).unwrap();

        assert!(test.notifier.notifications().is_empty());
        assert_eq!(
            test.document.navigations(),
            vec![(
                "/posts".to_string(),
                NavigateOptions {
                    preserve_scroll: true,
                    preserve_state: false
                }
            )]
        );
        assert_eq!(test.document.event_names("btn"), vec!["action:success"]);
    }

    #[test]
    fn test_notifications_in_order_with_fallback_status() {
        let test = TestHost::new();
        let result: ActionResult = serde_json::from_value(json!({
            "success": true,
            "message": "ignored",
            "notifications": [
                { "title": "One", "status": "info" },
                { "title": "Two", "status": "mystery" }
            ]
        }))
        .unwrap();

        reconcile(&test.host, "btn", &config(&[]), &result).unwrap();

        let shown = test.notifier.notifications();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].title.as_deref(), Some("One"));
        assert_eq!(shown[0].status, NotificationStatus::Info);
        assert_eq!(shown[1].status, NotificationStatus::Success);
    }

    #[test]
    fn test_plain_message_becomes_success_notification() {
        let test = TestHost::new();
        let result = ActionResult::success().with_message("Archived");
        reconcile(&test.host, "btn", &config(&[]), &result).unwrap();

        let shown = test.notifier.notifications();
        assert_eq!(shown, vec![Notification::success("Archived")]);
    }

    #[test]
    fn test_failure() {
        let test = TestHost::new();
        let result = ActionResult::failure("Nope");
        let err = reconcile(&test.host, "btn", &config(&[]), &result).unwrap_err();

        assert_eq!(err, ClientError::Declared("Nope".into()));
        assert_eq!(test.notifier.notifications(), vec![Notification::danger("Nope")]);
        assert_eq!(test.document.event_names("btn"), vec!["action:error"]);
    }

    #[test]
    fn test_bulk_deselect_event() {
        let test = TestHost::new();
        let mut config = config(&[(attrs::BULK, "true"), (attrs::DESELECT_RECORDS, "true")]);
        config.record = Some(json!([1, 2]));

        reconcile(&test.host, "btn", &config, &ActionResult::success()).unwrap();
        assert_eq!(
            test.document.event_names("btn"),
            vec!["action:success", "bulk:deselect"]
        );
    }
}
