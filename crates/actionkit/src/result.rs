// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Action results and handler outcomes.
//!
//! [`ActionResult`] is the JSON contract returned by the gateway and consumed
//! by the client controller. Handlers do not build it directly; they return an
//! [`ActionOutcome`] and the gateway normalizes it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Severity of a notification.
///
/// Unknown severities deserialize as [`NotificationStatus::Success`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Success styling.
    #[default]
    Success,
    /// Informational styling.
    Info,
    /// Warning styling.
    Warning,
    /// Danger styling.
    Danger,
}

impl NotificationStatus {
    /// Parses a severity name, falling back to success styling.
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => NotificationStatus::Info,
            "warning" | "warn" => NotificationStatus::Warning,
            "danger" | "error" => NotificationStatus::Danger,
            _ => NotificationStatus::Success,
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Success => "success",
            NotificationStatus::Info => "info",
            NotificationStatus::Warning => "warning",
            NotificationStatus::Danger => "danger",
        }
    }
}

impl<'de> Deserialize<'de> for NotificationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .map(|s| NotificationStatus::parse_lossy(&s))
            .unwrap_or_default())
    }
}

/// A notification shown to the user after an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Notification body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Severity.
    #[serde(default)]
    pub status: NotificationStatus,
}

impl Notification {
    /// Creates a notification with the given status and title.
    pub fn new(status: NotificationStatus, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: None,
            status,
        }
    }

    /// Creates a success notification.
    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationStatus::Success, title)
    }

    /// Creates an info notification.
    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NotificationStatus::Info, title)
    }

    /// Creates a warning notification.
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NotificationStatus::Warning, title)
    }

    /// Creates a danger notification.
    pub fn danger(title: impl Into<String>) -> Self {
        Self::new(NotificationStatus::Danger, title)
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Notification>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Notification>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of executing an action, as returned by the gateway.
///
/// A present `redirect` makes the client navigate instead of showing
/// notifications; the destination page is expected to show them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the action succeeded.
    pub success: bool,
    /// Human readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// URL to navigate to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// Notifications to show, in order.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub notifications: Vec<Notification>,
    /// Arbitrary result data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    /// Any other keys returned by the handler or the gateway (e.g. `error`).
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ActionResult {
    /// Creates an empty successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Creates a failed result with a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Builds a successful result from a handler payload.
    ///
    /// Payload keys are merged over `{ "success": true }`, so a handler may
    /// still report `success: false` explicitly.
    pub fn from_payload(payload: Map<String, JsonValue>) -> Result<Self, serde_json::Error> {
        let mut object = Map::new();
        object.insert("success".to_string(), JsonValue::Bool(true));
        object.extend(payload);
        serde_json::from_value(JsonValue::Object(object))
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the redirect target.
    pub fn with_redirect(mut self, url: impl Into<String>) -> Self {
        self.redirect = Some(url.into());
        self
    }

    /// Appends a notification.
    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    /// Sets the data payload.
    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets an extra top-level key.
    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Returns the machine error code of a gateway failure, if any.
    pub fn error_code(&self) -> Option<&str> {
        self.extra.get("error").and_then(|v| v.as_str())
    }
}

/// What an action handler returns.
///
/// The handler author picks the variant; the gateway turns it into an
/// [`ActionResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Navigate to the given URL.
    Redirect(String),
    /// Show a success message.
    Message(String),
    /// Merge these keys into the result.
    Payload(Map<String, JsonValue>),
    /// Plain success.
    Empty,
}

impl ActionOutcome {
    /// Creates a redirect outcome.
    pub fn redirect(url: impl Into<String>) -> Self {
        ActionOutcome::Redirect(url.into())
    }

    /// Creates a message outcome.
    pub fn message(message: impl Into<String>) -> Self {
        ActionOutcome::Message(message.into())
    }

    /// Creates a payload outcome.
    ///
    /// Objects are merged as-is; any other value is placed under `data`.
    pub fn payload(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(map) => ActionOutcome::Payload(map),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                ActionOutcome::Payload(map)
            }
        }
    }

    /// Normalizes the outcome into a result.
    pub fn into_result(self) -> Result<ActionResult, serde_json::Error> {
        match self {
            ActionOutcome::Redirect(url) => Ok(ActionResult::success().with_redirect(url)),
            ActionOutcome::Message(message) => Ok(ActionResult::success().with_message(message)),
            ActionOutcome::Payload(map) => ActionResult::from_payload(map),
            ActionOutcome::Empty => Ok(ActionResult::success()),
        }
    }
}

impl From<()> for ActionOutcome {
    fn from(_: ()) -> Self {
        ActionOutcome::Empty
    }
}

impl From<String> for ActionOutcome {
    fn from(message: String) -> Self {
        ActionOutcome::Message(message)
    }
}

impl From<&str> for ActionOutcome {
    fn from(message: &str) -> Self {
        ActionOutcome::Message(message.to_string())
    }
}
