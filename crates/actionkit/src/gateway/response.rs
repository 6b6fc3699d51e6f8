// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Gateway response type.

use crate::error::ActionError;
use crate::result::ActionResult;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Response produced by [`Gateway::execute`](super::Gateway::execute).
///
/// The HTTP adapter writes `status` as the response status and `body` as the
/// JSON response body.
///
/// # Example
///
/// ```rust
/// use actionkit::{ActionError, ActionResult, GatewayResponse};
///
/// let response = GatewayResponse::ok(ActionResult::success().with_message("Saved"));
/// assert_eq!(response.status, 200);
///
/// let response = GatewayResponse::from_error(&ActionError::ActionExpired, false);
/// assert_eq!(response.status, 400);
/// assert_eq!(response.body.error_code(), Some("action_expired"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// HTTP status code (200, 400 or 500).
    pub status: u16,

    /// JSON body.
    pub body: ActionResult,
}

impl GatewayResponse {
    /// Creates a 200 response.
    pub fn ok(body: ActionResult) -> Self {
        Self { status: 200, body }
    }

    /// Creates the failure response for a gateway error.
    ///
    /// The body is `{success: false, message, error: <code>}`.
    pub fn from_error(error: &ActionError, debug: bool) -> Self {
        Self {
            status: error.status(),
            body: ActionResult::failure(error.public_message(debug))
                .with_extra("error", JsonValue::String(error.code().to_string())),
        }
    }

    /// Returns true for 2xx responses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 4xx and 5xx responses.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Serializes the body.
    pub fn body_json(&self) -> String {
        serde_json::to_string(&self.body)
            .unwrap_or_else(|_| r#"{"success":false,"message":"Action execution failed"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_response() {
        let response = GatewayResponse::ok(ActionResult::success());
        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert!(!response.is_error());
        assert_eq!(response.body_json(), r#"{"success":true}"#);
    }

    #[test]
    fn test_error_body_shape() {
        let response = GatewayResponse::from_error(&ActionError::MissingToken, false);
        assert_eq!(response.status, 400);
        assert!(response.is_error());

        let value: JsonValue = serde_json::from_str(&response.body_json()).unwrap();
        assert_eq!(
            value,
            json!({ "success": false, "message": "Missing action token", "error": "missing_token" })
        );
    }

    #[test]
    fn test_execution_failure_redaction() {
        let err = ActionError::ExecutionFailed("disk full".into());

        let response = GatewayResponse::from_error(&err, false);
        assert_eq!(response.status, 500);
        assert_eq!(response.body.message.as_deref(), Some("Action execution failed"));

        let response = GatewayResponse::from_error(&err, true);
        assert_eq!(response.body.message.as_deref(), Some("disk full"));
    }
}
