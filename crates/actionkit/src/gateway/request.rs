// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Execution request parsing.
//!
//! GET/HEAD requests carry `action_token`, `record` and `data` in the query
//! string with `record` and `data` JSON-encoded. Other methods send a JSON
//! body with the same three fields; form-urlencoded bodies use the query
//! encoding. All three decode to the same [`ExecutionRequest`].

use crate::error::ActionError;
use crate::protocol::{fields, ExecutionRequest, HttpMethod};
use serde_json::{Map, Value as JsonValue};

/// Errors that can occur while parsing an execution request.
#[derive(Debug, thiserror::Error)]
pub enum BodyParseError {
    /// The body or a JSON-encoded parameter is not valid JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    /// A field has the wrong shape.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<BodyParseError> for ActionError {
    fn from(err: BodyParseError) -> Self {
        ActionError::InvalidPayload(err.to_string())
    }
}

/// A raw execution request as received by an HTTP adapter.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionBody<'a> {
    /// Request method.
    pub method: HttpMethod,
    /// Raw query string, without the leading `?`.
    pub query: Option<&'a str>,
    /// `Content-Type` header.
    pub content_type: Option<&'a str>,
    /// Raw body bytes.
    pub body: &'a [u8],
}

impl<'a> ExecutionBody<'a> {
    /// Creates a body-less request.
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            query: None,
            content_type: None,
            body: &[],
        }
    }

    /// Sets the query string.
    pub fn with_query(mut self, query: Option<&'a str>) -> Self {
        self.query = query.map(|q| q.trim_start_matches('?'));
        self
    }

    /// Sets the body and its content type.
    pub fn with_body(mut self, body: &'a [u8], content_type: Option<&'a str>) -> Self {
        self.body = body;
        self.content_type = content_type;
        self
    }

    /// Parses the request.
    ///
    /// For body methods a token missing from the body is looked up in the
    /// query string.
    pub fn parse(&self) -> Result<ExecutionRequest, BodyParseError> {
        let query = self.query.unwrap_or("");

        if self.method.uses_query() || self.body.iter().all(|b| b.is_ascii_whitespace()) {
            return parse_pairs(query.as_bytes());
        }

        let content_type = self.content_type.unwrap_or("");
        let mut request = if content_type.contains("application/x-www-form-urlencoded") {
            parse_pairs(self.body)?
        } else {
            parse_json_body(self.body)?
        };

        if request.action_token.is_none() && !query.is_empty() {
            request.action_token = parse_pairs(query.as_bytes())?.action_token;
        }
        Ok(request)
    }
}

/// Parses a JSON execution body.
pub fn parse_json_body(bytes: &[u8]) -> Result<ExecutionRequest, BodyParseError> {
    let value: JsonValue =
        serde_json::from_slice(bytes).map_err(|e| BodyParseError::InvalidJson(e.to_string()))?;

    let JsonValue::Object(mut object) = value else {
        return Err(BodyParseError::InvalidField {
            field: "body",
            reason: "expected a JSON object".to_string(),
        });
    };

    let action_token = match object.remove(fields::ACTION_TOKEN) {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(token)) => Some(token),
        Some(_) => {
            return Err(BodyParseError::InvalidField {
                field: fields::ACTION_TOKEN,
                reason: "expected a string".to_string(),
            })
        }
    };

    Ok(ExecutionRequest {
        action_token: action_token.filter(|t| !t.trim().is_empty()),
        record: non_null(object.remove(fields::RECORD)),
        data: data_object(object.remove(fields::DATA))?,
    })
}

/// Parses query-encoded pairs (query string or form-urlencoded body).
///
/// `record` falls back to the raw string when it is not JSON; `data` must be
/// a JSON object.
pub fn parse_pairs(bytes: &[u8]) -> Result<ExecutionRequest, BodyParseError> {
    let mut request = ExecutionRequest::default();

    for (key, value) in form_urlencoded::parse(bytes) {
        match key.as_ref() {
            fields::ACTION_TOKEN => {
                request.action_token = Some(value.into_owned()).filter(|t| !t.trim().is_empty());
            }
            fields::RECORD => {
                let record = serde_json::from_str(&value)
                    .unwrap_or_else(|_| JsonValue::String(value.into_owned()));
                request.record = non_null(Some(record));
            }
            fields::DATA => {
                if value.trim().is_empty() {
                    continue;
                }
                let data: JsonValue = serde_json::from_str(&value)
                    .map_err(|e| BodyParseError::InvalidJson(e.to_string()))?;
                request.data = data_object(Some(data))?;
            }
            _ => {}
        }
    }

    Ok(request)
}

fn non_null(value: Option<JsonValue>) -> Option<JsonValue> {
    value.filter(|v| !v.is_null())
}

fn data_object(value: Option<JsonValue>) -> Result<Map<String, JsonValue>, BodyParseError> {
    match value {
        None | Some(JsonValue::Null) => Ok(Map::new()),
        Some(JsonValue::Object(map)) => Ok(map),
        Some(JsonValue::Array(items)) if items.is_empty() => Ok(Map::new()),
        Some(_) => Err(BodyParseError::InvalidField {
            field: fields::DATA,
            reason: "expected an object".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_body() {
        let body = br#"{"action_token":"tok","record":{"id":1},"data":{"reason":"spam"}}"#;
        let request = ExecutionBody::new(HttpMethod::Post)
            .with_body(body, Some("application/json"))
            .parse()
            .unwrap();

        assert_eq!(request.action_token.as_deref(), Some("tok"));
        assert_eq!(request.record, Some(json!({ "id": 1 })));
        assert_eq!(request.data["reason"], "spam");
    }

    #[test]
    fn test_get_and_post_decode_identically() {
        let logical = ExecutionRequest::new("tok")
            .with_record(Some(json!([1, 2, 3])))
            .with_data(json!({ "notify": false, "note": "a&b=c" }).as_object().cloned().unwrap());

        let query: String = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(logical.to_query_pairs())
            .finish();
        let from_get = ExecutionBody::new(HttpMethod::Get)
            .with_query(Some(&query))
            .parse()
            .unwrap();

        let body = logical.to_json_body();
        let from_post = ExecutionBody::new(HttpMethod::Post)
            .with_body(body.as_bytes(), Some("application/json"))
            .parse()
            .unwrap();

        assert_eq!(from_get, logical);
        assert_eq!(from_post, logical);
    }

    #[test]
    fn test_form_urlencoded_body() {
        let body = b"action_token=tok&record=7&data=%7B%22a%22%3A1%7D";
        let request = ExecutionBody::new(HttpMethod::Post)
            .with_body(body, Some("application/x-www-form-urlencoded"))
            .parse()
            .unwrap();

        assert_eq!(request.record, Some(json!(7)));
        assert_eq!(request.data["a"], 1);
    }

    #[test]
    fn test_non_json_record_stays_a_string() {
        let request = parse_pairs(b"action_token=tok&record=abc-123").unwrap();
        assert_eq!(request.record, Some(json!("abc-123")));
    }

    #[test]
    fn test_missing_token_is_not_a_parse_error() {
        let request = ExecutionBody::new(HttpMethod::Post)
            .with_body(b"{}", Some("application/json"))
            .parse()
            .unwrap();
        assert!(request.action_token.is_none());

        let request = ExecutionBody::new(HttpMethod::Get).parse().unwrap();
        assert!(request.action_token.is_none());
    }

    #[test]
    fn test_token_falls_back_to_query() {
        let request = ExecutionBody::new(HttpMethod::Delete)
            .with_query(Some("?action_token=tok"))
            .with_body(br#"{"record":null}"#, Some("application/json"))
            .parse()
            .unwrap();
        assert_eq!(request.action_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_invalid_data_is_rejected() {
        assert!(matches!(
            parse_pairs(b"action_token=tok&data=%5B1%5D"),
            Err(BodyParseError::InvalidField { field: "data", .. })
        ));
        assert!(matches!(
            parse_pairs(b"action_token=tok&data=%7Bnope"),
            Err(BodyParseError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_json_body(br#"{"action_token": 5}"#),
            Err(BodyParseError::InvalidField { field: "action_token", .. })
        ));
        assert!(parse_json_body(b"not json").is_err());

        let err: ActionError = parse_json_body(b"[]").unwrap_err().into();
        assert_eq!(err.code(), "invalid_payload");
    }
}
