// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Type definitions for the callback store.

use crate::result::ActionOutcome;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

/// Result returned by action handlers.
pub type HandlerResult = Result<ActionOutcome, Box<dyn std::error::Error + Send + Sync>>;

/// A server-side action handler.
pub type ActionHandler = Arc<dyn Fn(ActionInput) -> HandlerResult + Send + Sync>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// What a handler receives when its action is executed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionInput {
    /// The action name.
    pub name: String,
    /// The record sent by the client (an id list for bulk actions).
    pub record: Option<JsonValue>,
    /// Form data collected by the modal.
    pub data: Map<String, JsonValue>,
}

impl ActionInput {
    /// Returns a form field.
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.data.get(name)
    }

    /// Returns a form field as a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(|v| v.as_str())
    }

    /// Returns a form field as a boolean (missing fields are false).
    pub fn bool_field(&self, name: &str) -> bool {
        match self.data.get(name) {
            Some(JsonValue::Bool(b)) => *b,
            Some(JsonValue::String(s)) => matches!(s.as_str(), "1" | "true" | "on" | "yes"),
            Some(JsonValue::Number(n)) => n.as_i64().map(|n| n != 0).unwrap_or(false),
            _ => false,
        }
    }

    /// Returns the record as a list of ids.
    ///
    /// Arrays yield their items, `null` or a missing record yields nothing,
    /// and any other value is a single id.
    pub fn record_ids(&self) -> Vec<JsonValue> {
        match &self.record {
            Some(JsonValue::Array(items)) => items.clone(),
            Some(JsonValue::Null) | None => Vec::new(),
            Some(other) => vec![other.clone()],
        }
    }
}

/// A stored registration.
#[derive(Clone)]
pub struct CallbackEntry {
    /// Action name.
    pub name: String,
    /// The handler to run.
    pub handler: ActionHandler,
}

impl CallbackEntry {
    /// Creates an entry.
    pub fn new(name: impl Into<String>, handler: ActionHandler) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl fmt::Debug for CallbackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Options for the `put` operation.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Unix timestamp when the entry should expire.
    pub expiration: Option<u64>,
    /// Time-to-live in seconds from now.
    pub expiration_ttl: Option<u64>,
}

impl PutOptions {
    /// Creates options with a time-to-live.
    pub fn ttl(seconds: u64) -> Self {
        Self {
            expiration: None,
            expiration_ttl: Some(seconds),
        }
    }

    /// Calculate the actual expiration timestamp.
    ///
    /// `expiration` wins over `expiration_ttl`; neither means no expiration.
    /// A TTL too large to represent also means no expiration.
    pub fn calculate_expiration(&self) -> Option<u64> {
        if let Some(exp) = self.expiration {
            Some(exp)
        } else if let Some(ttl) = self.expiration_ttl {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            now.checked_add(ttl)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_ids() {
        let mut input = ActionInput::default();
        assert!(input.record_ids().is_empty());

        input.record = Some(json!([1, 2, 3]));
        assert_eq!(input.record_ids(), vec![json!(1), json!(2), json!(3)]);

        input.record = Some(json!({ "id": 4 }));
        assert_eq!(input.record_ids().len(), 1);
    }

    #[test]
    fn test_bool_field() {
        let mut input = ActionInput::default();
        input.data.insert("a".into(), json!(true));
        input.data.insert("b".into(), json!("0"));
        input.data.insert("c".into(), json!("on"));
        assert!(input.bool_field("a"));
        assert!(!input.bool_field("b"));
        assert!(input.bool_field("c"));
        assert!(!input.bool_field("missing"));
    }

    #[test]
    fn test_expiration_precedence() {
        let options = PutOptions {
            expiration: Some(10),
            expiration_ttl: Some(1000),
        };
        assert_eq!(options.calculate_expiration(), Some(10));
        assert_eq!(PutOptions::default().calculate_expiration(), None);
        assert!(PutOptions::ttl(60).calculate_expiration().unwrap() > 60);
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        assert_eq!(PutOptions::ttl(u64::MAX).calculate_expiration(), None);
    }
}
