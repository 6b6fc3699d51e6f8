// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Token issuance and the execution gateway.
//!
//! Issuing a token registers the handler in the [`CallbackStore`] under a fresh
//! `action_<name>_<suffix>` id for the caller's session and returns the
//! encrypted `{action_id, name}`. Executing a token runs this state machine:
//!
//! | Condition                         | Result                    |
//! |-----------------------------------|---------------------------|
//! | no token                          | `missing_token` (400)     |
//! | token fails to decrypt            | `invalid_token` (400)     |
//! | decrypted payload lacks action_id | `invalid_payload` (400)   |
//! | no live registration              | `action_expired` (400)    |
//! | handler returns `Err` or panics   | `execution_failed` (500)  |
//! | handler returns an outcome        | normalized result (200)   |
//!
//! The registration is removed before the handler runs, so a token can only
//! ever be executed once, even under concurrent requests.

mod request;
mod response;

pub use request::{parse_json_body, parse_pairs, BodyParseError, ExecutionBody};
pub use response::GatewayResponse;

use crate::error::{ActionError, Result};
use crate::protocol::ExecutionRequest;
use crate::result::ActionResult;
use crate::store::{ActionHandler, ActionInput, CallbackEntry, CallbackStore, PutOptions, StoreResult};
use crate::token::{TokenCipher, TokenError, TokenPayload};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Default path of the execution endpoint.
pub const DEFAULT_ENDPOINT: &str = "/_actions/execute";

/// Default lifetime of a registration in seconds.
pub const DEFAULT_TTL: u64 = 7200;

const ACTION_ID_ALPHABET: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
    'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
    'V', 'W', 'X', 'Y', 'Z',
];

lazy_static! {
    static ref NAME_UNSAFE: Regex = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
}

/// Gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// URL of the execution endpoint, rendered into buttons.
    pub endpoint: String,
    /// Surface raw handler error messages to clients.
    pub debug: bool,
    /// Registration lifetime in seconds; `None` keeps entries until consumed.
    pub ttl: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            debug: false,
            ttl: Some(DEFAULT_TTL),
        }
    }
}

impl GatewayConfig {
    /// Sets the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets debug mode.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the registration lifetime.
    pub fn with_ttl(mut self, ttl: Option<u64>) -> Self {
        self.ttl = ttl;
        self
    }
}

struct GatewayInner {
    cipher: TokenCipher,
    store: Arc<dyn CallbackStore>,
    config: GatewayConfig,
}

/// Issues action tokens and executes them.
///
/// Cheap to clone; clones share the cipher and the store.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    /// Creates a gateway.
    pub fn new(cipher: TokenCipher, store: Arc<dyn CallbackStore>, config: GatewayConfig) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                cipher,
                store,
                config,
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Returns the callback store.
    pub fn store(&self) -> &Arc<dyn CallbackStore> {
        &self.inner.store
    }

    /// Returns a scope for issuing tokens bound to `session_id`.
    pub fn session(&self, session_id: impl Into<String>) -> SessionScope {
        SessionScope {
            gateway: self.clone(),
            session_id: session_id.into(),
        }
    }

    /// Removes expired registrations from every session.
    pub fn purge_expired(&self) -> StoreResult<usize> {
        self.inner.store.purge_expired()
    }

    /// Drops every registration of a session.
    pub fn end_session(&self, session_id: &str) -> StoreResult<usize> {
        self.inner.store.clear_session(session_id)
    }

    /// Executes a request for the given session.
    ///
    /// Never fails: every error becomes a failure response.
    pub fn execute(&self, session_id: &str, request: &ExecutionRequest) -> GatewayResponse {
        match self.run(session_id, request) {
            Ok(result) => GatewayResponse::ok(result),
            Err(err) => {
                match &err {
                    ActionError::ExecutionFailed(message) => {
                        tracing::error!(session = session_id, error = %message, "Action execution failed");
                    }
                    ActionError::Store(_) | ActionError::Token(_) => {
                        tracing::error!(session = session_id, error = %err, "Action gateway error");
                    }
                    _ => {
                        tracing::warn!(session = session_id, code = err.code(), "Action rejected: {}", err);
                    }
                }
                GatewayResponse::from_error(&err, self.inner.config.debug)
            }
        }
    }

    fn run(&self, session_id: &str, request: &ExecutionRequest) -> Result<ActionResult> {
        let token = request
            .action_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ActionError::MissingToken)?;

        let payload = self.inner.cipher.decrypt(token).map_err(|err| match err {
            TokenError::Payload(reason) => ActionError::InvalidPayload(reason),
            other => {
                tracing::debug!("Token rejected: {}", other);
                ActionError::InvalidToken
            }
        })?;

        let action_id = payload
            .get("action_id")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ActionError::InvalidPayload("missing action_id".to_string()))?;

        // Removed before the handler runs; a failing handler still consumes it.
        let entry = self
            .inner
            .store
            .take(session_id, action_id)?
            .ok_or(ActionError::ActionExpired)?;

        tracing::debug!(action = %entry.name, action_id, "Executing action");

        let input = ActionInput {
            name: entry.name.clone(),
            record: request.record.clone(),
            data: request.data.clone(),
        };
        let handler = entry.handler;

        let outcome = match catch_unwind(AssertUnwindSafe(|| handler(input))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => return Err(ActionError::ExecutionFailed(err.to_string())),
            Err(panic) => return Err(ActionError::ExecutionFailed(panic_message(panic))),
        };

        outcome
            .into_result()
            .map_err(|e| ActionError::ExecutionFailed(format!("Invalid action result: {}", e)))
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Action handler panicked".to_string()
    }
}

/// Generates a registration id for an action name.
pub fn generate_action_id(name: &str) -> String {
    let name = NAME_UNSAFE.replace_all(name, "_");
    format!(
        "action_{}_{}",
        name,
        nanoid::nanoid!(16, &ACTION_ID_ALPHABET)
    )
}

/// Issues tokens for one session.
#[derive(Clone, Debug)]
pub struct SessionScope {
    gateway: Gateway,
    session_id: String,
}

impl SessionScope {
    /// Returns the session id.
    pub fn id(&self) -> &str {
        &self.session_id
    }

    /// Returns the execution endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.gateway.inner.config.endpoint
    }

    /// Returns the gateway.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Registers `handler` and returns a fresh token for it.
    ///
    /// Every call creates a new registration; memoization is up to the caller.
    pub fn issue(&self, name: &str, handler: ActionHandler) -> Result<String> {
        let inner = &self.gateway.inner;
        let action_id = generate_action_id(name);

        let options = PutOptions {
            expiration: None,
            expiration_ttl: inner.config.ttl,
        };
        inner.store.put(
            &self.session_id,
            &action_id,
            CallbackEntry::new(name, handler),
            options,
        )?;

        let payload = TokenPayload {
            action_id: action_id.clone(),
            name: name.to_string(),
        };
        match inner.cipher.encrypt(&payload) {
            Ok(token) => {
                tracing::debug!(action = name, %action_id, "Issued action token");
                Ok(token)
            }
            Err(err) => {
                // Do not leave an unreachable registration behind.
                let _ = inner.store.take(&self.session_id, &action_id);
                Err(ActionError::Token(err))
            }
        }
    }

    /// Executes a request within this session.
    pub fn execute(&self, request: &ExecutionRequest) -> GatewayResponse {
        self.gateway.execute(&self.session_id, request)
    }
}
