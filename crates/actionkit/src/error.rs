// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for token issuance and gateway execution.
//!
//! # Error Categories
//!
//! - **Protocol errors** (HTTP 400): missing token, invalid token, invalid
//!   payload, expired action
//! - **Execution errors** (HTTP 500): the handler failed or panicked
//! - **Infrastructure errors** (HTTP 500): the callback store or the cipher
//!   failed
//!
//! Every variant has a stable machine code ([`ActionError::code`]) that is
//! sent to the client next to the message.

use crate::store::StoreError;
use crate::token::TokenError;
use thiserror::Error;

/// The main error type for gateway operations.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The request carried no action token.
    #[error("Missing action token")]
    MissingToken,

    /// The token could not be decrypted or was tampered with.
    #[error("Invalid action token")]
    InvalidToken,

    /// The request or the decrypted token lacks a required field.
    #[error("Invalid action payload: {0}")]
    InvalidPayload(String),

    /// The registration was already consumed or has expired.
    #[error("This action has expired. Please refresh the page and try again.")]
    ActionExpired,

    /// The handler returned an error or panicked.
    #[error("Action execution failed: {0}")]
    ExecutionFailed(String),

    /// The callback store failed.
    #[error("Callback store error: {0}")]
    Store(#[from] StoreError),

    /// Token encryption failed during issuance.
    #[error("Token error: {0}")]
    Token(TokenError),
}

impl ActionError {
    /// Returns the stable machine code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::MissingToken => "missing_token",
            ActionError::InvalidToken => "invalid_token",
            ActionError::InvalidPayload(_) => "invalid_payload",
            ActionError::ActionExpired => "action_expired",
            ActionError::ExecutionFailed(_) => "execution_failed",
            ActionError::Store(_) => "store_unavailable",
            ActionError::Token(_) => "token_error",
        }
    }

    /// Returns the HTTP status for this error.
    pub fn status(&self) -> u16 {
        match self {
            ActionError::MissingToken
            | ActionError::InvalidToken
            | ActionError::InvalidPayload(_)
            | ActionError::ActionExpired => 400,
            _ => 500,
        }
    }

    /// Returns the message shown to users.
    ///
    /// Handler failure details are only exposed when `debug` is set.
    pub fn public_message(&self, debug: bool) -> String {
        match self {
            ActionError::ExecutionFailed(raw) if debug => raw.clone(),
            ActionError::ExecutionFailed(_) => "Action execution failed".to_string(),
            ActionError::Store(_) | ActionError::Token(_) if !debug => {
                "Action execution failed".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Convenience type alias for Results with [`ActionError`].
pub type Result<T> = std::result::Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_errors_are_client_errors() {
        for err in [
            ActionError::MissingToken,
            ActionError::InvalidToken,
            ActionError::InvalidPayload("x".into()),
            ActionError::ActionExpired,
        ] {
            assert_eq!(err.status(), 400, "{}", err.code());
        }
        assert_eq!(ActionError::ExecutionFailed("boom".into()).status(), 500);
    }

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            ActionError::MissingToken.code(),
            ActionError::InvalidToken.code(),
            ActionError::InvalidPayload(String::new()).code(),
            ActionError::ActionExpired.code(),
            ActionError::ExecutionFailed(String::new()).code(),
            ActionError::Store(StoreError::Storage(String::new())).code(),
            ActionError::Token(TokenError::Encryption).code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_internal_error_codes() {
        let token = ActionError::Token(TokenError::Encryption);
        assert_eq!(token.code(), "token_error");
        assert_eq!(token.status(), 500);
        assert_eq!(token.public_message(false), "Action execution failed");

        let store = ActionError::Store(StoreError::Storage("locked".into()));
        assert_eq!(store.code(), "store_unavailable");
        assert_eq!(store.status(), 500);
    }

    #[test]
    fn test_execution_message_redaction() {
        let err = ActionError::ExecutionFailed("db connection refused".into());
        assert_eq!(err.public_message(false), "Action execution failed");
        assert_eq!(err.public_message(true), "db connection refused");
    }
}
