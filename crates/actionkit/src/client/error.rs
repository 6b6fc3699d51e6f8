// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Client-side error types.

use thiserror::Error;

/// Errors raised by a [`Transport`](super::Transport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,
}

/// Error handed to the error callback of an execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The gateway answered with `success: false`.
    #[error("{0}")]
    Declared(String),

    /// The request failed in transit.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body was not a valid action result.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
