// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Gateway server components.
//!
//! # Components
//!
//! - `http`: HTTP server using Axum
//! - `session`: Session cookie handling

/// HTTP server implementation using Axum.
pub mod http;
/// Session cookie parsing and issuing.
pub mod session;
