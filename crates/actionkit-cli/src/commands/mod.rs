// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `serve`: Serve the gateway and the demo page
//! - `keygen`: Print a new application key
//! - `exec`: Activate a demo action on a running server

/// Headless client command.
pub mod exec;
/// Application key generation command.
pub mod keygen;
/// Gateway server command.
pub mod serve;
