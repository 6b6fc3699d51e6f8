// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! ActionKit CLI library.
//!
//! This crate provides the command-line interface for ActionKit: an HTTP
//! server exposing the execution gateway, and a headless client that drives
//! the action controller against a running server.
//!
//! # Usage
//!
//! ```bash
//! actionkit keygen              # Print a new application key
//! actionkit serve               # Serve the gateway and demo page
//! actionkit exec greet          # Activate a demo action
//! ```
//!
//! # Configuration
//!
//! Projects are configured via `actionkit.toml` at the project root.

/// CLI commands (serve, keygen, exec).
pub mod commands;
/// Project configuration from `actionkit.toml`.
pub mod config;
/// Demo actions served on the index page.
pub mod demo;
/// HTTP server exposing the gateway.
pub mod server;
/// Terminal host for the headless client.
pub mod terminal;
