// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # ActionKit
//!
//! Server-rendered action buttons for Rust web applications.
//!
//! An action is a button that may ask for confirmation, collect form data in a
//! modal and then run a server-side handler. The handler never leaves the
//! server: rendering a button registers it in a session-scoped
//! [`CallbackStore`](store::CallbackStore) under a one-time id, and the page
//! only receives an encrypted token pointing at that id. The [`Gateway`]
//! decrypts the token, consumes the registration and runs the handler.
//!
//! ## Features
//!
//! - Authenticated, tamper-evident action tokens
//! - Single-use handler registrations with TTL
//! - Typed handler outcomes (redirect, message, payload)
//! - Schema-driven modal forms
//! - A headless client controller with pluggable host seams
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use actionkit::{Action, ActionOutcome, Gateway, GatewayConfig, TokenCipher};
//! use actionkit::store::MemoryCallbackStore;
//! use std::sync::Arc;
//!
//! let gateway = Gateway::new(
//!     TokenCipher::from_app_key("base64:...")?,
//!     Arc::new(MemoryCallbackStore::new()),
//!     GatewayConfig::default(),
//! );
//!
//! let action = Action::new("greet")
//!     .label("Say hello")
//!     .handler(|_input| Ok(ActionOutcome::message("Hello!")));
//!
//! let session = gateway.session("session-id");
//! let html = action.render_button(&session)?;
//! ```

/// Server-side action descriptors and bulk actions.
pub mod action;
/// Headless client controller.
pub mod client;
/// Error types for gateway execution.
pub mod error;
/// Token issuance and execution gateway.
pub mod gateway;
/// HTML escaping and document helpers.
pub mod html;
/// Wire contract shared by server and client.
pub mod protocol;
/// Action results and handler outcomes.
pub mod result;
/// Form schema descriptors and rendering.
pub mod schema;
/// Session-scoped callback registrations.
pub mod store;
/// Action token encryption.
pub mod token;

pub use action::{Action, DeleteBulkAction};
pub use client::{
    ActionConfig, ActionController, ActivationOutcome, ExecuteOptions, Host, LoopbackTransport,
    ModalConfig,
};
pub use error::{ActionError, Result};
pub use gateway::{ExecutionBody, Gateway, GatewayConfig, GatewayResponse, SessionScope};
pub use protocol::{Attributes, ExecutionRequest, HttpMethod};
pub use result::{ActionOutcome, ActionResult, Notification, NotificationStatus};
pub use schema::{FieldType, SchemaField};
pub use store::{ActionHandler, ActionInput, CallbackStore, HandlerResult, MemoryCallbackStore};
pub use token::{TokenCipher, TokenError, TokenPayload};
