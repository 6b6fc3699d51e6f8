// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Session-scoped callback registrations.
//!
//! Rendering an action registers its handler here under a fresh action id.
//! The registration lives in the visitor's session until it is consumed by
//! the gateway or expires.
//!
//! # Guarantees
//!
//! - Registrations are keyed by `(session, action_id)`; sessions never see
//!   each other's entries.
//! - [`CallbackStore::take`] removes and returns an entry in one step, so two
//!   concurrent requests with the same token cannot both run the handler.
//! - Expired entries are invisible to `take` and `contains`.
//!
//! # Implementations
//!
//! - [`MemoryCallbackStore`]: process-local, the only option for handlers
//!   that are closures.

mod memory;
mod types;

pub use memory::MemoryCallbackStore;
pub use types::{
    ActionHandler, ActionInput, CallbackEntry, HandlerResult, PutOptions, StoreError, StoreResult,
};

/// Platform-agnostic callback store trait.
pub trait CallbackStore: Send + Sync {
    /// Registers a callback for a session.
    ///
    /// An existing entry with the same id is replaced.
    fn put(
        &self,
        session: &str,
        action_id: &str,
        entry: CallbackEntry,
        options: PutOptions,
    ) -> StoreResult<()>;

    /// Removes and returns a registration.
    ///
    /// Returns `None` if the entry does not exist or is expired.
    fn take(&self, session: &str, action_id: &str) -> StoreResult<Option<CallbackEntry>>;

    /// Returns true if a live registration exists.
    fn contains(&self, session: &str, action_id: &str) -> StoreResult<bool>;

    /// Returns the number of live registrations in a session.
    fn count(&self, session: &str) -> StoreResult<usize>;

    /// Drops every registration of a session, returning how many were removed.
    fn clear_session(&self, session: &str) -> StoreResult<usize>;

    /// Drops expired registrations across all sessions, returning how many were removed.
    fn purge_expired(&self) -> StoreResult<usize>;
}
