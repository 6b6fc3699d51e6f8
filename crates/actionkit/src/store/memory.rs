// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! In-memory callback store implementation.

use super::{CallbackEntry, CallbackStore, PutOptions, StoreError, StoreResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// In-memory store entry.
#[derive(Clone)]
struct MemoryEntry {
    entry: CallbackEntry,
    expiration: Option<u64>,
}

/// In-memory callback store.
///
/// Registrations are lost when the process exits, which matches their
/// lifetime: they point at closures that only exist in this process.
pub struct MemoryCallbackStore {
    sessions: RwLock<HashMap<String, BTreeMap<String, MemoryEntry>>>,
}

impl MemoryCallbackStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the current Unix timestamp.
    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// Check if an entry is expired.
    fn is_expired(entry: &MemoryEntry, now: u64) -> bool {
        match entry.expiration {
            Some(exp) => now >= exp,
            None => false,
        }
    }
}

impl Default for MemoryCallbackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackStore for MemoryCallbackStore {
    fn put(
        &self,
        session: &str,
        action_id: &str,
        entry: CallbackEntry,
        options: PutOptions,
    ) -> StoreResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        sessions.entry(session.to_string()).or_default().insert(
            action_id.to_string(),
            MemoryEntry {
                entry,
                expiration: options.calculate_expiration(),
            },
        );
        Ok(())
    }

    fn take(&self, session: &str, action_id: &str) -> StoreResult<Option<CallbackEntry>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let Some(entries) = sessions.get_mut(session) else {
            return Ok(None);
        };
        let removed = entries.remove(action_id);
        if entries.is_empty() {
            sessions.remove(session);
        }

        match removed {
            Some(stored) if !Self::is_expired(&stored, Self::now()) => Ok(Some(stored.entry)),
            _ => Ok(None),
        }
    }

    fn contains(&self, session: &str, action_id: &str) -> StoreResult<bool> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let now = Self::now();
        Ok(sessions
            .get(session)
            .and_then(|entries| entries.get(action_id))
            .map(|stored| !Self::is_expired(stored, now))
            .unwrap_or(false))
    }

    fn count(&self, session: &str) -> StoreResult<usize> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let now = Self::now();
        Ok(sessions
            .get(session)
            .map(|entries| entries.values().filter(|e| !Self::is_expired(e, now)).count())
            .unwrap_or(0))
    }

    fn clear_session(&self, session: &str) -> StoreResult<usize> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(sessions.remove(session).map(|entries| entries.len()).unwrap_or(0))
    }

    fn purge_expired(&self) -> StoreResult<usize> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let now = Self::now();
        let mut removed = 0;
        for entries in sessions.values_mut() {
            let before = entries.len();
            entries.retain(|_, stored| !Self::is_expired(stored, now));
            removed += before - entries.len();
        }
        sessions.retain(|_, entries| !entries.is_empty());
        Ok(removed)
    }
}
