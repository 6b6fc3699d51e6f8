// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Action token encryption.
//!
//! A token is `base64url(nonce || ciphertext || tag)` where the plaintext is the
//! JSON-encoded [`TokenPayload`], sealed with ChaCha20-Poly1305. Any change to
//! the token string fails authentication, including non-canonical base64.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha256};
use std::fmt;

const NONCE_LEN: usize = 12;
const APP_KEY_PREFIX: &str = "base64:";

/// Errors raised by [`TokenCipher`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The application key could not be used.
    #[error("Invalid application key: {0}")]
    InvalidKey(String),
    /// The token is not valid base64 or too short.
    #[error("Malformed token")]
    Malformed,
    /// The token failed authentication (tampered or foreign key).
    #[error("Token authentication failed")]
    Authentication,
    /// Sealing the payload failed.
    #[error("Token encryption failed")]
    Encryption,
    /// The payload could not be (de)serialized.
    #[error("Token payload error: {0}")]
    Payload(String),
}

/// The encrypted content of an action token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Id of the callback registration in the session store.
    pub action_id: String,
    /// Action name, for logging.
    pub name: String,
}

/// Authenticated encryption of action tokens.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: ChaCha20Poly1305,
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCipher").finish_non_exhaustive()
    }
}

impl TokenCipher {
    /// Creates a cipher from a raw 32-byte key.
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key)),
        }
    }

    /// Creates a cipher from an application key.
    ///
    /// `base64:<32 bytes>` keys are decoded directly, any other non-empty
    /// string is stretched with SHA-256.
    pub fn from_app_key(app_key: &str) -> Result<Self, TokenError> {
        let app_key = app_key.trim();
        if app_key.is_empty() {
            return Err(TokenError::InvalidKey("application key is empty".to_string()));
        }

        match app_key.strip_prefix(APP_KEY_PREFIX) {
            Some(encoded) => {
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
                let key: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
                    TokenError::InvalidKey(format!("expected 32 bytes, got {}", b.len()))
                })?;
                Ok(Self::new(key))
            }
            None => Ok(Self::from_secret(app_key)),
        }
    }

    /// Creates a cipher by hashing an arbitrary secret.
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self::new(key)
    }

    /// Generates a new random application key in `base64:` form.
    pub fn generate_key() -> String {
        let key = ChaCha20Poly1305::generate_key(&mut OsRng);
        format!("{}{}", APP_KEY_PREFIX, STANDARD.encode(key))
    }

    /// Encrypts a token payload.
    pub fn encrypt(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        let plaintext =
            serde_json::to_vec(payload).map_err(|e| TokenError::Payload(e.to_string()))?;
        self.seal(&plaintext)
    }

    /// Decrypts a token to its raw JSON payload.
    ///
    /// Field validation is left to the caller so that a well-formed token with
    /// missing fields can be told apart from a forged one.
    pub fn decrypt(&self, token: &str) -> Result<JsonValue, TokenError> {
        let plaintext = self.open(token)?;
        serde_json::from_slice(&plaintext).map_err(|e| TokenError::Payload(e.to_string()))
    }

    /// Seals arbitrary bytes into a token string.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, TokenError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| TokenError::Encryption)?;

        let mut bytes = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        bytes.extend_from_slice(&nonce);
        bytes.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Opens a token string sealed by [`TokenCipher::seal`].
    pub fn open(&self, token: &str) -> Result<Vec<u8>, TokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| TokenError::Malformed)?;
        if bytes.len() <= NONCE_LEN {
            return Err(TokenError::Malformed);
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| TokenError::Authentication)
    }
}
