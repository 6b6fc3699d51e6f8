// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! ActionKit project configuration.
//!
//! Configuration is loaded from `actionkit.toml` at the project root. Every
//! section is optional.
//!
//! # Example Configuration
//!
//! ```toml
//! [app]
//! name = "my-app"
//! key = "base64:..."
//! debug = false
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [actions]
//! endpoint = "/_actions/execute"
//! ttl = 7200
//! purge_interval = 300
//!
//! [session]
//! cookie = "actionkit_session"
//! ```

use actionkit::gateway::{DEFAULT_ENDPOINT, DEFAULT_TTL};
use actionkit::{GatewayConfig, TokenCipher};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "actionkit.toml";

/// Main configuration structure loaded from `actionkit.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Application settings.
    #[serde(default)]
    pub app: AppConfig,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Gateway settings.
    #[serde(default)]
    pub actions: ActionsConfig,
    /// Session cookie settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Application name (default: "actionkit").
    #[serde(default = "default_name")]
    pub name: String,
    /// Application key used to encrypt action tokens.
    ///
    /// When absent an ephemeral key is generated, so tokens do not survive
    /// a restart.
    #[serde(default)]
    pub key: Option<String>,
    /// Surface raw handler error messages to clients.
    #[serde(default)]
    pub debug: bool,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server host (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Gateway settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionsConfig {
    /// Execution endpoint path (default: "/_actions/execute").
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Seconds a registered callback stays valid (default: 7200, 0 = forever).
    #[serde(default = "default_ttl")]
    pub ttl: u64,
    /// Seconds between expired-callback sweeps (default: 300, 0 = off).
    #[serde(default = "default_purge_interval")]
    pub purge_interval: u64,
}

/// Session cookie settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Cookie name (default: "actionkit_session").
    #[serde(default = "default_cookie")]
    pub cookie: String,
}

fn default_name() -> String {
    "actionkit".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_ttl() -> u64 {
    DEFAULT_TTL
}

fn default_purge_interval() -> u64 {
    300
}

fn default_cookie() -> String {
    "actionkit_session".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            key: None,
            debug: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            ttl: default_ttl(),
            purge_interval: default_purge_interval(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie: default_cookie(),
        }
    }
}

impl Config {
    /// Loads configuration from a file, or `actionkit.toml` in the current
    /// directory.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = path.unwrap_or_else(|| Path::new(CONFIG_FILE));

        if path.is_none() && !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path)?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Returns the gateway projection of this configuration.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::default()
            .with_endpoint(self.actions.endpoint.clone())
            .with_debug(self.app.debug)
            .with_ttl(match self.actions.ttl {
                0 => None,
                ttl => Some(ttl),
            })
    }

    /// Builds the token cipher.
    ///
    /// Returns the cipher and whether its key is ephemeral.
    pub fn cipher(&self) -> anyhow::Result<(TokenCipher, bool)> {
        match self.app.key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => Ok((TokenCipher::from_app_key(key)?, false)),
            None => {
                let key = TokenCipher::generate_key();
                Ok((TokenCipher::from_app_key(&key)?, true))
            }
        }
    }
}
