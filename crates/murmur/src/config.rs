//! Server configuration.

use std::path::Path;

use murmur_protocol::MAX_NICK_LEN;
use murmur_session::SessionConfig;
use murmur_transport::DEFAULT_MAX_LINE_LENGTH;
use serde::{Deserialize, Serialize};

use crate::MurmurError;

/// Port the server listens on when none is given.
pub const DEFAULT_PORT: u16 = 5000;

/// Settings for one chat server.
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes:
///
/// ```json
/// { "bind_addr": "0.0.0.0:6000", "max_nick_len": 16 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the listener binds to.
    ///
    /// Default: `127.0.0.1:5000`.
    pub bind_addr: String,

    /// Longest accepted nickname, in characters.
    ///
    /// Default: 20.
    pub max_nick_len: usize,

    /// Longest accepted inbound line, in bytes. A longer line ends the
    /// connection.
    ///
    /// Default: 8192.
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("127.0.0.1:{DEFAULT_PORT}"),
            max_nick_len: MAX_NICK_LEN,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl ServerConfig {
    /// Default settings listening on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{port}"),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, MurmurError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MurmurError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MurmurError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks the limits are usable.
    pub fn validate(&self) -> Result<(), MurmurError> {
        if self.max_nick_len == 0 {
            return Err(MurmurError::Config(
                "max_nick_len must be at least 1".into(),
            ));
        }
        if self.max_line_length == 0 {
            return Err(MurmurError::Config(
                "max_line_length must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The part of the config each session needs.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_nick_len: self.max_nick_len,
        }
    }
}
