//! Session configuration.
//!
//! A [`Config`] can be built in code or loaded from a TOML file. Every field has a default, so a
//! file only needs to name what it changes:
//!
//! ```toml
//! connect_timeout_ms = 2000
//!
//! [endpoint]
//! host = "172.21.104.49"
//! port = 4242
//! ```

use crate::{command::set_statement, Command, Error, Result};
use serde::Deserialize;
use std::{fmt, path::Path, time::Duration};


/// Port the tracker's server listens on out of the box.
pub const DEFAULT_PORT: u16 = 4242;

/// Values enabled by the default start-configuration payload, in the order they are sent.
pub const DEFAULT_ENABLED: [&str; 11] = [
    "ENABLE_SEND_DATA",
    "ENABLE_SEND_COUNTER",
    "ENABLE_SEND_EYE_LEFT",
    "ENABLE_SEND_EYE_RIGHT",
    "ENABLE_SEND_POG_LEFT",
    "ENABLE_SEND_POG_RIGHT",
    "ENABLE_SEND_POG_BEST",
    "ENABLE_SEND_PUPIL_LEFT",
    "ENABLE_SEND_PUPIL_RIGHT",
    "ENABLE_SEND_POG_FIX",
    "ENABLE_SEND_TIME",
];

/// Network location of the tracker's server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Creates a new [`Endpoint`].
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

impl From<std::net::SocketAddr> for Endpoint {
    fn from(address: std::net::SocketAddr) -> Self {
        Self::new(address.ip().to_string(), address.port())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Configuration of a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the tracker's server is listening.
    pub endpoint: Endpoint,
    /// How long to wait for the connection to be established. Waits indefinitely if unset.
    pub connect_timeout_ms: Option<u64>,
    /// Start-configuration payload, one statement per entry.
    pub start: Vec<String>,
    /// Stop payload, one statement per entry.
    pub stop: Vec<String>,
    /// Statements that bring up the tracker's calibration screen.
    pub calibration: Vec<String>,
    /// Longest record accepted from the tracker, in bytes.
    pub max_record_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            connect_timeout_ms: None,
            start: DEFAULT_ENABLED
                .iter()
                .map(|id| set_statement(id, true))
                .collect(),
            stop: vec![set_statement("ENABLE_SEND_DATA", false)],
            calibration: vec![
                set_statement("CALIBRATE_SHOW", true),
                set_statement("CALIBRATE_START", true),
            ],
            max_record_len: crate::record::DEFAULT_MAX_LENGTH,
        }
    }
}

impl Config {
    /// Creates a default [`Config`] pointing at the given endpoint.
    pub fn with_endpoint(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }

    /// Parses a [`Config`] from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the text is not valid TOML or has unknown fields.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|error| Error::Config(error.to_string()))
    }

    /// Loads a [`Config`] from the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| Error::Config(format!("'{}': {error}", path.display())))?;
        toml::from_str(&text)
            .map_err(|error| Error::Config(format!("'{}': {error}", path.display())))
    }

    /// Replaces the host and port of the endpoint with the given values, where present.
    pub fn override_endpoint(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.endpoint.host = host;
        }
        if let Some(port) = port {
            self.endpoint.port = port;
        }
    }

    /// Returns the connection timeout, if any.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Returns the start-configuration payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] if any statement is invalid.
    pub fn start_commands(&self) -> Result<Vec<Command>> {
        commands(&self.start)
    }

    /// Returns the stop payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] if any statement is invalid.
    pub fn stop_commands(&self) -> Result<Vec<Command>> {
        commands(&self.stop)
    }

    /// Returns the calibration statements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] if any statement is invalid.
    pub fn calibration_commands(&self) -> Result<Vec<Command>> {
        commands(&self.calibration)
    }
}

fn commands(statements: &[String]) -> Result<Vec<Command>> {
    statements.iter().map(|text| Command::new(text.as_str())).collect()
}
