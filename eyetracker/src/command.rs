//! Outbound statements.
//!
//! The eye tracker is configured with single-line XML statements such as
//! `<SET ID="ENABLE_SEND_DATA" STATE="1" />`. Their content is defined by the vendor, so a
//! [`Command`] only guarantees that it fits on one line. [`CommandCodec`] puts it on the wire.

use crate::{Error, Result};
use bytes::{BufMut, BytesMut};
use std::fmt;
use tokio_util::codec::Encoder;


/// Line terminator expected by the tracker's server.
pub const TERMINATOR: &[u8] = b"\r\n";

/// An opaque statement sent to the eye tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    text: String,
}

impl Command {
    /// Creates a new [`Command`] from its textual payload.
    ///
    /// Surrounding whitespace is kept as is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] if the payload is blank or contains a line break, which
    /// would split the statement on the wire.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::InvalidCommand(String::from("payload is empty")));
        }
        if text.contains(['\r', '\n']) {
            return Err(Error::InvalidCommand(format!(
                "{text:?} contains a line break"
            )));
        }
        Ok(Self { text })
    }

    /// Creates a `SET` statement that turns the given parameter on or off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] if `id` produces an invalid payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use eyetracker::Command;
    ///
    /// let command = Command::set("ENABLE_SEND_DATA", true).unwrap();
    /// assert_eq!(command.as_str(), r#"<SET ID="ENABLE_SEND_DATA" STATE="1" />"#);
    /// ```
    pub fn set(id: &str, enabled: bool) -> Result<Self> {
        Self::new(set_statement(id, enabled))
    }

    /// Returns the payload without the line terminator.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Renders a `SET` statement.
pub(crate) fn set_statement(id: &str, enabled: bool) -> String {
    format!(r#"<SET ID="{id}" STATE="{}" />"#, u8::from(enabled))
}

/// Encodes [`Command`]s as terminated lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandCodec;

impl Encoder<&Command> for CommandCodec {
    type Error = Error;

    fn encode(&mut self, item: &Command, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(item.text.len() + TERMINATOR.len());
        dst.put_slice(item.text.as_bytes());
        dst.put_slice(TERMINATOR);
        Ok(())
    }
}
