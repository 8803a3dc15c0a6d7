//! Client commands, decoded once per line.

use crate::wire;
use crate::ProtocolError;

/// A line sent from a client to the server.
///
/// Decoding is by literal prefix and happens once per line; the session
/// state machine then matches on the variant instead of rescanning text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `HELLO <name>`. The candidate is trimmed but not yet validated;
    /// see [`Nick::parse`](crate::Nick::parse).
    Hello(String),

    /// `MSG <text>`, text trimmed.
    Msg(String),

    /// `PRIV <target> <text>`, both parts trimmed.
    Priv { target: String, text: String },

    /// `USERS`
    Users,

    /// `QUIT`
    Quit,
}

impl Command {
    /// Decodes a client line (without its terminator).
    ///
    /// Any text after the `USERS` and `QUIT` tokens is ignored.
    ///
    /// # Errors
    /// - [`ProtocolError::InvalidMessage`] for a `PRIV` line with no space
    ///   between the target and the text.
    /// - [`ProtocolError::UnknownCommand`] when no prefix matches.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        if let Some(rest) = line.strip_prefix(wire::HANDSHAKE) {
            return Ok(Self::Hello(rest.trim().to_string()));
        }

        if let Some(rest) = line.strip_prefix(wire::MSG) {
            return Ok(Self::Msg(rest.trim().to_string()));
        }

        if let Some(rest) = line.strip_prefix(wire::PRIV) {
            let rest = rest.trim();
            let Some((target, text)) = rest.split_once(' ') else {
                return Err(ProtocolError::InvalidMessage(line.to_string()));
            };
            return Ok(Self::Priv {
                target: target.trim().to_string(),
                text: text.trim().to_string(),
            });
        }

        if line.starts_with(wire::LIST_USERS) {
            return Ok(Self::Users);
        }

        if line.starts_with(wire::QUIT) {
            return Ok(Self::Quit);
        }

        Err(ProtocolError::UnknownCommand(line.to_string()))
    }
}
