//! Error types for the protocol layer.
//!
//! None of these are fatal to a connection. Each one maps onto exactly one
//! `ERROR ...` line (see [`ErrorReason`](crate::ErrorReason)) that is sent
//! back to the client that caused it.

/// A client line that could not be turned into a valid command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The handshake named an empty nickname, one containing whitespace,
    /// or one longer than the configured limit.
    #[error("invalid nickname: {0:?}")]
    InvalidNick(String),

    /// A direct message without a separating space after the target.
    #[error("invalid message: {0:?}")]
    InvalidMessage(String),

    /// The line does not start with any recognised command prefix.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),
}
