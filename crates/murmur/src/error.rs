//! Unified error type for the Murmur server.

use murmur_transport::TransportError;

/// Top-level error that wraps everything that can stop the server or end a
/// connection.
///
/// Protocol-level mistakes by a client are not errors here: they are
/// answered with an `ERROR` line and the connection carries on.
#[derive(Debug, thiserror::Error)]
pub enum MurmurError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The configuration could not be parsed or is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file or similar local I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The accept loop task panicked or was cancelled.
    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
