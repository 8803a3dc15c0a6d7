//! Transport abstraction layer for Murmur.
//!
//! Provides the [`Transport`] and [`Connection`] traits over a line-oriented
//! byte stream, and the [`Outbox`] delivery handle the registry uses to push
//! lines at a connection without touching its socket.
//!
//! # Feature Flags
//!
//! - `tcp` (default): newline-framed TCP. Inbound lines are decoded
//!   lossily, so bad UTF-8 never ends a connection.

#![allow(async_fn_in_trait)]

mod error;
mod outbox;
#[cfg(feature = "tcp")]
mod codec;
#[cfg(feature = "tcp")]
mod tcp;

pub use error::TransportError;
pub use outbox::{Outbox, OutboxReceiver};
#[cfg(feature = "tcp")]
pub use tcp::{DEFAULT_MAX_LINE_LENGTH, TcpLineConnection, TcpLineTransport};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// A single connection that exchanges text lines with its peer.
///
/// Lines are passed without their terminator in both directions.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Writes one line to the remote peer and flushes it.
    async fn send(&self, line: &str) -> Result<(), Self::Error>;

    /// Reads the next line from the remote peer.
    ///
    /// Returns `Ok(None)` when the peer closed the stream.
    /// [`TransportError::LineTooLong`] is recoverable: the offending line
    /// is dropped and the next call reads the line after it.
    async fn recv(&self) -> Result<Option<String>, Self::Error>;

    /// Flushes and shuts down the write side of the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the remote peer's address.
    fn peer_addr(&self) -> SocketAddr;
}
