//! Newline-framed TCP transport.
//!
//! Reads go through [`LossyLineCodec`]; writes use `tokio-util`'s
//! `LinesCodec`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use crate::codec::{Inbound, LossyLineCodec};
use crate::{Connection, ConnectionId, Transport, TransportError};

/// Longest inbound line accepted by default, in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8 * 1024;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A TCP [`Transport`] that frames each connection into text lines.
pub struct TcpLineTransport {
    listener: TcpListener,
    max_line_length: usize,
}

impl TcpLineTransport {
    /// Binds a new listener to the given address.
    ///
    /// Inbound lines longer than `max_line_length` bytes are discarded and
    /// reported as [`TransportError::LineTooLong`].
    pub async fn bind(
        addr: &str,
        max_line_length: usize,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "TCP line transport listening");
        Ok(Self {
            listener,
            max_line_length,
        })
    }
}

impl Transport for TcpLineTransport {
    type Connection = TcpLineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted TCP connection");

        let (read, write) = stream.into_split();
        Ok(TcpLineConnection {
            id,
            addr,
            max_line_length: self.max_line_length,
            reader: Mutex::new(FramedRead::new(
                read,
                LossyLineCodec::new(self.max_line_length),
            )),
            writer: Mutex::new(FramedWrite::new(write, LinesCodec::new())),
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener.local_addr().map_err(TransportError::AcceptFailed)
    }
}

/// A single line-framed TCP connection.
///
/// The read and write halves are locked independently, so a task blocked
/// in [`recv`](Connection::recv) never holds up a writer.
pub struct TcpLineConnection {
    id: ConnectionId,
    addr: SocketAddr,
    max_line_length: usize,
    reader: Mutex<FramedRead<OwnedReadHalf, LossyLineCodec>>,
    writer: Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
}

impl Connection for TcpLineConnection {
    type Error = TransportError;

    async fn send(&self, line: &str) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .send(line)
            .await
            .map_err(|e| TransportError::SendFailed(codec_io_error(e)))
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        match self.reader.lock().await.next().await {
            Some(Ok(Inbound::Line(line))) => Ok(Some(line)),
            Some(Ok(Inbound::TooLong)) => {
                Err(TransportError::LineTooLong(self.max_line_length))
            }
            Some(Err(e)) => Err(TransportError::ReceiveFailed(e)),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        SinkExt::<&str>::close(&mut *self.writer.lock().await)
            .await
            .map_err(|e| TransportError::SendFailed(codec_io_error(e)))
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

fn codec_io_error(e: LinesCodecError) -> std::io::Error {
    match e {
        LinesCodecError::Io(io) => io,
        LinesCodecError::MaxLineLengthExceeded => std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "line exceeds maximum length",
        ),
    }
}
