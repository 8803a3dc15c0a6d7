//! Outbound delivery handles.
//!
//! An [`Outbox`] is the sending half of an unbounded channel of encoded
//! lines. The registry stores one per logged-in connection and pushes
//! broadcast and direct-message lines into it; a writer task owned by the
//! connection drains the [`OutboxReceiver`] onto the socket.
//!
//! Pushing into an outbox never blocks and never fails loudly. If the
//! connection's writer is gone the line is dropped, which is the
//! best-effort delivery the chat protocol promises.

use tokio::sync::mpsc;

use crate::ConnectionId;

/// Cloneable handle for queueing lines to one connection.
#[derive(Debug, Clone)]
pub struct Outbox {
    conn_id: ConnectionId,
    tx: mpsc::UnboundedSender<String>,
}

/// The receiving half of an [`Outbox`], owned by the connection's writer.
#[derive(Debug)]
pub struct OutboxReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl Outbox {
    /// Creates a connected outbox/receiver pair for the given connection.
    pub fn channel(conn_id: ConnectionId) -> (Outbox, OutboxReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Outbox { conn_id, tx }, OutboxReceiver { rx })
    }

    /// Queues a line for delivery.
    ///
    /// Returns `false` if the receiving side has been dropped. Callers
    /// on the fan-out path ignore the result.
    pub fn deliver(&self, line: impl Into<String>) -> bool {
        match self.tx.send(line.into()) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(conn_id = %self.conn_id, "dropping line for closed outbox");
                false
            }
        }
    }

    /// The connection this outbox delivers to.
    pub fn connection_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Returns `true` once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl OutboxReceiver {
    /// Waits for the next queued line.
    ///
    /// Returns `None` once every [`Outbox`] clone has been dropped and the
    /// queue is empty.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Takes the next queued line without waiting.
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Takes every line queued so far.
    pub fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = self.try_recv() {
            lines.push(line);
        }
        lines
    }
}
