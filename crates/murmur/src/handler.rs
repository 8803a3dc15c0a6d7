//! Per-connection handler: line loop, login wiring, and teardown.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that drains the connection's outbox. The flow is:
//!   1. Create the outbox and start the writer
//!   2. Loop: read a line → session → queue any direct reply
//!   3. On login, bind the outbox into the backend and push the users list
//!   4. On end-of-stream, a read error or a failed write, release the
//!      nickname, let the writer flush what is queued, and close the socket

use std::sync::Arc;

use murmur_protocol::{ErrorReason, ServerLine};
use murmur_session::{Backend, ClientSession};
use murmur_transport::{
    Connection, Outbox, OutboxReceiver, TcpLineConnection, TransportError,
};
use tokio::sync::oneshot;

use crate::server::ServerState;
use crate::MurmurError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<B: Backend>(
    conn: TcpLineConnection,
    state: Arc<ServerState<B>>,
) -> Result<(), MurmurError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let addr = conn.peer_addr();
    tracing::info!(%conn_id, %addr, "client connected");

    // Direct replies and fan-out share one queue, so a client sees
    // its own lines in the order the server produced them.
    let (outbox, outbound) = Outbox::channel(conn_id);
    let (write_failed_tx, write_failed) = oneshot::channel();
    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        outbound,
        write_failed_tx,
    ));

    let mut session = ClientSession::new(
        Arc::clone(&state.backend),
        state.session_config.clone(),
    );

    let result = read_loop(
        &conn,
        &mut session,
        &state.backend,
        &outbox,
        write_failed,
    )
    .await;

    if let Some(nick) = session.disconnect() {
        tracing::info!(%conn_id, %nick, "client left without QUIT");
    }
    drop(session);

    // The writer exits once every outbox clone is gone. The registry's
    // clone went with the release above.
    drop(outbox);
    if let Err(e) = writer.await {
        tracing::error!(%conn_id, error = %e, "writer task failed");
    }
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }

    tracing::info!(%conn_id, %addr, "client disconnected");
    result
}

/// Reads lines until the peer closes the stream, the read fails, or the
/// writer reports a failed write.
async fn read_loop<B: Backend>(
    conn: &TcpLineConnection,
    session: &mut ClientSession<B>,
    backend: &B,
    outbox: &Outbox,
    mut write_failed: oneshot::Receiver<TransportError>,
) -> Result<(), MurmurError> {
    let conn_id = conn.id();

    loop {
        let received = tokio::select! {
            received = conn.recv() => received,
            failed = &mut write_failed => {
                return match failed {
                    Ok(e) => Err(e.into()),
                    // The writer ended without reporting, which only a
                    // panic does while `outbox` is alive.
                    Err(_) => {
                        tracing::error!(%conn_id, "writer task ended early");
                        Ok(())
                    }
                };
            }
        };

        let line = match received {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed by peer");
                return Ok(());
            }
            Err(TransportError::LineTooLong(max)) => {
                tracing::debug!(%conn_id, max, "over-long line discarded");
                outbox.deliver(
                    ServerLine::Error(ErrorReason::InvalidMessage).to_string(),
                );
                continue;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Err(e.into());
            }
        };
        tracing::debug!(%conn_id, %line, "received line");

        let was_authenticated = session.is_authenticated();

        if let Some(reply) = session.process(&line) {
            outbox.deliver(reply.to_string());
        }

        // WELCOME is already queued, so it reaches the client before any
        // fan-out that the bind makes possible.
        if !was_authenticated {
            if let Some(nick) = session.nick() {
                tracing::info!(%conn_id, %nick, "client logged in");
                backend.bind(nick, outbox.clone());
                backend.broadcast_users_list();
            }
        }
    }
}

/// Writes queued lines to the socket until the outbox is closed or a write
/// fails. A failure is handed to the reader through `failed`.
async fn write_loop(
    conn: Arc<TcpLineConnection>,
    mut outbound: OutboxReceiver,
    failed: oneshot::Sender<TransportError>,
) {
    while let Some(line) = outbound.recv().await {
        if let Err(e) = conn.send(&line).await {
            tracing::debug!(
                conn_id = %conn.id(),
                error = %e,
                "write failed, ending connection"
            );
            let _ = failed.send(e);
            return;
        }
    }
}
