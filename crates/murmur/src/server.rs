//! `ChatServer` builder and accept loop.
//!
//! This is the entry point for running a Murmur server. It ties together
//! all the layers: transport → protocol → session → registry.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use murmur_registry::InMemoryBackend;
use murmur_session::{Backend, SessionConfig};
use murmur_transport::{TcpLineTransport, Transport};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::handler::handle_connection;
use crate::{MurmurError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// The backend does its own locking, so nothing here needs a `Mutex`.
pub(crate) struct ServerState<B: Backend> {
    pub(crate) backend: Arc<B>,
    pub(crate) session_config: SessionConfig,
}

/// Builder for configuring and starting a chat server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), murmur::MurmurError> {
/// use murmur::prelude::*;
///
/// let server = ChatServer::builder()
///     .bind("0.0.0.0:5000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChatServerBuilder {
    config: ServerConfig,
}

impl ChatServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every setting with the given config.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the longest accepted nickname, in characters.
    pub fn max_nick_len(mut self, len: usize) -> Self {
        self.config.max_nick_len = len;
        self
    }

    /// Sets the longest accepted inbound line, in bytes.
    pub fn max_line_length(mut self, len: usize) -> Self {
        self.config.max_line_length = len;
        self
    }

    /// Binds the listener with the in-memory registry as backend.
    pub async fn build(self) -> Result<ChatServer<InMemoryBackend>, MurmurError> {
        self.build_with(InMemoryBackend::new()).await
    }

    /// Binds the listener with a caller-supplied backend.
    pub async fn build_with<B: Backend>(
        self,
        backend: B,
    ) -> Result<ChatServer<B>, MurmurError> {
        self.config.validate()?;

        let transport = TcpLineTransport::bind(
            &self.config.bind_addr,
            self.config.max_line_length,
        )
        .await?;

        let state = Arc::new(ServerState {
            backend: Arc::new(backend),
            session_config: self.config.session_config(),
        });

        Ok(ChatServer { transport, state })
    }
}

/// A bound chat server.
///
/// Call [`run()`](Self::run) to serve until ctrl-c, or
/// [`spawn()`](Self::spawn) to serve in the background with a stop handle.
pub struct ChatServer<B: Backend> {
    transport: TcpLineTransport,
    state: Arc<ServerState<B>>,
}

impl ChatServer<InMemoryBackend> {
    /// Creates a new builder.
    pub fn builder() -> ChatServerBuilder {
        ChatServerBuilder::new()
    }
}

impl<B: Backend> ChatServer<B> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, MurmurError> {
        Ok(self.transport.local_addr()?)
    }

    /// The backend shared by every connection.
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.state.backend)
    }

    /// Runs the accept loop until the process receives ctrl-c.
    pub async fn run(self) -> Result<(), MurmurError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("ctrl-c received, shutting down");
        })
        .await
    }

    /// Runs the accept loop until `shutdown` completes.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// On shutdown the listener is closed; handlers already running keep
    /// serving their connection until the peer goes away.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), MurmurError> {
        tracing::info!("Murmur server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        // Dropping the transport closes the listening socket.
        drop(self.transport);
        tracing::info!("listener closed");
        Ok(())
    }

    /// Runs the accept loop on a background task.
    pub fn spawn(self) -> Result<ServerHandle<B>, MurmurError> {
        let local_addr = self.local_addr()?;
        let backend = self.backend();
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(self.run_until(async {
            let _ = stop_rx.await;
        }));

        Ok(ServerHandle {
            local_addr,
            backend,
            stop: stop_tx,
            task,
        })
    }
}

/// Handle to a server started with [`ChatServer::spawn`].
///
/// Dropping the handle without calling [`stop`](Self::stop) also closes
/// the listener, without waiting for it.
pub struct ServerHandle<B: Backend> {
    local_addr: SocketAddr,
    backend: Arc<B>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), MurmurError>>,
}

impl<B: Backend> ServerHandle<B> {
    /// The address the server accepted connections on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The backend shared by every connection.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Closes the listener and waits for the accept loop to exit.
    ///
    /// Connections that are already open are not interrupted.
    pub async fn stop(self) -> Result<(), MurmurError> {
        let _ = self.stop.send(());
        self.task.await?
    }
}
