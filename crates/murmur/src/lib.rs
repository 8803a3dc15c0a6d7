//! # Murmur
//!
//! A minimal multi-user chat server speaking a line-based text protocol
//! over TCP.
//!
//! Clients connect, claim a unique nickname with `HELLO <nick>`, and then
//! exchange public (`MSG`) and direct (`PRIV`) messages through a shared
//! in-memory registry. The server is split into layers, each its own crate:
//!
//! ```text
//! murmur (this crate)  ← accept loop, per-connection handler, config
//!   murmur-registry    ← concurrent nickname registry and fan-out
//!   murmur-session     ← per-connection state machine, Backend trait
//!   murmur-protocol    ← wire literals, Command, ServerLine, Nick
//!   murmur-transport   ← line-framed TCP, Outbox delivery handles
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use murmur::prelude::*;
//!
//! # async fn demo() -> Result<(), MurmurError> {
//! let server = ChatServer::builder()
//!     .bind("127.0.0.1:5000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{DEFAULT_PORT, ServerConfig};
pub use error::MurmurError;
pub use server::{ChatServer, ChatServerBuilder, ServerHandle};

pub mod prelude {
    //! Everything needed to run a server or write a backend.

    pub use crate::{
        ChatServer, ChatServerBuilder, DEFAULT_PORT, MurmurError,
        ServerConfig, ServerHandle,
    };
    pub use murmur_protocol::{
        Command, ErrorReason, MAX_NICK_LEN, Nick, ProtocolError, ServerLine,
    };
    pub use murmur_registry::InMemoryBackend;
    pub use murmur_session::{Backend, ClientSession, SessionConfig};
    pub use murmur_transport::{Outbox, OutboxReceiver, TransportError};
}
