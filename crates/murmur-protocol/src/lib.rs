//! Wire protocol for Murmur.
//!
//! This crate defines the "language" that chat clients and the server
//! speak. A session is a sequence of UTF-8 lines, one command or response
//! per line:
//!
//! - **Literals** ([`wire`]): the exact prefixes and response strings.
//! - **Types** ([`Nick`], [`ServerLine`], [`ErrorReason`]): what the
//!   server sends, and the validated identity it sends it about.
//! - **Commands** ([`Command`]): client lines decoded once, by prefix.
//! - **Errors** ([`ProtocolError`]): why a client line was rejected.
//!
//! # Known limitation
//!
//! There is no escaping. Matching is by literal prefix, so message text
//! that itself starts with a reserved token is carried verbatim and a
//! reader cannot tell it apart from a real command.
//!
//! ```text
//! Transport (lines) → Protocol (Command / ServerLine) → Session (nick context)
//! ```

mod command;
mod error;
mod types;
pub mod wire;

pub use command::Command;
pub use error::ProtocolError;
pub use types::{ErrorReason, Nick, ServerLine};
pub use wire::MAX_NICK_LEN;
