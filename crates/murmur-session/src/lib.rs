//! Per-connection session handling for Murmur.
//!
//! This crate holds the two halves of the chat core that every connection
//! touches:
//!
//! 1. **The backend contract**: what a membership/delivery store must do
//!    ([`Backend`] trait)
//! 2. **The session state machine**: turning protocol lines into backend
//!    calls and replies ([`ClientSession`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Dispatcher (above)  ← feeds lines in, writes replies out
//!     ↕
//! Session Layer (this crate)  ← login-before-use, command routing
//!     ↕
//! Protocol Layer (below)  ← Command, ServerLine, Nick
//! ```

mod backend;
mod session;

pub use backend::Backend;
pub use session::{ClientSession, SessionConfig};
