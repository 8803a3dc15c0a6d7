//! Membership registry and message fan-out for Murmur.
//!
//! The registry is the only state shared between connections: a concurrent
//! map from each claimed nickname to how that connection can be reached.
//!
//! # Key types
//!
//! - [`InMemoryBackend`]: the [`Backend`](murmur_session::Backend)
//!   implementation the server runs with
//! - [`Registration`]: reserved-but-unreachable vs. bound to an outbox

mod backend;
mod registration;

pub use backend::InMemoryBackend;
pub use registration::Registration;
