//! Registry entries.

use murmur_transport::Outbox;

/// What the registry knows about one claimed nickname.
///
/// A name is reserved during the handshake, before the connection has
/// written its `WELCOME` and handed over its outbox. Deliveries in that
/// window skip the entry.
///
/// ```text
///   reserve() ──→ Reserved ──(bind)──→ Bound(outbox) ──(bind)──→ Bound(new)
/// ```
#[derive(Debug, Clone, Default)]
pub enum Registration {
    /// Claimed, but not reachable yet.
    #[default]
    Reserved,

    /// Reachable through this outbox.
    Bound(Outbox),
}

impl Registration {
    /// The delivery handle, if one has been bound.
    pub fn outbox(&self) -> Option<&Outbox> {
        match self {
            Self::Reserved => None,
            Self::Bound(outbox) => Some(outbox),
        }
    }
}
