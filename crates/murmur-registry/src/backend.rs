//! The in-memory [`Backend`]: a `DashMap` of nicknames to registrations.
//!
//! # Concurrency note
//!
//! `DashMap` shards its table behind per-shard `RwLock`s, so reservation,
//! lookup and removal from many connection tasks never contend on one
//! global lock. Fan-out takes a snapshot of the bound outboxes first and
//! delivers after every shard guard is dropped. Delivering into an outbox
//! is a non-blocking channel send, so no lock is ever held across socket
//! I/O.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use murmur_protocol::{Nick, ServerLine};
use murmur_session::Backend;
use murmur_transport::Outbox;

use crate::Registration;

/// Registry of every nickname currently claimed on this server.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: DashMap<Nick, Registration>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `nick` is currently reserved (bound or not).
    pub fn contains(&self, nick: &str) -> bool {
        self.entries.contains_key(nick)
    }

    /// Number of reserved nicknames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clones the outbox registered for `nick`, releasing the shard guard
    /// before returning.
    fn outbox_of(&self, nick: &str) -> Option<Outbox> {
        self.entries
            .get(nick)
            .and_then(|entry| entry.outbox().cloned())
    }

    /// Snapshot of every bound outbox.
    fn bound_outboxes(&self) -> Vec<Outbox> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outbox().cloned())
            .collect()
    }

    fn fan_out(&self, line: &ServerLine) {
        let line = line.to_string();
        let targets = self.bound_outboxes();
        tracing::debug!(recipients = targets.len(), %line, "fan-out");
        for outbox in targets {
            outbox.deliver(line.as_str());
        }
    }
}

impl Backend for InMemoryBackend {
    fn reserve(&self, nick: &Nick) -> bool {
        match self.entries.entry(nick.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Registration::Reserved);
                true
            }
        }
    }

    fn release(&self, nick: &Nick) {
        if self.entries.remove(nick).is_some() {
            tracing::debug!(%nick, "registration removed");
        }
        self.broadcast_users_list();
    }

    fn bind(&self, nick: &Nick, outbox: Outbox) {
        match self.entries.get_mut(nick) {
            Some(mut entry) => {
                tracing::debug!(%nick, conn_id = %outbox.connection_id(), "outbox bound");
                *entry = Registration::Bound(outbox);
            }
            None => {
                tracing::debug!(%nick, "bind ignored, nickname not reserved");
            }
        }
    }

    fn broadcast(&self, from: &Nick, text: &str) {
        self.fan_out(&ServerLine::From {
            from: from.clone(),
            text: text.to_string(),
        });
    }

    fn send_private(&self, from: &Nick, to: &str, text: &str) -> bool {
        let Some((to, recipient)) = self.entries.get(to).and_then(|entry| {
            entry
                .outbox()
                .map(|outbox| (entry.key().clone(), outbox.clone()))
        }) else {
            return false;
        };

        let line = ServerLine::Private {
            from: from.clone(),
            to,
            text: text.to_string(),
        }
        .to_string();

        recipient.deliver(line.as_str());
        if let Some(sender) = self.outbox_of(from.as_str()) {
            sender.deliver(line);
        }
        true
    }

    fn users_csv(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.key().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn broadcast_users_list(&self) {
        self.fan_out(&ServerLine::Users(self.users_csv()));
    }
}
