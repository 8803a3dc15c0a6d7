//! The membership and delivery contract behind every session.
//!
//! Sessions don't know where nicknames are stored or how lines reach other
//! clients. They only need something that can reserve and release names and
//! fan messages out, so [`Backend`] is a trait. The server plugs in the
//! in-memory registry; the session tests plug in a recording fake.

use murmur_protocol::Nick;
use murmur_transport::Outbox;

/// Server-side storage of nicknames and delivery of chat lines.
///
/// Every method is total: there is no "backend unavailable" error, and a
/// delivery to a connection that has gone away is silently dropped.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because one backend is shared by every
/// connection task for the lifetime of the server.
pub trait Backend: Send + Sync + 'static {
    /// Atomically claims `nick` if nobody holds it.
    ///
    /// Returns `true` if this caller won. Safe under any number of
    /// concurrent callers: of two racing claims for one name, at most one
    /// succeeds.
    fn reserve(&self, nick: &Nick) -> bool;

    /// Frees `nick`, whether or not it is currently held, then pushes the
    /// updated users list to everyone still online.
    fn release(&self, nick: &Nick);

    /// Attaches (or replaces) the delivery handle of a reserved nickname.
    ///
    /// Kept apart from [`reserve`](Self::reserve) because the handshake
    /// reply is written before the connection is wired for fan-out.
    fn bind(&self, nick: &Nick, outbox: Outbox);

    /// Sends `FROM: <from> <text>` to every bound connection, the sender's
    /// own included.
    fn broadcast(&self, from: &Nick, text: &str);

    /// Sends `PRIV FROM: <from> TO: <to> <text>` to `to`, and the same line
    /// back to `from` if it is bound.
    ///
    /// Returns `false`, with nothing sent, if `to` is unknown or has no
    /// delivery handle yet.
    fn send_private(&self, from: &Nick, to: &str, text: &str) -> bool;

    /// Comma-joined snapshot of reserved nicknames, in no particular order.
    /// Empty when nobody is online.
    fn users_csv(&self) -> String;

    /// Pushes `USERS<csv>` to every bound connection.
    fn broadcast_users_list(&self);
}
