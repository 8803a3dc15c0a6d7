//! Literal prefixes and responses of the line protocol.
//!
//! All matching is case-sensitive and by exact prefix.

/// Client handshake prefix: `HELLO <nick>`.
pub const HANDSHAKE: &str = "HELLO ";
/// Public message prefix: `MSG <text>`.
pub const MSG: &str = "MSG ";
/// Direct message prefix: `PRIV <nick> <text>`.
pub const PRIV: &str = "PRIV ";
/// Users list request, and the prefix of the server's reply: `USERS<csv>`.
pub const LIST_USERS: &str = "USERS";
/// Ends the logged-in session without closing the connection.
pub const QUIT: &str = "QUIT";

/// Handshake accepted.
pub const WELCOME: &str = "WELCOME";
/// Broadcast delivery prefix: `FROM: <nick> <text>`.
pub const FROM: &str = "FROM: ";
/// Direct delivery prefix: `PRIV FROM: <from> TO: <to> <text>`.
pub const PRIV_FROM: &str = "PRIV FROM: ";
/// Separator before the recipient in a direct delivery line.
pub const PRIV_TO: &str = " TO: ";

pub const ERR_INVALID_NICK: &str = "ERROR Invalid nick";
pub const ERR_NICK_TAKEN: &str = "ERROR Nick taken";
pub const ERR_NOT_LOGGED_IN: &str = "ERROR Not logged in";
pub const ERR_INVALID_MSG: &str = "ERROR Invalid message";
pub const ERR_USER_NOT_FOUND: &str = "ERROR User not found";
pub const ERR_UNKNOWN: &str = "ERROR Unknown command";

/// Default maximum nickname length, in characters.
pub const MAX_NICK_LEN: usize = 20;
