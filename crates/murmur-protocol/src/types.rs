//! Protocol types: nicknames and the lines the server sends.

use std::borrow::Borrow;
use std::fmt;

use crate::wire;
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Nick
// ---------------------------------------------------------------------------

/// A validated nickname.
///
/// Non-empty, free of whitespace, and no longer than the limit it was
/// parsed against. Comparison is case-sensitive. The only way to build one
/// is [`Nick::parse`], so any `Nick` in hand is known to be well-formed.
///
/// `Borrow<str>` lets registries keyed by `Nick` be queried with a plain
/// `&str`, e.g. the unvalidated target of a direct message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nick(String);

impl Nick {
    /// Validates a handshake candidate.
    ///
    /// `max_len` is counted in characters, not bytes.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidNick`] if the candidate is empty, contains
    /// any whitespace, or is longer than `max_len`.
    pub fn parse(candidate: &str, max_len: usize) -> Result<Self, ProtocolError> {
        if candidate.is_empty()
            || candidate.chars().any(char::is_whitespace)
            || candidate.chars().count() > max_len
        {
            return Err(ProtocolError::InvalidNick(candidate.to_string()));
        }
        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Nick {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Nick {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Nick {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Nick {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// ErrorReason
// ---------------------------------------------------------------------------

/// Every `ERROR ...` line the server can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorReason {
    InvalidNick,
    NickTaken,
    NotLoggedIn,
    InvalidMessage,
    UserNotFound,
    UnknownCommand,
}

impl ErrorReason {
    /// The full wire line, e.g. `ERROR Nick taken`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidNick => wire::ERR_INVALID_NICK,
            Self::NickTaken => wire::ERR_NICK_TAKEN,
            Self::NotLoggedIn => wire::ERR_NOT_LOGGED_IN,
            Self::InvalidMessage => wire::ERR_INVALID_MSG,
            Self::UserNotFound => wire::ERR_USER_NOT_FOUND,
            Self::UnknownCommand => wire::ERR_UNKNOWN,
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ProtocolError> for ErrorReason {
    fn from(err: &ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidNick(_) => Self::InvalidNick,
            ProtocolError::InvalidMessage(_) => Self::InvalidMessage,
            ProtocolError::UnknownCommand(_) => Self::UnknownCommand,
        }
    }
}

impl From<ProtocolError> for ErrorReason {
    fn from(err: ProtocolError) -> Self {
        Self::from(&err)
    }
}

// ---------------------------------------------------------------------------
// ServerLine
// ---------------------------------------------------------------------------

/// A line sent from the server to a client.
///
/// `Display` renders the exact wire text, without a line terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    /// Handshake accepted.
    Welcome,

    /// A rejected command, sent only to the connection that sent it.
    Error(ErrorReason),

    /// Broadcast delivery: `FROM: <from> <text>`.
    From { from: Nick, text: String },

    /// Direct delivery: `PRIV FROM: <from> TO: <to> <text>`.
    Private { from: Nick, to: Nick, text: String },

    /// Member list: `USERS<csv>`, with no separator before the csv and an
    /// empty csv when nobody is online.
    Users(String),
}

impl fmt::Display for ServerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => f.write_str(wire::WELCOME),
            Self::Error(reason) => f.write_str(reason.as_str()),
            Self::From { from, text } => {
                write!(f, "{}{from} {text}", wire::FROM)
            }
            Self::Private { from, to, text } => {
                write!(f, "{}{from}{}{to} {text}", wire::PRIV_FROM, wire::PRIV_TO)
            }
            Self::Users(csv) => write!(f, "{}{csv}", wire::LIST_USERS),
        }
    }
}

impl From<ErrorReason> for ServerLine {
    fn from(reason: ErrorReason) -> Self {
        Self::Error(reason)
    }
}
