//! The per-connection protocol state machine.
//!
//! A session is in one of two states, tracked by a single optional field:
//!
//! ```text
//!   Unauthenticated ──(HELLO ok)──→ Authenticated(nick)
//!         ↑                                │
//!         └──────────(QUIT / drop)─────────┘
//! ```
//!
//! Each line yields at most one direct reply. Broadcasts and direct
//! messages are delivered through the [`Backend`] fan-out instead, so the
//! sender sees them on the same channel as everyone else.

use std::sync::Arc;

use murmur_protocol::{Command, ErrorReason, MAX_NICK_LEN, Nick, ServerLine};

use crate::Backend;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Limits applied while interpreting client lines.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Longest accepted nickname, in characters.
    ///
    /// Default: 20.
    pub max_nick_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_nick_len: MAX_NICK_LEN,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientSession
// ---------------------------------------------------------------------------

/// Interprets the lines of one connection.
///
/// Owned by that connection's task and never shared. Dropping the session
/// releases its nickname, so a connection that ends for any reason frees
/// its name exactly as `QUIT` would.
pub struct ClientSession<B: Backend> {
    backend: Arc<B>,
    config: SessionConfig,
    nick: Option<Nick>,
}

impl<B: Backend> ClientSession<B> {
    /// Creates an unauthenticated session bound to a shared backend.
    pub fn new(backend: Arc<B>, config: SessionConfig) -> Self {
        Self {
            backend,
            config,
            nick: None,
        }
    }

    /// Processes one line received from the client.
    ///
    /// Returns the line to send straight back, or `None` when the command
    /// needs no direct reply. Never fails: malformed or out-of-state input
    /// produces an `ERROR` reply and leaves the state unchanged.
    pub fn process(&mut self, line: &str) -> Option<ServerLine> {
        let command = Command::parse(line);

        let Some(nick) = self.nick.as_ref() else {
            return Some(match command {
                Ok(Command::Hello(candidate)) => self.handshake(&candidate),
                _ => ServerLine::Error(ErrorReason::NotLoggedIn),
            });
        };

        match command {
            Ok(Command::Msg(text)) => {
                self.backend.broadcast(nick, &text);
                None
            }
            Ok(Command::Priv { target, text }) => {
                if self.backend.send_private(nick, &target, &text) {
                    None
                } else {
                    tracing::debug!(%nick, %target, "direct message to unknown user");
                    Some(ServerLine::Error(ErrorReason::UserNotFound))
                }
            }
            Ok(Command::Users) => {
                Some(ServerLine::Users(self.backend.users_csv()))
            }
            Ok(Command::Quit) => {
                self.disconnect();
                None
            }
            // Already logged in; a second handshake is not a command here.
            Ok(Command::Hello(_)) => {
                Some(ServerLine::Error(ErrorReason::UnknownCommand))
            }
            Err(e) => {
                tracing::debug!(%nick, error = %e, "rejected line");
                Some(ServerLine::Error(e.into()))
            }
        }
    }

    /// The nickname this session is logged in as, if any.
    pub fn nick(&self) -> Option<&Nick> {
        self.nick.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.nick.is_some()
    }

    /// Logs the session out, releasing its nickname.
    ///
    /// Returns the released nickname. Idempotent: a session that isn't
    /// logged in does nothing and returns `None`.
    pub fn disconnect(&mut self) -> Option<Nick> {
        let nick = self.nick.take()?;
        self.backend.release(&nick);
        tracing::info!(%nick, "nickname released");
        Some(nick)
    }

    fn handshake(&mut self, candidate: &str) -> ServerLine {
        let nick = match Nick::parse(candidate, self.config.max_nick_len) {
            Ok(nick) => nick,
            Err(e) => {
                tracing::debug!(error = %e, "handshake rejected");
                return ServerLine::Error(e.into());
            }
        };

        if !self.backend.reserve(&nick) {
            tracing::debug!(%nick, "handshake rejected, nickname taken");
            return ServerLine::Error(ErrorReason::NickTaken);
        }

        tracing::info!(%nick, "nickname reserved");
        self.nick = Some(nick);
        ServerLine::Welcome
    }
}

impl<B: Backend> Drop for ClientSession<B> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `ClientSession`.
    //!
    //! The backend is a recording fake: it logs every call and answers
    //! `reserve` / `send_private` from a small in-memory table, so each test
    //! can assert exactly which backend calls a line produced.

    use std::collections::HashSet;
    use std::sync::Mutex;

    use murmur_transport::Outbox;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Reserve(String),
        Release(String),
        Broadcast(String, String),
        SendPrivate(String, String, String),
        UsersCsv,
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<Call>>,
        taken: Mutex<HashSet<String>>,
        reachable: Mutex<HashSet<String>>,
    }

    impl RecordingBackend {
        /// `taken` names are already reserved; `reachable` names can
        /// receive direct messages.
        fn new(taken: &[&str], reachable: &[&str]) -> Arc<Self> {
            let backend = Self::default();
            backend
                .taken
                .lock()
                .unwrap()
                .extend(taken.iter().map(|n| n.to_string()));
            backend
                .reachable
                .lock()
                .unwrap()
                .extend(reachable.iter().map(|n| n.to_string()));
            Arc::new(backend)
        }

        fn with_taken(names: &[&str]) -> Arc<Self> {
            Self::new(names, &[])
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl Backend for RecordingBackend {
        fn reserve(&self, nick: &Nick) -> bool {
            self.record(Call::Reserve(nick.to_string()));
            self.taken.lock().unwrap().insert(nick.to_string())
        }

        fn release(&self, nick: &Nick) {
            self.record(Call::Release(nick.to_string()));
            self.taken.lock().unwrap().remove(nick.as_str());
        }

        fn bind(&self, _nick: &Nick, _outbox: Outbox) {}

        fn broadcast(&self, from: &Nick, text: &str) {
            self.record(Call::Broadcast(from.to_string(), text.to_string()));
        }

        fn send_private(&self, from: &Nick, to: &str, text: &str) -> bool {
            self.record(Call::SendPrivate(
                from.to_string(),
                to.to_string(),
                text.to_string(),
            ));
            self.reachable.lock().unwrap().contains(to)
        }

        fn users_csv(&self) -> String {
            self.record(Call::UsersCsv);
            let mut names: Vec<_> =
                self.taken.lock().unwrap().iter().cloned().collect();
            names.sort();
            names.join(",")
        }

        fn broadcast_users_list(&self) {}
    }

    // -- Helpers ----------------------------------------------------------

    fn session(backend: &Arc<RecordingBackend>) -> ClientSession<RecordingBackend> {
        ClientSession::new(Arc::clone(backend), SessionConfig::default())
    }

    /// A session already logged in as `alice`, with the call log cleared.
    fn logged_in(
        backend: &Arc<RecordingBackend>,
    ) -> ClientSession<RecordingBackend> {
        let mut s = session(backend);
        assert_eq!(s.process("HELLO alice"), Some(ServerLine::Welcome));
        backend.calls.lock().unwrap().clear();
        s
    }

    fn error(reason: ErrorReason) -> Option<ServerLine> {
        Some(ServerLine::Error(reason))
    }

    // =====================================================================
    // Handshake
    // =====================================================================

    #[test]
    fn test_hello_free_nick_returns_welcome() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = session(&backend);

        let resp = s.process("HELLO alice");

        assert_eq!(resp, Some(ServerLine::Welcome));
        assert_eq!(s.nick().map(Nick::as_str), Some("alice"));
        assert!(s.is_authenticated());
        assert_eq!(backend.calls(), vec![Call::Reserve("alice".into())]);
    }

    #[test]
    fn test_hello_taken_nick_returns_nick_taken() {
        let backend = RecordingBackend::with_taken(&["alice"]);
        let mut s = session(&backend);

        assert_eq!(s.process("HELLO alice"), error(ErrorReason::NickTaken));
        assert!(!s.is_authenticated());
    }

    #[test]
    fn test_hello_after_taken_can_retry_with_other_nick() {
        let backend = RecordingBackend::with_taken(&["alice"]);
        let mut s = session(&backend);

        s.process("HELLO alice");
        assert_eq!(s.process("HELLO alicia"), Some(ServerLine::Welcome));
        assert_eq!(s.nick().unwrap(), "alicia");
    }

    #[test]
    fn test_hello_invalid_nick_never_touches_backend() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = session(&backend);
        let too_long = format!("HELLO {}", "x".repeat(21));

        for line in ["HELLO ", "HELLO    ", "HELLO al ice", too_long.as_str()] {
            assert_eq!(s.process(line), error(ErrorReason::InvalidNick), "{line:?}");
        }

        assert!(backend.calls().is_empty());
        assert!(!s.is_authenticated());
    }

    #[test]
    fn test_hello_respects_configured_nick_limit() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = ClientSession::new(
            Arc::clone(&backend),
            SessionConfig { max_nick_len: 3 },
        );

        assert_eq!(s.process("HELLO abcd"), error(ErrorReason::InvalidNick));
        assert_eq!(s.process("HELLO abc"), Some(ServerLine::Welcome));
    }

    #[test]
    fn test_hello_when_logged_in_is_unknown_command() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = logged_in(&backend);

        assert_eq!(s.process("HELLO bob"), error(ErrorReason::UnknownCommand));
        assert_eq!(s.nick().unwrap(), "alice");
        assert!(backend.calls().is_empty());
    }

    // =====================================================================
    // Login-before-use
    // =====================================================================

    #[test]
    fn test_commands_before_login_return_not_logged_in() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = session(&backend);

        for line in ["MSG hi", "PRIV bob yo", "USERS", "QUIT", "PING", ""] {
            assert_eq!(s.process(line), error(ErrorReason::NotLoggedIn), "{line:?}");
        }

        assert!(backend.calls().is_empty(), "no broadcast may happen");
    }

    // =====================================================================
    // Logged-in commands
    // =====================================================================

    #[test]
    fn test_msg_broadcasts_without_direct_reply() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = logged_in(&backend);

        assert_eq!(s.process("MSG hi all"), None);
        assert_eq!(
            backend.calls(),
            vec![Call::Broadcast("alice".into(), "hi all".into())]
        );
    }

    #[test]
    fn test_priv_to_reachable_user_has_no_direct_reply() {
        let backend = RecordingBackend::new(&[], &["bob"]);
        let mut s = logged_in(&backend);

        assert_eq!(s.process("PRIV bob yo there"), None);
        assert_eq!(
            backend.calls(),
            vec![Call::SendPrivate("alice".into(), "bob".into(), "yo there".into())]
        );
    }

    #[test]
    fn test_priv_to_unknown_user_returns_user_not_found() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = logged_in(&backend);

        assert_eq!(s.process("PRIV ghost boo"), error(ErrorReason::UserNotFound));
    }

    #[test]
    fn test_priv_without_text_returns_invalid_message() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = logged_in(&backend);

        assert_eq!(s.process("PRIV bob"), error(ErrorReason::InvalidMessage));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_users_replies_directly_with_csv() {
        let backend = RecordingBackend::with_taken(&["bob"]);
        let mut s = logged_in(&backend);

        assert_eq!(
            s.process("USERS"),
            Some(ServerLine::Users("alice,bob".into()))
        );
        assert_eq!(backend.calls(), vec![Call::UsersCsv]);
    }

    #[test]
    fn test_unknown_line_when_logged_in_returns_unknown_command() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = logged_in(&backend);

        assert_eq!(s.process("DANCE"), error(ErrorReason::UnknownCommand));
        assert!(s.is_authenticated());
    }

    // =====================================================================
    // Quit and disconnect
    // =====================================================================

    #[test]
    fn test_quit_releases_and_returns_to_unauthenticated() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = logged_in(&backend);

        assert_eq!(s.process("QUIT"), None);
        assert!(!s.is_authenticated());
        assert_eq!(backend.calls(), vec![Call::Release("alice".into())]);

        // Back to square one: commands need a new login.
        assert_eq!(s.process("MSG hi"), error(ErrorReason::NotLoggedIn));
        assert_eq!(s.process("HELLO alice"), Some(ServerLine::Welcome));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let backend = RecordingBackend::with_taken(&[]);
        let mut s = logged_in(&backend);

        assert_eq!(s.disconnect().unwrap(), "alice");
        assert_eq!(s.disconnect(), None);
        assert_eq!(backend.calls(), vec![Call::Release("alice".into())]);
    }

    #[test]
    fn test_drop_releases_held_nick() {
        let backend = RecordingBackend::with_taken(&[]);
        let s = logged_in(&backend);

        drop(s);

        assert_eq!(backend.calls(), vec![Call::Release("alice".into())]);
        assert!(backend.taken.lock().unwrap().is_empty());
    }

    #[test]
    fn test_drop_unauthenticated_session_does_nothing() {
        let backend = RecordingBackend::with_taken(&[]);
        drop(session(&backend));

        assert!(backend.calls().is_empty());
    }
}
