use thiserror::Error;

use crate::session::phase::Phase;
use crate::version::StompVersion;

/// Errors a `Session` or a commands-layer validator can raise.
///
/// None of these cause implicit reconnect or recovery; they are returned
/// synchronously from the operation that discovered them and the session's
/// state is left unmutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("operation not permitted in phase {phase:?}")]
    ProtocolState { phase: Phase },

    #[error("no common version between offered {offered:?} and server version {server}")]
    ProtocolNegotiation { offered: Vec<StompVersion>, server: String },

    #[error("unknown subscription {0:?}")]
    UnknownSubscription(String),

    #[error("unknown transaction {0:?}")]
    UnknownTransaction(String),

    #[error("command {command} is not supported in version {version}")]
    UnsupportedCommand { command: &'static str, version: StompVersion },

    #[error("invalid or missing header: {0}")]
    InvalidHeader(&'static str),
}
