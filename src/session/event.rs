use crate::commands::AckHandle;
use crate::frame::Frame;
use crate::version::StompVersion;

/// Everything a `Session` can report back to the caller as a result of
/// feeding it a server frame. This is the data-not-callback surface the
/// redesign calls for: the session never decides policy (disconnect /
/// forward / retry) on behalf of the caller, it only surfaces what
/// happened, with enough detail (the original `Token`, an `AckHandle`) to
/// act on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<Token> {
    /// Handshake completed; `version` is the negotiated wire version.
    Connected { version: StompVersion },
    /// A `MESSAGE` resolved to one of the caller's subscriptions.
    MessageReceived { token: Token, ack: AckHandle, frame: Frame },
    /// A `MESSAGE` whose subscription could not be resolved. Never
    /// auto-acknowledged.
    OrphanMessage { frame: Frame },
    /// A `RECEIPT` matched a pending receipt registered by an earlier
    /// outbound frame.
    ReceiptReceived { token: Token },
    /// A pending receipt was abandoned because the transport reported a
    /// disconnect before the matching `RECEIPT` arrived.
    ReceiptCancelled { token: Token },
    /// A `RECEIPT` whose id matched no pending receipt.
    OrphanReceipt { receipt_id: String },
    /// An `ERROR` frame from the broker. Not fatal by itself; the caller
    /// decides whether to close the connection.
    ErrorReceived { frame: Frame },
}
