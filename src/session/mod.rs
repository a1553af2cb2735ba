//! The endpoint state machine: connect handshake, subscription bookkeeping
//! with replay, transaction bookkeeping, receipt correlation, heart-beat
//! negotiation, and server-frame dispatch.
//!
//! `Session` performs no I/O. Every method is a synchronous function from
//! the current state plus an input (a command request or a parsed server
//! frame) to a new state plus an output (an outbound `Frame` and/or a list
//! of `Event`s). The caller owns the transport, the timers, and the
//! concurrency model.

pub mod error;
pub mod event;
pub mod heartbeat;
pub mod phase;
pub mod subscription;
pub mod transaction;

use std::time::Instant;

pub use error::SessionError;
pub use event::Event;
pub use phase::Phase;

use crate::commands::{self, AckHandle, AckMode, ConnectCommand};
use crate::frame::{Command, Frame, HeaderList};
use crate::version::{negotiate, StompVersion};
use receipt::PendingReceipts;
use subscription::{SubscriptionEntry, SubscriptionTable};
use transaction::TransactionSet;

pub mod receipt;

/// A pure, transport-agnostic STOMP protocol endpoint.
///
/// `Token` is a caller-opaque correlation handle attached to subscriptions
/// and receipts; the session stores and returns it but never inspects it.
#[derive(Debug, Clone)]
pub struct Session<Token: Clone> {
    phase: Phase,
    accept_versions: Vec<StompVersion>,
    version: Option<StompVersion>,
    server_id: Option<String>,
    client_heart_beat: (u32, u32),
    server_heart_beat: Option<(u32, u32)>,
    outbound_interval: u64,
    inbound_interval: u64,
    subscriptions: SubscriptionTable<Token>,
    transactions: TransactionSet,
    pending_receipts: PendingReceipts<Token>,
    pending_disconnect_receipt: Option<String>,
    subscription_counter: u64,
    transaction_counter: u64,
    receipt_counter: u64,
    last_outbound: Option<Instant>,
    last_inbound: Option<Instant>,
}

impl<Token: Clone> Default for Session<Token> {
    fn default() -> Self {
        Session {
            phase: Phase::Disconnected,
            accept_versions: Vec::new(),
            version: None,
            server_id: None,
            client_heart_beat: (0, 0),
            server_heart_beat: None,
            outbound_interval: 0,
            inbound_interval: 0,
            subscriptions: SubscriptionTable::new(),
            transactions: TransactionSet::new(),
            pending_receipts: PendingReceipts::new(),
            pending_disconnect_receipt: None,
            subscription_counter: 0,
            transaction_counter: 0,
            receipt_counter: 0,
            last_outbound: None,
            last_inbound: None,
        }
    }
}

impl<Token: Clone> Session<Token> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn version(&self) -> Option<StompVersion> {
        self.version
    }

    pub fn server_id(&self) -> Option<&str> {
        self.server_id.as_deref()
    }

    /// `(outbound, inbound)` advisory heart-beat intervals in milliseconds,
    /// `0` meaning disabled. Only meaningful once `Connected`.
    pub fn heart_beat_intervals(&self) -> (u64, u64) {
        (self.outbound_interval, self.inbound_interval)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn has_active_transaction(&self, transaction_id: &str) -> bool {
        self.transactions.contains(transaction_id)
    }

    pub fn pending_receipt_count(&self) -> usize {
        self.pending_receipts.len()
    }

    fn require_connected(&self) -> Result<(), SessionError> {
        if self.phase == Phase::Connected {
            Ok(())
        } else {
            Err(SessionError::ProtocolState { phase: self.phase })
        }
    }

    fn next_subscription_id(&mut self) -> String {
        let id = self.subscription_counter;
        self.subscription_counter += 1;
        id.to_string()
    }

    fn next_transaction_id(&mut self) -> String {
        let id = self.transaction_counter;
        self.transaction_counter += 1;
        id.to_string()
    }

    fn next_receipt_id(&mut self) -> String {
        let id = self.receipt_counter;
        self.receipt_counter += 1;
        id.to_string()
    }

    fn note_outbound(&mut self) {
        self.last_outbound = Some(Instant::now());
    }

    fn note_inbound(&mut self) {
        self.last_inbound = Some(Instant::now());
    }

    /// Builds the client's opening frame and moves the session to
    /// `Connecting`. Only valid from `Disconnected`.
    pub fn connect(
        &mut self,
        accept_versions: &[StompVersion],
        host: &str,
        login: Option<&str>,
        passcode: Option<&str>,
        heart_beat: (u32, u32),
    ) -> Result<Frame, SessionError> {
        self.connect_as(accept_versions, host, login, passcode, heart_beat, ConnectCommand::Auto)
    }

    /// Like `connect`, but lets the caller pin the opening command token
    /// instead of letting version offer decide it.
    pub fn connect_as(
        &mut self,
        accept_versions: &[StompVersion],
        host: &str,
        login: Option<&str>,
        passcode: Option<&str>,
        heart_beat: (u32, u32),
        command: ConnectCommand,
    ) -> Result<Frame, SessionError> {
        if self.phase != Phase::Disconnected {
            return Err(SessionError::ProtocolState { phase: self.phase });
        }
        self.accept_versions = accept_versions.to_vec();
        self.client_heart_beat = heart_beat;
        self.phase = Phase::Connecting;
        tracing::debug!(?accept_versions, host, "stomp session connecting");
        let frame = commands::build_connect_frame(accept_versions, host, login, passcode, heart_beat, command);
        self.note_outbound();
        Ok(frame)
    }

    /// Feeds a parsed server frame to the session, returning the resulting
    /// events. Only `CONNECTED`, `MESSAGE`, `RECEIPT`, and `ERROR` are
    /// valid inputs; anything else is a protocol state error since those
    /// are client-originated commands.
    pub fn receive(&mut self, frame: Frame) -> Result<Vec<Event<Token>>, SessionError> {
        self.note_inbound();
        match frame.command {
            Command::Connected => self.receive_connected(frame),
            Command::Message => self.receive_message(frame),
            Command::Receipt => self.receive_receipt(frame),
            Command::Error => self.receive_error(frame),
            _ => Err(SessionError::ProtocolState { phase: self.phase }),
        }
    }

    fn receive_connected(&mut self, frame: Frame) -> Result<Vec<Event<Token>>, SessionError> {
        if self.phase != Phase::Connecting {
            return Err(SessionError::ProtocolState { phase: self.phase });
        }
        let info = commands::parse_connected(&frame)?;
        let negotiated = negotiate(&self.accept_versions, info.version).ok_or_else(|| {
            SessionError::ProtocolNegotiation { offered: self.accept_versions.clone(), server: info.version.to_string() }
        })?;
        self.version = Some(negotiated);
        self.server_id = info.server;
        self.server_heart_beat = Some(info.heart_beat);
        let (outbound, inbound) = heartbeat::negotiate_intervals(self.client_heart_beat, info.heart_beat);
        self.outbound_interval = outbound;
        self.inbound_interval = inbound;
        self.phase = Phase::Connected;
        tracing::debug!(version = %negotiated, outbound, inbound, "stomp session connected");
        Ok(vec![Event::Connected { version: negotiated }])
    }

    fn receive_message(&mut self, frame: Frame) -> Result<Vec<Event<Token>>, SessionError> {
        if self.phase != Phase::Connected {
            return Err(SessionError::ProtocolState { phase: self.phase });
        }
        let info = commands::parse_message(&frame)?;
        let resolved = match &info.subscription {
            Some(sub_id) => self.subscriptions.get(sub_id).map(|entry| (sub_id.clone(), entry.token.clone())),
            None => info
                .destination
                .as_ref()
                .and_then(|destination| self.subscriptions.find_by_destination(destination))
                .map(|(id, entry)| (id.to_string(), entry.token.clone())),
        };
        match resolved {
            Some((subscription_id, token)) => {
                let ack = AckHandle { message_id: info.message_id, subscription_id, ack_id: info.ack_id };
                Ok(vec![Event::MessageReceived { token, ack, frame }])
            }
            None => {
                tracing::warn!(?info.subscription, ?info.destination, "orphan MESSAGE, no matching subscription");
                Ok(vec![Event::OrphanMessage { frame }])
            }
        }
    }

    fn receive_receipt(&mut self, frame: Frame) -> Result<Vec<Event<Token>>, SessionError> {
        let receipt_id = commands::parse_receipt_id(&frame)?;
        match self.phase {
            Phase::Connected => Ok(vec![self.resolve_receipt(receipt_id)]),
            Phase::Disconnecting => {
                if self.pending_disconnect_receipt.as_deref() == Some(receipt_id.as_str()) {
                    let event = self.resolve_receipt(receipt_id);
                    self.pending_disconnect_receipt = None;
                    self.phase = Phase::Disconnected;
                    self.transactions.clear();
                    tracing::debug!("stomp session disconnected cleanly");
                    Ok(vec![event])
                } else {
                    Err(SessionError::ProtocolState { phase: self.phase })
                }
            }
            _ => Err(SessionError::ProtocolState { phase: self.phase }),
        }
    }

    fn resolve_receipt(&mut self, receipt_id: String) -> Event<Token> {
        match self.pending_receipts.resolve(&receipt_id) {
            Some(token) => Event::ReceiptReceived { token },
            None => Event::OrphanReceipt { receipt_id },
        }
    }

    fn receive_error(&mut self, frame: Frame) -> Result<Vec<Event<Token>>, SessionError> {
        if !matches!(self.phase, Phase::Connected | Phase::Disconnecting) {
            return Err(SessionError::ProtocolState { phase: self.phase });
        }
        Ok(vec![Event::ErrorReceived { frame }])
    }

    /// Reports that the transport closed. Idempotent: a no-op if already
    /// `Disconnected`. Subscriptions are retained for `replay()`;
    /// transactions are cleared; every pending receipt resolves as
    /// `ReceiptCancelled`.
    pub fn disconnected(&mut self) -> Vec<Event<Token>> {
        if self.phase == Phase::Disconnected {
            return Vec::new();
        }
        tracing::debug!(phase = ?self.phase, "stomp transport disconnected");
        self.phase = Phase::Disconnected;
        self.version = None;
        self.server_heart_beat = None;
        self.outbound_interval = 0;
        self.inbound_interval = 0;
        self.pending_disconnect_receipt = None;
        self.transactions.clear();
        self.pending_receipts.drain().into_iter().map(|(_, token)| Event::ReceiptCancelled { token }).collect()
    }

    /// Registers a subscription and builds its `SUBSCRIBE` frame.
    /// `extra_headers` may supply an `id` header to pin a specific id
    /// (otherwise one is generated) and/or a `receipt` header to request
    /// an end-to-end acknowledgement.
    pub fn subscribe(
        &mut self,
        destination: &str,
        ack_mode: AckMode,
        extra_headers: HeaderList,
        token: Token,
    ) -> Result<(Frame, String), SessionError> {
        self.require_connected()?;
        let version = self.version.expect("Connected phase always has a negotiated version");
        let id = match extra_headers.get("id") {
            Some(existing) => existing.to_string(),
            None => self.next_subscription_id(),
        };
        let frame = commands::build_subscribe_frame(version, &id, destination, ack_mode, extra_headers.clone())?;
        if let Some(receipt_id) = frame.headers.get("receipt") {
            self.pending_receipts.register(receipt_id.to_string(), token.clone());
        }
        self.subscriptions.insert(
            id.clone(),
            SubscriptionEntry { destination: destination.to_string(), headers: extra_headers, ack_mode, token },
        );
        self.note_outbound();
        tracing::debug!(id, destination, "stomp subscribe");
        Ok((frame, id))
    }

    /// Removes a subscription and builds its `UNSUBSCRIBE` frame.
    pub fn unsubscribe(&mut self, id: &str) -> Result<Frame, SessionError> {
        self.require_connected()?;
        self.subscriptions.remove(id).ok_or_else(|| SessionError::UnknownSubscription(id.to_string()))?;
        self.note_outbound();
        Ok(commands::build_unsubscribe_frame(id))
    }

    /// Returns the active subscriptions' `SUBSCRIBE` frames in original
    /// insertion order, with identical ids and headers, so the caller can
    /// reconstruct consumer state after a forced reconnect without
    /// tracking subscriptions itself.
    pub fn replay(&self) -> Result<Vec<Frame>, SessionError> {
        let version = self.version.ok_or(SessionError::ProtocolState { phase: self.phase })?;
        self.subscriptions
            .iter()
            .map(|(id, entry)| commands::build_subscribe_frame(version, id, &entry.destination, entry.ack_mode, entry.headers.clone()))
            .collect()
    }

    /// Builds a `SEND` frame. A `receipt` header in `extra_headers`
    /// registers a pending receipt keyed to `token`.
    pub fn send(&mut self, destination: &str, extra_headers: HeaderList, body: Vec<u8>, token: Token) -> Result<Frame, SessionError> {
        self.require_connected()?;
        let frame = commands::build_send_frame(destination, extra_headers, body);
        if let Some(receipt_id) = frame.headers.get("receipt") {
            self.pending_receipts.register(receipt_id.to_string(), token);
        }
        self.note_outbound();
        Ok(frame)
    }

    /// Starts a transaction, generating an id when `transaction_id` is
    /// `None`.
    pub fn begin(&mut self, transaction_id: Option<String>) -> Result<(Frame, String), SessionError> {
        self.require_connected()?;
        let id = transaction_id.unwrap_or_else(|| self.next_transaction_id());
        self.transactions.begin(id.clone());
        self.note_outbound();
        Ok((commands::build_begin_frame(&id), id))
    }

    pub fn commit(&mut self, transaction_id: &str) -> Result<Frame, SessionError> {
        self.require_connected()?;
        if !self.transactions.end(transaction_id) {
            return Err(SessionError::UnknownTransaction(transaction_id.to_string()));
        }
        self.note_outbound();
        Ok(commands::build_commit_frame(transaction_id))
    }

    pub fn abort(&mut self, transaction_id: &str) -> Result<Frame, SessionError> {
        self.require_connected()?;
        if !self.transactions.end(transaction_id) {
            return Err(SessionError::UnknownTransaction(transaction_id.to_string()));
        }
        self.note_outbound();
        Ok(commands::build_abort_frame(transaction_id))
    }

    /// Builds an `ACK` for a message, shaped per the negotiated version.
    pub fn ack(&mut self, handle: &AckHandle, transaction: Option<&str>) -> Result<Frame, SessionError> {
        self.require_connected()?;
        let version = self.version.expect("Connected phase always has a negotiated version");
        self.note_outbound();
        Ok(commands::build_ack_frame(version, handle, transaction))
    }

    /// Builds a `NACK` for a message. Fails with `UnsupportedCommand` in
    /// 1.0, which has no `NACK`.
    pub fn nack(&mut self, handle: &AckHandle, transaction: Option<&str>) -> Result<Frame, SessionError> {
        self.require_connected()?;
        let version = self.version.expect("Connected phase always has a negotiated version");
        let frame = commands::build_nack_frame(version, handle, transaction)?;
        self.note_outbound();
        Ok(frame)
    }

    /// Requests a graceful disconnect. Always asks for a `RECEIPT` so the
    /// `Disconnecting -> Disconnected` transition has a deterministic
    /// trigger; `receive()` completes the transition when it arrives.
    pub fn disconnect(&mut self, token: Token) -> Result<Frame, SessionError> {
        self.require_connected()?;
        let receipt_id = self.next_receipt_id();
        let frame = commands::build_disconnect_frame(Some(&receipt_id));
        self.pending_receipts.register(receipt_id.clone(), token);
        self.pending_disconnect_receipt = Some(receipt_id);
        self.phase = Phase::Disconnecting;
        self.note_outbound();
        tracing::debug!("stomp session disconnecting");
        Ok(frame)
    }
}
