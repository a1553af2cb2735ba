use crate::frame::{Command, Frame, HeaderList};
use crate::session::error::SessionError;
use crate::version::StompVersion;

/// The identifying fields off a `MESSAGE` frame needed to acknowledge it.
///
/// Handed back to the caller inside `Event::MessageReceived` so they never
/// have to re-parse the original frame's headers to build an ACK/NACK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckHandle {
    pub message_id: String,
    pub subscription_id: String,
    /// Present only from 1.2 on, where the server assigns an opaque `ack`
    /// header distinct from `message-id`.
    pub ack_id: Option<String>,
}

fn build(version: StompVersion, command: Command, handle: &AckHandle, transaction: Option<&str>) -> Frame {
    let mut headers = HeaderList::new();
    match version {
        StompVersion::V1_0 => {
            headers.push("message-id", handle.message_id.clone());
        }
        StompVersion::V1_1 => {
            headers.push("message-id", handle.message_id.clone());
            headers.push("subscription", handle.subscription_id.clone());
        }
        StompVersion::V1_2 => {
            let id = handle.ack_id.clone().unwrap_or_else(|| handle.message_id.clone());
            headers.push("id", id);
        }
    }
    if let Some(transaction) = transaction {
        headers.push("transaction", transaction);
    }
    Frame::new(command, headers, Vec::new())
}

/// Builds an `ACK` frame, shaped per the negotiated version's rules.
pub fn build_ack_frame(version: StompVersion, handle: &AckHandle, transaction: Option<&str>) -> Frame {
    build(version, Command::Ack, handle, transaction)
}

/// Builds a `NACK` frame. `NACK` does not exist in 1.0.
pub fn build_nack_frame(
    version: StompVersion,
    handle: &AckHandle,
    transaction: Option<&str>,
) -> Result<Frame, SessionError> {
    if version == StompVersion::V1_0 {
        return Err(SessionError::UnsupportedCommand { command: "NACK", version });
    }
    Ok(build(version, Command::Nack, handle, transaction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> AckHandle {
        AckHandle {
            message_id: "m1".into(),
            subscription_id: "0".into(),
            ack_id: Some("a1".into()),
        }
    }

    #[test]
    fn v1_0_ack_uses_message_id_only() {
        let frame = build_ack_frame(StompVersion::V1_0, &handle(), None);
        assert_eq!(frame.headers.get("message-id"), Some("m1"));
        assert_eq!(frame.headers.get("subscription"), None);
        assert_eq!(frame.headers.get("id"), None);
    }

    #[test]
    fn v1_1_ack_requires_message_id_and_subscription() {
        let frame = build_ack_frame(StompVersion::V1_1, &handle(), None);
        assert_eq!(frame.headers.get("message-id"), Some("m1"));
        assert_eq!(frame.headers.get("subscription"), Some("0"));
    }

    #[test]
    fn v1_2_ack_uses_ack_id() {
        let frame = build_ack_frame(StompVersion::V1_2, &handle(), None);
        assert_eq!(frame.headers.get("id"), Some("a1"));
        assert_eq!(frame.headers.get("message-id"), None);
    }

    #[test]
    fn nack_rejected_under_1_0() {
        let err = build_nack_frame(StompVersion::V1_0, &handle(), None).unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedCommand { command: "NACK", .. }));
    }

    #[test]
    fn nack_allowed_from_1_1() {
        let frame = build_nack_frame(StompVersion::V1_1, &handle(), Some("tx1")).unwrap();
        assert_eq!(frame.command, Command::Nack);
        assert_eq!(frame.headers.get("transaction"), Some("tx1"));
    }
}
