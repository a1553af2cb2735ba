//! Validators for the server-originated frames a `Session` can receive:
//! `CONNECTED`, `MESSAGE`, `RECEIPT`, `ERROR`. These only extract and check
//! headers; they never touch session state themselves.

use crate::frame::Frame;
use crate::session::error::SessionError;
use crate::version::StompVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedInfo {
    pub version: StompVersion,
    pub server: Option<String>,
    pub heart_beat: (u32, u32),
}

/// Parses a `CONNECTED` frame's `version`, `server`, and `heart-beat`
/// headers. Does not check the version against any accept list; that
/// negotiation happens in the session, which knows what it originally
/// offered.
pub fn parse_connected(frame: &Frame) -> Result<ConnectedInfo, SessionError> {
    let version_header = frame.headers.get("version").ok_or(SessionError::InvalidHeader("version"))?;
    let version = version_header.parse().map_err(|_| SessionError::InvalidHeader("version"))?;
    let server = frame.headers.get("server").map(str::to_string);
    let heart_beat = match frame.headers.get("heart-beat") {
        Some(value) => parse_heart_beat_header(value).ok_or(SessionError::InvalidHeader("heart-beat"))?,
        None => (0, 0),
    };
    Ok(ConnectedInfo { version, server, heart_beat })
}

fn parse_heart_beat_header(value: &str) -> Option<(u32, u32)> {
    let (x, y) = value.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub subscription: Option<String>,
    pub destination: Option<String>,
    pub message_id: String,
    pub ack_id: Option<String>,
}

/// Parses a `MESSAGE` frame's identifying headers. `message-id` is required
/// by every version; `subscription` is required from 1.1 on but this
/// function leaves that check to the session, which is the one that knows
/// the negotiated version and owns subscription resolution.
pub fn parse_message(frame: &Frame) -> Result<MessageInfo, SessionError> {
    let message_id = frame
        .headers
        .get("message-id")
        .ok_or(SessionError::InvalidHeader("message-id"))?
        .to_string();
    Ok(MessageInfo {
        subscription: frame.headers.get("subscription").map(str::to_string),
        destination: frame.headers.get("destination").map(str::to_string),
        message_id,
        ack_id: frame.headers.get("ack").map(str::to_string),
    })
}

/// Parses a `RECEIPT` frame's `receipt-id` header.
pub fn parse_receipt_id(frame: &Frame) -> Result<String, SessionError> {
    frame
        .headers
        .get("receipt-id")
        .map(str::to_string)
        .ok_or(SessionError::InvalidHeader("receipt-id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Command, HeaderList};

    #[test]
    fn parses_connected_with_heart_beat() {
        let headers = HeaderList::new().with("version", "1.2").with("heart-beat", "10,20").with("server", "broker/1.0");
        let frame = Frame::new(Command::Connected, headers, Vec::new());
        let info = parse_connected(&frame).unwrap();
        assert_eq!(info.version, StompVersion::V1_2);
        assert_eq!(info.heart_beat, (10, 20));
        assert_eq!(info.server.as_deref(), Some("broker/1.0"));
    }

    #[test]
    fn connected_without_heart_beat_defaults_to_zero_zero() {
        let headers = HeaderList::new().with("version", "1.1");
        let frame = Frame::new(Command::Connected, headers, Vec::new());
        let info = parse_connected(&frame).unwrap();
        assert_eq!(info.heart_beat, (0, 0));
    }

    #[test]
    fn message_requires_message_id() {
        let headers = HeaderList::new().with("destination", "/q");
        let frame = Frame::new(Command::Message, headers, Vec::new());
        assert!(matches!(parse_message(&frame), Err(SessionError::InvalidHeader("message-id"))));
    }

    #[test]
    fn receipt_requires_receipt_id() {
        let frame = Frame::new(Command::Receipt, HeaderList::new(), Vec::new());
        assert!(parse_receipt_id(&frame).is_err());
    }
}
