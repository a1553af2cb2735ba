use crate::frame::{Command, Frame, HeaderList};
use crate::macros::impl_single_header_frame;
use crate::session::error::SessionError;
use crate::version::StompVersion;

/// Acknowledgement mode requested for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMode {
    Auto,
    Client,
    ClientIndividual,
}

impl AckMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AckMode::Auto => "auto",
            AckMode::Client => "client",
            AckMode::ClientIndividual => "client-individual",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        Some(match value {
            "auto" => AckMode::Auto,
            "client" => AckMode::Client,
            "client-individual" => AckMode::ClientIndividual,
            _ => return None,
        })
    }

    /// `client-individual` was introduced in 1.1; 1.0 only has `auto`/`client`.
    fn requires_version(self) -> Option<StompVersion> {
        match self {
            AckMode::ClientIndividual => Some(StompVersion::V1_1),
            _ => None,
        }
    }
}

/// Builds a `SUBSCRIBE` frame. `id` and `destination` are written verbatim;
/// the session is responsible for generating `id` when the caller omits one.
pub fn build_subscribe_frame(
    version: StompVersion,
    id: &str,
    destination: &str,
    ack_mode: AckMode,
    extra_headers: HeaderList,
) -> Result<Frame, SessionError> {
    if let Some(min_version) = ack_mode.requires_version() {
        if version < min_version {
            return Err(SessionError::UnsupportedCommand { command: ack_mode.as_str(), version });
        }
    }

    let mut headers = HeaderList::new();
    headers.push("id", id);
    headers.push("destination", destination);
    headers.push("ack", ack_mode.as_str());
    for (name, value) in extra_headers.iter() {
        if name == "id" || name == "destination" || name == "ack" {
            continue;
        }
        headers.push(name, value);
    }

    Ok(Frame::new(Command::Subscribe, headers, Vec::new()))
}

impl_single_header_frame!(build_unsubscribe_frame, Command::Unsubscribe, "id");
