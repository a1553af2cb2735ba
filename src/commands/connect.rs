use crate::frame::{Command, Frame, HeaderList};
use crate::version::{render_accept_versions, StompVersion};

/// Which command token to use for the client's opening frame.
///
/// `Auto` prefers the modern `STOMP` command
/// whenever 1.2 is offered, falling back to the legacy `CONNECT` token
/// otherwise. Callers that need to pin one or the other (e.g. talking to a
/// broker with a known quirky STOMP-command parser) can force it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectCommand {
    Auto,
    Stomp,
    Connect,
}

impl ConnectCommand {
    fn resolve(self, accept_versions: &[StompVersion]) -> Command {
        match self {
            ConnectCommand::Stomp => Command::Stomp,
            ConnectCommand::Connect => Command::Connect,
            ConnectCommand::Auto => {
                if accept_versions.contains(&StompVersion::V1_2) {
                    Command::Stomp
                } else {
                    Command::Connect
                }
            }
        }
    }
}

/// Builds the client's opening frame (`CONNECT` or `STOMP`).
pub fn build_connect_frame(
    accept_versions: &[StompVersion],
    host: &str,
    login: Option<&str>,
    passcode: Option<&str>,
    heart_beat: (u32, u32),
    command: ConnectCommand,
) -> Frame {
    let mut headers = HeaderList::new();
    headers.push("accept-version", render_accept_versions(accept_versions));
    headers.push("host", host);
    if let Some(login) = login {
        headers.push("login", login);
    }
    if let Some(passcode) = passcode {
        headers.push("passcode", passcode);
    }
    headers.push("heart-beat", format!("{},{}", heart_beat.0, heart_beat.1));

    Frame::new(command.resolve(accept_versions), headers, Vec::new())
}
