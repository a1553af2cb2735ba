// ABOUTME: Immutable STOMP frame value plus per-version header escaping and wire rendering
// ABOUTME: Command tokens, header order and body bytes are all preserved exactly as constructed

use bytes::{BufMut, BytesMut};
use std::fmt;

use crate::version::StompVersion;

/// The closed set of STOMP command tokens, client- and server-originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Connect,
    Stomp,
    Send,
    Subscribe,
    Unsubscribe,
    Begin,
    Commit,
    Abort,
    Ack,
    Nack,
    Disconnect,
    Connected,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Connect => "CONNECT",
            Command::Stomp => "STOMP",
            Command::Send => "SEND",
            Command::Subscribe => "SUBSCRIBE",
            Command::Unsubscribe => "UNSUBSCRIBE",
            Command::Begin => "BEGIN",
            Command::Commit => "COMMIT",
            Command::Abort => "ABORT",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Disconnect => "DISCONNECT",
            Command::Connected => "CONNECTED",
            Command::Message => "MESSAGE",
            Command::Receipt => "RECEIPT",
            Command::Error => "ERROR",
        }
    }

    pub fn from_token(token: &str) -> Option<Command> {
        Some(match token {
            "CONNECT" => Command::Connect,
            "STOMP" => Command::Stomp,
            "SEND" => Command::Send,
            "SUBSCRIBE" => Command::Subscribe,
            "UNSUBSCRIBE" => Command::Unsubscribe,
            "BEGIN" => Command::Begin,
            "COMMIT" => Command::Commit,
            "ABORT" => Command::Abort,
            "ACK" => Command::Ack,
            "NACK" => Command::Nack,
            "DISCONNECT" => Command::Disconnect,
            "CONNECTED" => Command::Connected,
            "MESSAGE" => Command::Message,
            "RECEIPT" => Command::Receipt,
            "ERROR" => Command::Error,
            _ => return None,
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered sequence of `(name, value)` header pairs.
///
/// Order is preserved exactly as pushed; lookups honor first-wins semantics
/// explicitly rather than by deduplicating on insert, since versions < 1.1
/// never apply that rule and the parser is the only place duplicates are
/// actually discarded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    pub fn new() -> Self {
        HeaderList(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// First occurrence of `name`, matching the first-wins rule used from v1.1 on.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for HeaderList {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        HeaderList(iter.into_iter().collect())
    }
}

/// A single, immutable STOMP frame: command, ordered headers, body bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: HeaderList,
    pub body: Vec<u8>,
}

impl Frame {
    pub fn new(command: Command, headers: HeaderList, body: Vec<u8>) -> Self {
        Frame { command, headers, body }
    }

    /// Renders this frame to wire bytes for the given version, applying
    /// per-version header escaping and inserting `content-length` for
    /// non-empty bodies that don't already carry one.
    pub fn render(&self, version: StompVersion) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(64 + self.body.len());

        buf.put_slice(self.command.as_str().as_bytes());
        buf.put_u8(b'\n');

        let needs_content_length = !self.body.is_empty() && !self.headers.contains("content-length");

        for (name, value) in self.headers.iter() {
            buf.put_slice(escape(name, version).as_bytes());
            buf.put_u8(b':');
            buf.put_slice(escape(value, version).as_bytes());
            buf.put_u8(b'\n');
        }
        if needs_content_length {
            buf.put_slice(b"content-length:");
            buf.put_slice(self.body.len().to_string().as_bytes());
            buf.put_u8(b'\n');
        }

        buf.put_u8(b'\n');
        buf.put_slice(&self.body);
        buf.put_u8(0);

        buf.freeze().to_vec()
    }
}

/// Escapes a header name or value per the rules of the active version.
///
/// v1.0 performs no escaping at all; v1.1 escapes `\n`, `:`, `\\`; v1.2
/// additionally escapes `\r`. `content-length`'s value is never escaped by
/// callers of this function (it is written verbatim in `Frame::render`).
pub fn escape(raw: &str, version: StompVersion) -> String {
    if version == StompVersion::V1_0 {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            ':' => out.push_str("\\c"),
            '\r' if version == StompVersion::V1_2 => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_simple_frame_with_inserted_content_length() {
        let headers = HeaderList::new().with("destination", "/queue/a");
        let frame = Frame::new(Command::Send, headers, b"hello".to_vec());
        let bytes = frame.render(StompVersion::V1_2);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("SEND\ndestination:/queue/a\ncontent-length:5\n\nhello\u{0}"));
    }

    #[test]
    fn empty_body_has_no_content_length_inserted() {
        let frame = Frame::new(Command::Disconnect, HeaderList::new(), Vec::new());
        let bytes = frame.render(StompVersion::V1_2);
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "DISCONNECT\n\n\u{0}");
    }

    #[test]
    fn v1_0_does_not_escape_colons() {
        let headers = HeaderList::new().with("foo", "a:b");
        let frame = Frame::new(Command::Send, headers, Vec::new());
        let text = String::from_utf8(frame.render(StompVersion::V1_0)).unwrap();
        assert!(text.contains("foo:a:b\n"));
    }

    #[test]
    fn v1_1_escapes_colon_newline_and_backslash() {
        let headers = HeaderList::new().with("foo", "a:b\\c\nd");
        let frame = Frame::new(Command::Send, headers, Vec::new());
        let text = String::from_utf8(frame.render(StompVersion::V1_1)).unwrap();
        assert!(text.contains("foo:a\\cb\\\\c\\nd\n"));
    }

    #[test]
    fn v1_2_additionally_escapes_carriage_return() {
        let headers = HeaderList::new().with("foo", "a\rb");
        let frame = Frame::new(Command::Send, headers, Vec::new());
        let text = String::from_utf8(frame.render(StompVersion::V1_2)).unwrap();
        assert!(text.contains("foo:a\\rb\n"));

        let text_v11 = String::from_utf8(frame.render(StompVersion::V1_1)).unwrap();
        assert!(text_v11.contains("foo:a\rb\n"));
    }

    #[test]
    fn header_list_first_wins_on_lookup() {
        let mut headers = HeaderList::new();
        headers.push("id", "1");
        headers.push("id", "2");
        assert_eq!(headers.get("id"), Some("1"));
    }

    #[test]
    fn command_round_trips_through_token() {
        for command in [
            Command::Connect,
            Command::Stomp,
            Command::Send,
            Command::Subscribe,
            Command::Unsubscribe,
            Command::Begin,
            Command::Commit,
            Command::Abort,
            Command::Ack,
            Command::Nack,
            Command::Disconnect,
            Command::Connected,
            Command::Message,
            Command::Receipt,
            Command::Error,
        ] {
            assert_eq!(Command::from_token(command.as_str()), Some(command));
        }
        assert_eq!(Command::from_token("BOGUS"), None);
    }
}
