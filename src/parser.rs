// ABOUTME: Streaming STOMP frame parser: byte-fed incremental state machine
// ABOUTME: Poisons itself on any error, requiring an explicit reset before further feeding

use std::collections::HashSet;

use thiserror::Error;

use crate::frame::{Command, Frame, HeaderList};
use crate::version::StompVersion;

/// Whether a literal, unescaped carriage return found mid-line is tolerated.
///
/// Strict rejects any stray CR found outside of an escape sequence;
/// tolerant accepts it as ordinary line content. Default is strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrPolicy {
    Strict,
    Tolerant,
}

/// Configurable parser limits: exceeding any of these poisons the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub max_frame_bytes: usize,
    pub max_headers: usize,
    pub max_header_line_bytes: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_frame_bytes: 16 * 1024 * 1024,
            max_headers: 1_000,
            max_header_line_bytes: 64 * 1024,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command token {0:?}")]
    UnknownCommand(String),
    #[error("malformed header line {0:?}")]
    MalformedHeader(String),
    #[error("invalid escape sequence {0:?}")]
    BadEscape(String),
    #[error("stray carriage return outside a line terminator")]
    StrayCarriageReturn,
    #[error("body was not followed by a NUL terminator")]
    MissingNulTerminator,
    #[error("frame exceeded the maximum size of {limit} bytes")]
    FrameTooLarge { limit: usize },
    #[error("frame exceeded the maximum header count of {limit}")]
    TooManyHeaders { limit: usize },
    #[error("header line exceeded the maximum length of {limit} bytes")]
    HeaderLineTooLong { limit: usize },
    #[error("content-length value {0:?} is not a valid non-negative integer")]
    InvalidContentLength(String),
    #[error("parser is poisoned after a previous error and must be reset")]
    ParserPoisoned,
}

/// An item the parser emits for each completed construct in the byte stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    Frame(Frame),
    HeartBeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    PreCommand,
    Command,
    Headers,
    BodyLengthDelimited(usize),
    BodyNulDelimited,
}

/// Incremental STOMP parser. Feed it arbitrary byte chunks; it returns the
/// frames and heart-beat markers completed by each chunk, in byte order.
///
/// Any parse error poisons the parser: every subsequent `feed` call returns
/// `ParseError::ParserPoisoned` until `reset` is called explicitly.
#[derive(Debug)]
pub struct Parser {
    version: StompVersion,
    config: ParserConfig,
    cr_policy: CrPolicy,
    state: State,
    poisoned: bool,
    line_buf: Vec<u8>,
    pending_cr_heartbeat: bool,
    command: Option<Command>,
    headers: HeaderList,
    seen_header_names: HashSet<String>,
    content_length: Option<usize>,
    body: Vec<u8>,
    frame_bytes_consumed: usize,
}

impl Parser {
    pub fn new(version: StompVersion) -> Self {
        Self::with_config(version, ParserConfig::default(), CrPolicy::Strict)
    }

    pub fn with_config(version: StompVersion, config: ParserConfig, cr_policy: CrPolicy) -> Self {
        Parser {
            version,
            config,
            cr_policy,
            state: State::PreCommand,
            poisoned: false,
            line_buf: Vec::new(),
            pending_cr_heartbeat: false,
            command: None,
            headers: HeaderList::new(),
            seen_header_names: HashSet::new(),
            content_length: None,
            body: Vec::new(),
            frame_bytes_consumed: 0,
        }
    }

    /// Updates the version the parser unescapes and frames against. Called
    /// by the Session once negotiation completes.
    pub fn set_version(&mut self, version: StompVersion) {
        self.version = version;
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Clears the poisoned state and resets to a fresh `PRE_COMMAND` state.
    /// Any partially-accumulated frame is discarded.
    pub fn reset(&mut self) {
        self.poisoned = false;
        self.state = State::PreCommand;
        self.line_buf.clear();
        self.pending_cr_heartbeat = false;
        self.command = None;
        self.headers = HeaderList::new();
        self.seen_header_names.clear();
        self.content_length = None;
        self.body.clear();
        self.frame_bytes_consumed = 0;
    }

    /// Feeds a chunk of bytes, returning every frame and heart-beat marker
    /// completed as a result, in the order they occur in `chunk`. Chunk
    /// boundaries never affect the resulting event sequence.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<ParseEvent>, ParseError> {
        if self.poisoned {
            return Err(ParseError::ParserPoisoned);
        }
        let mut events = Vec::new();
        for &byte in chunk {
            if let Err(err) = self.process_byte(byte, &mut events) {
                self.poisoned = true;
                return Err(err);
            }
        }
        Ok(events)
    }

    fn process_byte(&mut self, byte: u8, events: &mut Vec<ParseEvent>) -> Result<(), ParseError> {
        if !matches!(self.state, State::PreCommand) {
            self.frame_bytes_consumed += 1;
            if self.frame_bytes_consumed > self.config.max_frame_bytes {
                return Err(ParseError::FrameTooLarge { limit: self.config.max_frame_bytes });
            }
        }
        match self.state {
            State::PreCommand => self.process_pre_command(byte, events),
            State::Command => self.process_command_byte(byte),
            State::Headers => self.process_header_byte(byte),
            State::BodyLengthDelimited(remaining) => self.process_body_length_delimited(byte, remaining, events),
            State::BodyNulDelimited => self.process_body_nul_delimited(byte, events),
        }
    }

    fn process_pre_command(&mut self, byte: u8, events: &mut Vec<ParseEvent>) -> Result<(), ParseError> {
        match byte {
            b'\r' => {
                self.pending_cr_heartbeat = true;
                Ok(())
            }
            b'\n' => {
                self.pending_cr_heartbeat = false;
                if self.version.supports_heartbeats() {
                    events.push(ParseEvent::HeartBeat);
                }
                self.frame_bytes_consumed = 0;
                Ok(())
            }
            other => {
                if self.pending_cr_heartbeat {
                    self.pending_cr_heartbeat = false;
                    if self.cr_policy == CrPolicy::Strict {
                        return Err(ParseError::StrayCarriageReturn);
                    }
                }
                self.state = State::Command;
                self.line_buf.clear();
                self.frame_bytes_consumed = 1;
                self.process_command_byte(other)
            }
        }
    }

    fn process_command_byte(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte == b'\n' {
            let line = self.take_line()?;
            let token = String::from_utf8(line).map_err(|_| ParseError::MalformedHeader("command not utf-8".into()))?;
            let command = Command::from_token(&token).ok_or(ParseError::UnknownCommand(token))?;
            self.command = Some(command);
            self.state = State::Headers;
            Ok(())
        } else {
            self.push_line_byte(byte)
        }
    }

    fn process_header_byte(&mut self, byte: u8) -> Result<(), ParseError> {
        if byte == b'\n' {
            let line = self.take_line()?;
            if line.is_empty() {
                return self.begin_body();
            }
            let text = String::from_utf8(line).map_err(|_| ParseError::MalformedHeader("header not utf-8".into()))?;
            let (name_raw, value_raw) = text
                .split_once(':')
                .ok_or_else(|| ParseError::MalformedHeader(text.clone()))?;
            let name = unescape(name_raw, self.version)?;
            let value = unescape(value_raw, self.version)?;
            if self.seen_header_names.contains(&name) {
                tracing::debug!(header = %name, "discarding duplicate header, first occurrence wins");
            } else {
                if self.headers.len() >= self.config.max_headers {
                    return Err(ParseError::TooManyHeaders { limit: self.config.max_headers });
                }
                self.seen_header_names.insert(name.clone());
                self.headers.push(name, value);
            }
            Ok(())
        } else {
            self.push_line_byte(byte)
        }
    }

    fn push_line_byte(&mut self, byte: u8) -> Result<(), ParseError> {
        if self.line_buf.len() >= self.config.max_header_line_bytes {
            return Err(ParseError::HeaderLineTooLong { limit: self.config.max_header_line_bytes });
        }
        self.line_buf.push(byte);
        Ok(())
    }

    /// Drains `line_buf`, stripping a single trailing CR (the tolerated line
    /// terminator) and rejecting any other stray CR per `cr_policy`.
    fn take_line(&mut self) -> Result<Vec<u8>, ParseError> {
        let mut line = std::mem::take(&mut self.line_buf);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.contains(&b'\r') && self.cr_policy == CrPolicy::Strict {
            return Err(ParseError::StrayCarriageReturn);
        }
        Ok(line)
    }

    fn begin_body(&mut self) -> Result<(), ParseError> {
        match self.headers.get("content-length") {
            Some(raw) => {
                let len: usize = raw
                    .parse()
                    .map_err(|_| ParseError::InvalidContentLength(raw.to_string()))?;
                self.content_length = Some(len);
                self.body = Vec::with_capacity(len.min(self.config.max_frame_bytes));
                self.state = State::BodyLengthDelimited(len);
                Ok(())
            }
            None => {
                self.content_length = None;
                self.body.clear();
                self.state = State::BodyNulDelimited;
                Ok(())
            }
        }
    }

    fn process_body_length_delimited(
        &mut self,
        byte: u8,
        remaining: usize,
        events: &mut Vec<ParseEvent>,
    ) -> Result<(), ParseError> {
        if remaining > 0 {
            self.body.push(byte);
            self.state = State::BodyLengthDelimited(remaining - 1);
            Ok(())
        } else if byte == 0 {
            self.finish_frame(events)
        } else {
            Err(ParseError::MissingNulTerminator)
        }
    }

    fn process_body_nul_delimited(&mut self, byte: u8, events: &mut Vec<ParseEvent>) -> Result<(), ParseError> {
        if byte == 0 {
            self.finish_frame(events)
        } else {
            self.body.push(byte);
            Ok(())
        }
    }

    fn finish_frame(&mut self, events: &mut Vec<ParseEvent>) -> Result<(), ParseError> {
        let command = self.command.take().expect("command set before entering a body state");
        let headers = std::mem::take(&mut self.headers);
        let body = std::mem::take(&mut self.body);
        tracing::trace!(%command, headers = headers.len(), body_len = body.len(), "parsed frame");
        events.push(ParseEvent::Frame(Frame::new(command, headers, body)));
        self.seen_header_names.clear();
        self.content_length = None;
        self.frame_bytes_consumed = 0;
        self.state = State::PreCommand;
        self.pending_cr_heartbeat = false;
        Ok(())
    }
}

/// Unescapes a header name or value per the rules of the active version.
fn unescape(raw: &str, version: StompVersion) -> Result<String, ParseError> {
    if version == StompVersion::V1_0 {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('c') => out.push(':'),
            Some('\\') => out.push('\\'),
            Some('r') if version == StompVersion::V1_2 => out.push('\r'),
            Some(other) => return Err(ParseError::BadEscape(format!("\\{other}"))),
            None => return Err(ParseError::BadEscape("\\".to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(version: StompVersion, bytes: &[u8]) -> Vec<ParseEvent> {
        let mut parser = Parser::new(version);
        parser.feed(bytes).unwrap()
    }

    #[test]
    fn parses_connected_frame_with_heart_beat_header() {
        let input = b"CONNECTED\nversion:1.2\nheart-beat:10,20\n\n\x00";
        let events = parse_all(StompVersion::V1_2, input);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ParseEvent::Frame(frame) => {
                assert_eq!(frame.command, Command::Connected);
                assert_eq!(frame.headers.get("version"), Some("1.2"));
                assert_eq!(frame.headers.get("heart-beat"), Some("10,20"));
                assert!(frame.body.is_empty());
            }
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn chunk_boundaries_do_not_affect_emitted_frames() {
        let input = b"SEND\ndestination:/queue/a\ncontent-length:5\n\nhello\x00MESSAGE\nsubscription:0\nmessage-id:m1\ndestination:/queue/a\n\nworld\x00";
        let whole = parse_all(StompVersion::V1_2, input);

        for split in 1..input.len() {
            let (a, b) = input.split_at(split);
            let mut parser = Parser::new(StompVersion::V1_2);
            let mut events = parser.feed(a).unwrap();
            events.extend(parser.feed(b).unwrap());
            assert_eq!(events, whole, "mismatch when splitting at byte {split}");
        }
    }

    #[test]
    fn duplicate_header_first_wins() {
        let input = b"SEND\nfoo:first\nfoo:second\ndestination:/q\n\n\x00";
        let events = parse_all(StompVersion::V1_1, input);
        match &events[0] {
            ParseEvent::Frame(frame) => assert_eq!(frame.headers.get("foo"), Some("first")),
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn empty_body_with_and_without_content_length_both_parse_empty() {
        let with_len = parse_all(StompVersion::V1_2, b"SEND\ndestination:/q\ncontent-length:0\n\n\x00");
        let without_len = parse_all(StompVersion::V1_2, b"SEND\ndestination:/q\n\n\x00");
        let body = |events: &[ParseEvent]| match &events[0] {
            ParseEvent::Frame(f) => f.body.clone(),
            _ => panic!("expected frame"),
        };
        assert!(body(&with_len).is_empty());
        assert!(body(&without_len).is_empty());
    }

    #[test]
    fn missing_nul_after_length_delimited_body_is_a_parse_error() {
        let mut parser = Parser::new(StompVersion::V1_2);
        let err = parser.feed(b"MESSAGE\ncontent-length:2\n\nabX").unwrap_err();
        assert_eq!(err, ParseError::MissingNulTerminator);
        assert!(parser.is_poisoned());
    }

    #[test]
    fn nul_terminator_present_for_length_delimited_body_is_fine() {
        let events = parse_all(StompVersion::V1_2, b"MESSAGE\ncontent-length:3\n\nab\x00\x00");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn poisoned_parser_rejects_further_feeds_until_reset() {
        let mut parser = Parser::new(StompVersion::V1_0);
        assert!(parser.feed(b"BOGUS\n\n\x00").is_err());
        assert_eq!(parser.feed(b"CONNECT\n\n\x00"), Err(ParseError::ParserPoisoned));
        parser.reset();
        assert!(parser.feed(b"CONNECT\n\n\x00").is_ok());
    }

    #[test]
    fn heart_beat_markers_preserve_position_between_frames() {
        let input = b"\nCONNECT\naccept-version:1.2\n\n\x00\nSEND\ndestination:/q\n\n\x00";
        let events = parse_all(StompVersion::V1_2, input);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], ParseEvent::HeartBeat);
        assert!(matches!(events[1], ParseEvent::Frame(_)));
        assert_eq!(events[2], ParseEvent::HeartBeat);
        assert!(matches!(events[3], ParseEvent::Frame(_)));
    }

    #[test]
    fn v1_0_never_emits_heart_beats() {
        let events = parse_all(StompVersion::V1_0, b"\nCONNECT\n\n\x00");
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ParseEvent::Frame(_)));
    }

    #[test]
    fn stray_cr_is_rejected_under_strict_policy() {
        let mut parser = Parser::new(StompVersion::V1_1);
        let err = parser.feed(b"SEND\nfoo:a\rb\n\n\x00").unwrap_err();
        assert_eq!(err, ParseError::StrayCarriageReturn);
    }

    #[test]
    fn stray_cr_is_accepted_under_tolerant_policy() {
        let mut parser = Parser::with_config(StompVersion::V1_1, ParserConfig::default(), CrPolicy::Tolerant);
        let events = parser.feed(b"SEND\nfoo:a\rb\ndestination:/q\n\n\x00").unwrap();
        match &events[0] {
            ParseEvent::Frame(frame) => assert_eq!(frame.headers.get("foo"), Some("a\rb")),
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn unknown_command_is_a_parse_error() {
        let mut parser = Parser::new(StompVersion::V1_2);
        assert!(matches!(parser.feed(b"BOGUS\n\n\x00"), Err(ParseError::UnknownCommand(_))));
    }

    #[test]
    fn v1_1_unescapes_colon_newline_backslash_but_not_carriage_return() {
        let events = parse_all(StompVersion::V1_1, b"SEND\nfoo:a\\cb\\\\c\\nd\n\n\x00");
        match &events[0] {
            ParseEvent::Frame(frame) => assert_eq!(frame.headers.get("foo"), Some("a:b\\c\nd")),
            other => panic!("expected a frame, got {other:?}"),
        }
        let mut parser = Parser::new(StompVersion::V1_1);
        assert!(matches!(parser.feed(b"SEND\nfoo:a\\rb\n\n\x00"), Err(ParseError::BadEscape(_))));
    }

    #[test]
    fn v1_2_unescapes_carriage_return_too() {
        let events = parse_all(StompVersion::V1_2, b"SEND\nfoo:a\\rb\n\n\x00");
        match &events[0] {
            ParseEvent::Frame(frame) => assert_eq!(frame.headers.get("foo"), Some("a\rb")),
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let config = ParserConfig { max_frame_bytes: 16, ..ParserConfig::default() };
        let mut parser = Parser::with_config(StompVersion::V1_2, config, CrPolicy::Strict);
        let err = parser.feed(b"SEND\ndestination:/a/very/long/path\n\n\x00").unwrap_err();
        assert!(matches!(err, ParseError::FrameTooLarge { .. }));
    }
}
