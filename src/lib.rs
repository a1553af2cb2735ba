//! A transport-agnostic STOMP 1.0/1.1/1.2 client core.
//!
//! This crate implements the pure, synchronous pieces of a STOMP client:
//! a [`Frame`] model and wire codec, a streaming [`parser::Parser`], a
//! per-version [`commands`] layer, a connection-lifecycle [`session::Session`]
//! state machine, and a [`failover`] transport URI parser with reconnect
//! back-off. None of it opens a socket, starts a timer, or spawns a
//! thread; every operation is a synchronous function from the current
//! state plus an input to a new state plus an output. Wiring a `Session`
//! to an actual socket, an actual clock, and an actual executor is the
//! embedding application's job; see `demos/` in this repository for one
//! way to do that with `tokio`.
//!
//! # Data flow
//!
//! ```text
//! bytes from the wire
//!     -> Parser::feed           (produces Frame / HeartBeat events)
//!     -> Session::receive       (validated via commands::server, produces Event<Token>)
//!
//! caller intent (subscribe, send, ack, ...)
//!     -> Session methods        (built via commands::*)
//!     -> Frame::render           (bytes to write to the wire)
//! ```
//!
//! # Example: parsing a `CONNECTED` frame and completing a handshake
//!
//! ```rust
//! use stomp_core::parser::{Parser, ParseEvent};
//! use stomp_core::session::Session;
//! use stomp_core::version::StompVersion;
//!
//! let mut session: Session<u32> = Session::new();
//! let connect_frame = session
//!     .connect(&[StompVersion::V1_1, StompVersion::V1_2], "localhost", None, None, (0, 0))
//!     .unwrap();
//! let _wire_bytes = connect_frame.render(StompVersion::V1_2);
//!
//! let mut parser = Parser::new(StompVersion::V1_2);
//! let wire = b"CONNECTED\nversion:1.2\nheart-beat:0,0\n\n\0";
//! let events = parser.feed(wire).unwrap();
//! for event in events {
//!     if let ParseEvent::Frame(frame) = event {
//!         let session_events = session.receive(frame).unwrap();
//!         assert!(matches!(session_events[0], stomp_core::session::Event::Connected { .. }));
//!     }
//! }
//! ```

pub mod commands;
pub mod error;
pub mod failover;
pub mod frame;
mod macros;
pub mod parser;
pub mod session;
pub mod version;


pub use error::{StompError, StompResult};
pub use frame::{Command, Frame, HeaderList};
pub use parser::{CrPolicy, ParseError, ParseEvent, Parser, ParserConfig};
pub use session::{Event, Phase, Session, SessionError};
pub use version::StompVersion;
