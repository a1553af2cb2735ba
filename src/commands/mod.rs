//! Stateless, per-version constructors and validators for every client- and
//! server-originated STOMP frame. Nothing in this module holds state or
//! performs I/O; the session is the only place frame construction is tied
//! to a live connection.

pub mod ack;
pub mod connect;
pub mod disconnect;
pub mod send;
pub mod server;
pub mod subscribe;
pub mod transaction;

pub use ack::{build_ack_frame, build_nack_frame, AckHandle};
pub use connect::{build_connect_frame, ConnectCommand};
pub use disconnect::build_disconnect_frame;
pub use send::build_send_frame;
pub use server::{parse_connected, parse_message, parse_receipt_id, ConnectedInfo, MessageInfo};
pub use subscribe::{build_subscribe_frame, build_unsubscribe_frame, AckMode};
pub use transaction::{build_abort_frame, build_begin_frame, build_commit_frame};
