use crate::frame::{Command, Frame, HeaderList};

/// Builds a `DISCONNECT` frame. A `receipt` header is the caller's way of
/// asking the broker to confirm the disconnect before closing the socket;
/// the session only transitions to `Disconnecting` (and awaits that
/// `RECEIPT`) when one is supplied.
pub fn build_disconnect_frame(receipt: Option<&str>) -> Frame {
    let mut headers = HeaderList::new();
    if let Some(receipt) = receipt {
        headers.push("receipt", receipt);
    }
    Frame::new(Command::Disconnect, headers, Vec::new())
}
