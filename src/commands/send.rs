use crate::frame::{Command, Frame, HeaderList};

/// Builds a `SEND` frame. `content-length` insertion is left to
/// `Frame::render`; this constructor only establishes the required
/// `destination` header plus whatever extra headers the caller supplied
/// (e.g. `content-type`, `transaction`, `receipt`).
pub fn build_send_frame(destination: &str, extra_headers: HeaderList, body: Vec<u8>) -> Frame {
    let mut headers = HeaderList::new();
    headers.push("destination", destination);
    for (name, value) in extra_headers.iter() {
        if name == "destination" {
            continue;
        }
        headers.push(name, value);
    }
    Frame::new(Command::Send, headers, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_send_with_destination_and_extra_headers() {
        let extra = HeaderList::new().with("content-type", "text/plain").with("receipt", "r1");
        let frame = build_send_frame("/queue/a", extra, b"hello".to_vec());
        assert_eq!(frame.command, Command::Send);
        assert_eq!(frame.headers.get("destination"), Some("/queue/a"));
        assert_eq!(frame.headers.get("content-type"), Some("text/plain"));
        assert_eq!(frame.headers.get("receipt"), Some("r1"));
        assert_eq!(frame.body, b"hello");
    }
}
