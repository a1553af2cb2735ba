//! Declarative macros that build the single-header, empty-body client frames
//! (BEGIN/COMMIT/ABORT/UNSUBSCRIBE all have exactly this shape: one
//! identifying header, nothing else, no body).

/// Generates a `pub fn $fn_name(value: &str) -> Frame` that writes `$header`
/// as the frame's only header.
///
/// ```ignore
/// impl_single_header_frame!(build_begin_frame, Command::Begin, "transaction");
/// ```
macro_rules! impl_single_header_frame {
    ($fn_name:ident, $command:expr, $header:expr) => {
        pub fn $fn_name(value: &str) -> $crate::frame::Frame {
            let headers = $crate::frame::HeaderList::new().with($header, value);
            $crate::frame::Frame::new($command, headers, Vec::new())
        }
    };
}

pub(crate) use impl_single_header_frame;
