use crate::frame::Command;
use crate::macros::impl_single_header_frame;

impl_single_header_frame!(build_begin_frame, Command::Begin, "transaction");
impl_single_header_frame!(build_commit_frame, Command::Commit, "transaction");
impl_single_header_frame!(build_abort_frame, Command::Abort, "transaction");
