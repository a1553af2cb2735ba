// ABOUTME: Unified error surface for the core, wrapping parser/session/failover error kinds
// ABOUTME: One variant per layer so callers can match on which subsystem raised the failure

use thiserror::Error;

use crate::failover::FailoverError;
use crate::parser::ParseError;
use crate::session::SessionError;

/// Top-level error type returned by every public operation in this crate.
///
/// Each variant wraps a layer-local error enum rather than flattening their
/// fields, so callers can match on which subsystem raised the failure
/// (parser vs session vs failover) without losing the original cause.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StompError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Failover(#[from] FailoverError),
}

/// Convenience alias used throughout the crate's public API.
pub type StompResult<T> = std::result::Result<T, StompError>;
