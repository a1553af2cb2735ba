//! `failover:(uri1,uri2,...)?k=v&...` transport URI parsing and the
//! reconnect endpoint/delay sequence it configures.

pub mod backoff;
pub mod error;
pub mod uri;

pub use backoff::BackoffSequence;
pub use error::FailoverError;
pub use uri::{parse, Endpoint, FailoverOptions, FailoverUri, Scheme};
