use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailoverError {
    #[error("failover URI is malformed: {0:?}")]
    InvalidUri(String),

    #[error("failover sequence exhausted its reconnect attempt cap")]
    FailoverExhausted,
}
