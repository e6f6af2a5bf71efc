use shared::error::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("collaboration channel is closed")]
    Closed,
    #[error(transparent)]
    Encode(#[from] ProtocolError),
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("a handler for message type {0} is already registered")]
    DuplicateHandler(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no tokio runtime to run session timers on")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
    #[error(transparent)]
    Router(#[from] RouterError),
}
