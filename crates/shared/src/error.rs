use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed {kind} payload: {source}")]
    MalformedPayload {
        kind: String,
        source: serde_json::Error,
    },
    #[error("malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),
    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        source: serde_json::Error,
    },
}
