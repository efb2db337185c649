use thiserror::Error;

/// Transport-level failures (spec §7).
#[derive(Debug, Error)]
pub enum TransportError {
    /// A peer closed the connection, or sent a frame that could not be parsed, mid-protocol.
    /// Fatal to the owning MPC instance; the mesh is torn down.
    #[error("protocol aborted: {reason}")]
    ProtocolAbort { reason: String },

    /// The receive loop (or the whole channel) was cancelled; any further read/write calls fail.
    #[error("channel was cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio::sync::oneshot::error::RecvError> for TransportError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        TransportError::Cancelled
    }
}
