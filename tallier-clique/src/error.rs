use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CliqueError {
    /// Duplicate conn_id for an active mesh, or a mismatched election_id, on a connection's
    /// handshake; closes the offending connection, does not affect the mesh (spec §7).
    #[error("handshake rejected for election {election_id}: {reason}")]
    HandshakeReject { election_id: Uuid, reason: String },

    #[error("tls error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(#[from] tallier_transport::TransportError),

    #[error("mesh formation for election {election_id} did not complete before the caller gave up")]
    MeshTimedOut { election_id: Uuid },

    #[error("invalid tls certificate material: {0}")]
    InvalidCertificate(String),
}
