//! Per-election TLS meshes between talliers: dial lower-indexed peers, accept higher-indexed
//! peers, and rendezvous by election id before any MPC step runs (spec §4.C).

mod error;
mod manager;
mod rendezvous;
mod tls;

pub use error::CliqueError;
pub use manager::CliqueManager;
pub use tls::TlsMaterial;

pub use tallier_transport::Framing;
