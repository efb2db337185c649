//! The per-tallier-process orchestrator (spec §4.G): wires the clique manager, the MPC core,
//! and a store-agnostic persistence layer together behind the front-door API the external
//! ballot-ingestion/websocket layer consumes (spec §1 "explicitly out of scope").

mod config;
mod error;
mod orchestrator;
mod persistence;

pub use config::{Cli, LogSettings, PersistenceSettings, Settings, TlsSettings};
pub use error::OrchestratorError;
pub use orchestrator::{MpcValidation, MpcWinner, Orchestrator};
pub use persistence::{ElectionStore, InMemoryStore, VoteState};
