//! The framed, ordered, msgid-demultiplexed channel to one peer tallier (spec §4.B), plus its
//! loopback variant.
//!
//! This crate is deliberately TLS-agnostic: it operates on anything implementing
//! `AsyncRead`/`AsyncWrite`, so the clique manager (`tallier-clique`) can hand it a
//! `tokio_rustls` stream in production and tests can hand it a `tokio::io::duplex` pair.

mod channel;
mod demux;
mod error;
pub mod frame;

pub use channel::{channel_from_halves, Channel, Framing, LoopbackChannel, NetChannel};
pub use error::TransportError;
