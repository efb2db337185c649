//! The `Channel` abstraction: a framed, ordered bidirectional stream to one peer tallier, plus
//! the loopback variant used for "my own" slot in the clique (spec §4.B).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::demux::Demux;
use crate::frame::{read_frame, write_frame};
use crate::TransportError;

/// The framing a channel was constructed with, fixed for its whole lifetime (spec §4.B).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    Scalar,
    Vector(usize),
}

impl Framing {
    pub fn width(self) -> usize {
        match self {
            Framing::Scalar => 1,
            Framing::Vector(s) => s,
        }
    }
}

/// A channel to exactly one peer (or, for [`LoopbackChannel`], to oneself). `write`/`read` are
/// msgid-keyed; see [`Demux`] for the matching semantics.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn write(&self, msgid: u32, values: &[u32]) -> Result<(), TransportError>;
    async fn read(&self, msgid: u32) -> Result<Vec<u32>, TransportError>;
    fn framing(&self) -> Framing;
}

/// A channel backed by a real (TLS) stream: a writer guarded by an uncontended async mutex (one
/// write in flight at a time, matching the single `receive_loop` reading the other half) and a
/// background task draining frames into a [`Demux`].
pub struct NetChannel<W> {
    framing: Framing,
    writer: AsyncMutex<W>,
    demux: Arc<Demux>,
    receive_task: JoinHandle<()>,
}

impl<W> Drop for NetChannel<W> {
    fn drop(&mut self) {
        self.receive_task.abort();
        self.demux.drain();
    }
}

#[async_trait]
impl<W> Channel for NetChannel<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn write(&self, msgid: u32, values: &[u32]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, msgid, values, self.framing.width()).await
    }

    async fn read(&self, msgid: u32) -> Result<Vec<u32>, TransportError> {
        self.demux.read(msgid).await
    }

    fn framing(&self) -> Framing {
        self.framing
    }
}

fn spawn_net_channel<R, W>(
    mut reader: R,
    writer: W,
    framing: Framing,
    peer: u8,
) -> Arc<NetChannel<W>>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let demux = Arc::new(Demux::new());
    let loop_demux = demux.clone();
    let width = framing.width();

    let receive_task = tokio::spawn(async move {
        loop {
            match read_frame(&mut reader, width).await {
                Ok((msgid, values)) => loop_demux.deliver(msgid, values),
                Err(TransportError::ProtocolAbort { reason }) => {
                    debug!(peer, reason, "peer channel closed, receive loop exiting");
                    break;
                }
                Err(e) => {
                    warn!(peer, error = %e, "receive loop aborting on io error");
                    break;
                }
            }
        }
        loop_demux.drain();
    });

    Arc::new(NetChannel {
        framing,
        writer: AsyncMutex::new(writer),
        demux,
        receive_task,
    })
}

/// Construct a `NetChannel` directly from separately-typed reader/writer halves (the common
/// case: a `tokio_rustls` `TlsStream` split in two, or a `tokio::io::duplex` pair in tests).
pub fn channel_from_halves<R, W>(reader: R, writer: W, framing: Framing, peer: u8) -> Arc<NetChannel<W>>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    spawn_net_channel(reader, writer, framing, peer)
}

/// The loopback variant standing in for "my own" slot in the clique: `write` appends directly
/// to its own queue, bypassing serialization entirely, so MPC routines can treat "own share"
/// uniformly with "peer share" (spec §4.B).
pub struct LoopbackChannel {
    framing: Framing,
    demux: Demux,
}

impl LoopbackChannel {
    pub fn new(framing: Framing) -> Self {
        LoopbackChannel {
            framing,
            demux: Demux::new(),
        }
    }
}

#[async_trait]
impl Channel for LoopbackChannel {
    async fn write(&self, msgid: u32, values: &[u32]) -> Result<(), TransportError> {
        let width = self.framing.width();
        let mut padded = values.to_vec();
        padded.resize(width, 0);
        padded.truncate(width);
        self.demux.deliver(msgid, padded);
        Ok(())
    }

    async fn read(&self, msgid: u32) -> Result<Vec<u32>, TransportError> {
        self.demux.read(msgid).await
    }

    fn framing(&self) -> Framing {
        self.framing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loopback_round_trips() {
        let chan = LoopbackChannel::new(Framing::Scalar);
        chan.write(4, &[11]).await.unwrap();
        assert_eq!(chan.read(4).await.unwrap(), vec![11]);
    }

    #[tokio::test]
    async fn loopback_pads_vector_writes() {
        let chan = LoopbackChannel::new(Framing::Vector(3));
        chan.write(1, &[7]).await.unwrap();
        assert_eq!(chan.read(1).await.unwrap(), vec![7, 0, 0]);
    }

    #[tokio::test]
    async fn net_channel_over_duplex_delivers_frames() {
        let (local, remote) = tokio::io::duplex(256);
        let (remote_r, remote_w) = tokio::io::split(remote);
        let (local_r, local_w) = tokio::io::split(local);

        let a = channel_from_halves(local_r, local_w, Framing::Scalar, 1);
        let b = channel_from_halves(remote_r, remote_w, Framing::Scalar, 0);

        a.write(9, &[123]).await.unwrap();
        assert_eq!(b.read(9).await.unwrap(), vec![123]);
    }
}
