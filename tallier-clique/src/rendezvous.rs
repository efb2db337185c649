//! The TLS-agnostic half of mesh formation: the `mesh`/`pending` rendezvous state machine and
//! the wire handshake framing (spec §4.C, tested per §13 without a real TLS layer).

use std::collections::HashMap;
use std::sync::Arc;

use tallier_transport::frame::{read_handshake, write_handshake};
use tallier_transport::{channel_from_halves, Channel, Framing};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::CliqueError;

struct MeshDescriptor {
    framing: Framing,
    slots: Vec<Option<Arc<dyn Channel>>>,
    missing: usize,
    ready: Arc<Notify>,
}

/// Owns the `mesh`/`pending` maps (spec §4.C "Rendezvous state") and the handshake logic that
/// populates them. Entirely independent of the transport's TLS-ness, which is why it is its own
/// type: `CliqueManager` drives a real `tokio_rustls` stream through it in production, and tests
/// drive a `tokio::io::duplex` pair through the same methods.
pub(crate) struct Rendezvous {
    pub(crate) self_id: u8,
    mesh: Mutex<HashMap<Uuid, MeshDescriptor>>,
    pending: Mutex<HashMap<Uuid, Arc<Notify>>>,
}

impl Rendezvous {
    pub(crate) fn new(self_id: u8) -> Rendezvous {
        Rendezvous {
            self_id,
            mesh: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate an empty descriptor with `d - 1` missing peers, and wake any accept-side tasks
    /// already parked on this election (spec §4.C steps 1-2).
    pub(crate) async fn begin_mesh(&self, election_id: Uuid, d: usize, framing: Framing) {
        let mut mesh = self.mesh.lock().await;
        mesh.insert(
            election_id,
            MeshDescriptor {
                framing,
                slots: vec![None; d],
                missing: d - 1,
                ready: Arc::new(Notify::new()),
            },
        );
        drop(mesh);

        if let Some(notify) = self.pending.lock().await.remove(&election_id) {
            notify.notify_waiters();
        }
    }

    /// Block until `election_id`'s mesh is complete, then remove and return its slots.
    pub(crate) async fn await_complete(
        &self,
        election_id: Uuid,
    ) -> Vec<Option<Arc<dyn Channel>>> {
        loop {
            let mesh = self.mesh.lock().await;
            let ready = match mesh.get(&election_id) {
                Some(descriptor) if descriptor.missing == 0 => {
                    let slots = descriptor.slots.clone();
                    drop(mesh);
                    self.mesh.lock().await.remove(&election_id);
                    return slots;
                }
                Some(descriptor) => descriptor.ready.clone(),
                None => return Vec::new(),
            };

            // Register as a waiter on `ready` while still holding `mesh`, so a `notify_waiters`
            // from `install_slot` can never land in the gap between releasing the lock and
            // starting to wait (`Notify::notify_waiters` wakes only already-registered waiters,
            // it stores no permit).
            let notified = ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            drop(mesh);
            notified.await;
        }
    }

    /// Stash a newly-established channel in its slot, dropping a late duplicate connection for
    /// an already-filled slot (spec §4.C "Tie-break on duplicate connection").
    pub(crate) async fn install_slot(&self, election_id: Uuid, peer: u8, channel: Arc<dyn Channel>) {
        let mut mesh = self.mesh.lock().await;
        let Some(descriptor) = mesh.get_mut(&election_id) else {
            debug!(peer, %election_id, "channel established for a mesh that no longer exists");
            return;
        };

        let slot = peer as usize;
        if slot >= descriptor.slots.len() {
            warn!(peer, %election_id, "handshake named a slot outside this election's clique size");
            return;
        }

        if descriptor.slots[slot].is_some() {
            debug!(peer, %election_id, "dropping late duplicate connection for an occupied slot");
            return;
        }

        descriptor.slots[slot] = Some(channel);
        descriptor.missing = descriptor.missing.saturating_sub(1);
        if descriptor.missing == 0 {
            descriptor.ready.notify_waiters();
        }
    }

    /// The initiator side of the handshake (spec §4.C): send `[self_id][election_id]`, read the
    /// acceptor's mirrored frame, and wrap the stream into a `Channel`. Stream-generic so it can
    /// run over a real TLS stream in production or a plain stream in tests (spec §13).
    pub(crate) async fn dial_handshake<S>(
        &self,
        mut stream: S,
        election_id: Uuid,
        framing: Framing,
    ) -> Result<Arc<dyn Channel>, CliqueError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        write_handshake(&mut stream, self.self_id, election_id.as_u128()).await?;
        let (peer_id, peer_election) = read_handshake(&mut stream).await?;

        if peer_election != election_id.as_u128() {
            return Err(CliqueError::HandshakeReject {
                election_id,
                reason: format!("peer responded with election {peer_election:#x}"),
            });
        }

        let (reader, writer) = tokio::io::split(stream);
        Ok(channel_from_halves(reader, writer, framing, peer_id))
    }

    /// The acceptor side: read `[conn_id][election_id]`, mirror it back, park until the local
    /// election's mesh exists if necessary, then stash the resulting channel in its slot.
    pub(crate) async fn handle_incoming_stream<S>(&self, mut stream: S) -> Result<(), CliqueError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (conn_id, election_raw) = read_handshake(&mut stream).await?;
        let election_id = Uuid::from_u128(election_raw);

        write_handshake(&mut stream, self.self_id, election_raw).await?;
        debug!(conn_id, %election_id, "accepted clique handshake");

        let framing = loop {
            let mesh = self.mesh.lock().await;
            if let Some(descriptor) = mesh.get(&election_id) {
                break descriptor.framing;
            }
            drop(mesh);

            let notify = {
                let mut pending = self.pending.lock().await;
                pending
                    .entry(election_id)
                    .or_insert_with(|| Arc::new(Notify::new()))
                    .clone()
            };
            notify.notified().await;
        };

        let (reader, writer) = tokio::io::split(stream);
        let channel = channel_from_halves(reader, writer, framing, conn_id);
        self.install_slot(election_id, conn_id, channel).await;
        Ok(())
    }
}
