//! Per-election mesh formation: dial lower-indexed peers, accept higher-indexed peers, and
//! rendezvous by election id (spec §4.C).

use std::net::SocketAddr;
use std::sync::Arc;

use tallier_transport::{Channel, Framing};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::CliqueError;
use crate::rendezvous::Rendezvous;
use crate::tls::TlsMaterial;

/// Maintains the long-running TLS listener and assembles per-election meshes on command. The
/// rendezvous state machine itself (spec §4.C) lives in [`Rendezvous`], which is TLS-agnostic;
/// this type is the thin TLS-specific shell around it.
pub struct CliqueManager {
    listen_addr: SocketAddr,
    tls: TlsMaterial,
    rendezvous: Rendezvous,
}

impl CliqueManager {
    pub fn new(self_id: u8, listen_addr: SocketAddr, tls: TlsMaterial) -> Arc<CliqueManager> {
        Arc::new(CliqueManager {
            listen_addr,
            tls,
            rendezvous: Rendezvous::new(self_id),
        })
    }

    /// Bind the listener and run the accept loop until the returned task is aborted. Each
    /// accepted connection is dispatched to its owning election by handshake (spec §4.C).
    pub async fn listen(self: Arc<Self>) -> Result<(), CliqueError> {
        let listener = TcpListener::bind(self.listen_addr).await?;
        info!(addr = %self.listen_addr, "clique listener bound");
        loop {
            let (stream, peer_addr) = listener.accept().await?;
            let this = self.clone();
            tokio::spawn(async move {
                if let Err(e) = this.handle_incoming(stream, peer_addr).await {
                    warn!(%peer_addr, error = %e, "incoming clique connection failed");
                }
            });
        }
    }

    /// Assemble the mesh for `election_id`: dial every peer with index `< self_id`, and rely on
    /// the listener's accept loop to fill in every peer with index `> self_id`. Returns a
    /// `D`-length vector with `None` at `self_id` (the caller substitutes a `LoopbackChannel`).
    #[instrument(skip(self, peer_addresses), fields(election_id = %election_id))]
    pub async fn start_clique(
        &self,
        election_id: Uuid,
        peer_addresses: &[SocketAddr],
        self_id: u8,
        framing: Framing,
    ) -> Result<Vec<Option<Arc<dyn Channel>>>, CliqueError> {
        debug_assert_eq!(
            self_id, self.rendezvous.self_id,
            "start_clique called with a self_id that disagrees with this process's configuration"
        );
        let d = peer_addresses.len();
        self.rendezvous.begin_mesh(election_id, d, framing).await;

        let dials = peer_addresses
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx < self.rendezvous.self_id as usize)
            .map(|(idx, addr)| {
                let addr = *addr;
                let idx = idx as u8;
                let domain = self.tls.peer_domain.clone();
                let connector = self.tls.connector.clone();
                async move {
                    let result = self.dial(addr, connector, domain, election_id, framing).await;
                    (idx, result)
                }
            });

        for (idx, result) in futures::future::join_all(dials).await {
            match result {
                Ok(channel) => {
                    self.rendezvous.install_slot(election_id, idx, channel).await;
                }
                Err(e) => {
                    // per spec §4.C: a dial failure is logged and does not retry internally; the
                    // ready signal simply never fires and the caller's own timeout governs abort.
                    warn!(peer = idx, error = %e, "dial failed, mesh will not complete");
                }
            }
        }

        Ok(self.rendezvous.await_complete(election_id).await)
    }

    async fn dial(
        &self,
        addr: SocketAddr,
        connector: tokio_rustls::TlsConnector,
        domain: rustls::pki_types::ServerName<'static>,
        election_id: Uuid,
        framing: Framing,
    ) -> Result<Arc<dyn Channel>, CliqueError> {
        let tcp = TcpStream::connect(addr).await?;
        let stream = connector.connect(domain, tcp).await?;
        self.rendezvous.dial_handshake(stream, election_id, framing).await
    }

    async fn handle_incoming(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> Result<(), CliqueError> {
        let stream = self.tls.acceptor.accept(stream).await?;
        tracing::debug!(%peer_addr, "tls accepted, awaiting clique handshake");
        self.rendezvous.handle_incoming_stream(stream).await
    }
}
