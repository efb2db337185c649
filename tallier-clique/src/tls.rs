//! Mutual-TLS material for the clique's TCP listener and outbound dials (spec §6, §10).
//!
//! Peers are addressed by IP in both test and production deployments, so hostname verification
//! is relaxed to a single fixed logical name presented by every peer (mirroring the original's
//! `ssl.SSLContext` built with `check_hostname = False` plus certificate-only trust, per
//! SPEC_FULL.md §10).

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use rustls::server::WebPkiClientVerifier;
use rustls::{ClientConfig, RootCertStore, ServerConfig};
use tokio_rustls::{TlsAcceptor, TlsConnector};

use crate::error::CliqueError;

/// The TLS configuration one tallier process holds for its whole lifetime: an acceptor for
/// inbound dials and a connector for outbound ones, both validating peers against the same CA.
pub struct TlsMaterial {
    pub acceptor: TlsAcceptor,
    pub connector: TlsConnector,
    pub peer_domain: ServerName<'static>,
}

impl TlsMaterial {
    pub fn load(
        cert_path: &Path,
        key_path: &Path,
        ca_path: &Path,
        peer_domain: &str,
    ) -> Result<TlsMaterial, CliqueError> {
        let certs = load_certs(cert_path)?;
        let key = load_key(key_path)?;
        let mut roots = RootCertStore::empty();
        for ca_cert in load_certs(ca_path)? {
            roots
                .add(ca_cert)
                .map_err(|e| CliqueError::InvalidCertificate(e.to_string()))?;
        }
        let roots = Arc::new(roots);

        let client_verifier = WebPkiClientVerifier::builder(roots.clone())
            .build()
            .map_err(|e| CliqueError::InvalidCertificate(e.to_string()))?;

        let server_config = ServerConfig::builder()
            .with_client_cert_verifier(client_verifier)
            .with_single_cert(certs.clone(), key.clone_key())?;

        let client_config = ClientConfig::builder()
            .with_root_certificates((*roots).clone())
            .with_client_auth_cert(certs, key)
            .map_err(|e| CliqueError::InvalidCertificate(e.to_string()))?;

        let peer_domain = ServerName::try_from(peer_domain.to_string())
            .map_err(|e| CliqueError::InvalidCertificate(e.to_string()))?;

        Ok(TlsMaterial {
            acceptor: TlsAcceptor::from(Arc::new(server_config)),
            connector: TlsConnector::from(Arc::new(client_config)),
            peer_domain,
        })
    }
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, CliqueError> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliqueError::InvalidCertificate(e.to_string()))
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, CliqueError> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| CliqueError::InvalidCertificate(e.to_string()))?
        .ok_or_else(|| CliqueError::InvalidCertificate(format!("no private key found in {path:?}")))
}
