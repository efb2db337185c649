//! A protocol common to multiple scalar-engine tests, saving each test module from redefining
//! how to wire up an in-process clique: a fully-connected grid of in-memory duplex streams
//! standing in for the TLS mesh.

#![cfg(test)]

use std::sync::Arc;

use tallier_field::{Elem, Field};
use tallier_transport::{Channel, Framing};

use crate::parameters::Parameters;
use crate::scalar::Mpc;

/// Wire up a fully-connected clique of `d` in-process `Mpc` instances, each pair of parties
/// joined by a `tokio::io::duplex` pair standing in for a TLS connection.
pub(crate) fn wire_clique(field: Field, d: usize) -> Vec<Mpc> {
    let mut grid: Vec<Vec<Option<Arc<dyn Channel>>>> = (0..d).map(|_| (0..d).map(|_| None).collect()).collect();
    for i in 0..d {
        for j in 0..d {
            if i == j || grid[i][j].is_some() {
                continue;
            }
            let (a, b) = tokio::io::duplex(1 << 20);
            let (ar, aw) = tokio::io::split(a);
            let (br, bw) = tokio::io::split(b);
            grid[i][j] = Some(tallier_transport::channel_from_halves(ar, aw, Framing::Scalar, j as u8));
            grid[j][i] = Some(tallier_transport::channel_from_halves(br, bw, Framing::Scalar, i as u8));
        }
    }
    (0..d)
        .map(|i| {
            let params = Parameters::new(field, i as u8, d).unwrap();
            let slots = std::mem::take(&mut grid[i]);
            Mpc::new(params, slots)
        })
        .collect()
}

/// Reconstruct the secret behind a full vector of per-party shares, in evaluation-point order.
pub(crate) async fn open_all(field: &Field, parties: &[Mpc], shares: Vec<Elem>) -> Elem {
    let points: Vec<_> = shares.into_iter().enumerate().map(|(i, v)| ((i + 1) as u32, v)).collect();
    tallier_field::reconstruct(field, &points, parties[0].params.t).unwrap()
}
