//! Shared in-process clique wiring for this crate's tests, mirroring `tallier-mpc`'s own
//! `test_support` module.

#![cfg(test)]

use std::sync::Arc;

use tallier_field::Field;
use tallier_mpc::{Mpc, MpcVector, Parameters};
use tallier_transport::{channel_from_halves, Channel, Framing};

fn duplex_grid(d: usize, framing: impl Fn() -> Framing) -> Vec<Vec<Option<Arc<dyn Channel>>>> {
    let mut grid: Vec<Vec<Option<Arc<dyn Channel>>>> = (0..d).map(|_| (0..d).map(|_| None).collect()).collect();
    for i in 0..d {
        for j in 0..d {
            if i == j || grid[i][j].is_some() {
                continue;
            }
            let (a, b) = tokio::io::duplex(1 << 20);
            let (ar, aw) = tokio::io::split(a);
            let (br, bw) = tokio::io::split(b);
            grid[i][j] = Some(channel_from_halves(ar, aw, framing(), j as u8));
            grid[j][i] = Some(channel_from_halves(br, bw, framing(), i as u8));
        }
    }
    grid
}

pub(crate) fn wire_scalar(field: Field, d: usize) -> Vec<Mpc> {
    let mut grid = duplex_grid(d, || Framing::Scalar);
    (0..d)
        .map(|i| {
            let params = Parameters::new(field, i as u8, d).unwrap();
            let slots = std::mem::take(&mut grid[i]);
            Mpc::new(params, slots)
        })
        .collect()
}

pub(crate) fn wire_vector(field: Field, d: usize, width: usize) -> Vec<MpcVector> {
    let mut grid = duplex_grid(d, || Framing::Vector(width));
    (0..d)
        .map(|i| {
            let params = Parameters::new(field, i as u8, d).unwrap();
            let slots = std::mem::take(&mut grid[i]);
            MpcVector::new(params, slots, width)
        })
        .collect()
}
