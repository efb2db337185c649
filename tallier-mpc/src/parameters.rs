//! Per-clique parameters shared by the scalar and vector MPC engines: the field, the
//! reconstruction threshold, the degree-reduction coefficients, and the msgid block size
//! (spec §4.D).

use tallier_field::{Elem, Field, FieldError};

/// Parameters derived once per clique (shared by every MPC instance running against it,
/// scalar or vector).
#[derive(Clone)]
pub struct Parameters {
    pub field: Field,
    pub self_id: u8,
    pub d: usize,
    /// Reconstruction threshold `t = ceil((D+1)/2)`.
    pub t: usize,
    /// The first row of the inverse Vandermonde matrix: the `D` coefficients `lambda_i` that
    /// let `bgw_multiply` degree-reduce in a single round via `sum(lambda_i * h_i)`.
    pub lambda: Vec<Elem>,
    /// `2 * ceil(sqrt(ceil(log2 p)))^2` (spec §4.D); the msgid footprint budgeted per complex
    /// sub-protocol call.
    pub block_size: u32,
}

impl Parameters {
    /// `d` must be odd: `t = ceil((d+1)/2)` only satisfies `2t-1 <= d` (the degree-reduction
    /// Vandermonde in `bgw_multiply`/`rnd_multiply` needs `2t-1` evaluation points, no more than
    /// the clique has) when `d` is odd. Election setup is responsible for only ever forming
    /// odd-sized cliques; this is not re-validated on every call.
    pub fn new(field: Field, self_id: u8, d: usize) -> Result<Parameters, FieldError> {
        let t = (d + 1 + 1) / 2; // ceil((D+1)/2)
        let vandermonde = tallier_field::vandermonde(&field, d);
        let inverse = tallier_field::inverse(&field, &vandermonde)?;
        let lambda = inverse[0].clone();
        let block_size = compute_block_size(field.prime());

        Ok(Parameters {
            field,
            self_id,
            d,
            t,
            lambda,
            block_size,
        })
    }
}

fn compute_block_size(p: u32) -> u32 {
    let log2_p = (32 - p.leading_zeros()).max(1) as f64;
    let inner = log2_p.sqrt().ceil() as u32;
    2 * inner * inner
}
