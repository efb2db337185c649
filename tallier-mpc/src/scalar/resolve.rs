//! Opening a shared value in the clear (spec §4.D `resolve`): every party broadcasts its share
//! and reconstructs locally.

use tallier_field::Elem;

use super::Mpc;
use crate::error::MpcError;

impl Mpc {
    /// Broadcast `a` to every peer and reconstruct the value everyone else broadcasts back, via
    /// Lagrange interpolation at the clique's reconstruction threshold.
    pub async fn resolve(&self, msgid: u32, a: Elem) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let outgoing = vec![a; self.params.d];
        let received = self.exchange(msgid, &outgoing).await?;
        let points: Vec<(u32, Elem)> = received
            .into_iter()
            .enumerate()
            .map(|(i, v)| ((i + 1) as u32, v))
            .collect();
        Ok(tallier_field::reconstruct(&field, &points, self.params.t)?)
    }
}
