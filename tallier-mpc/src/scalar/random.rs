//! Jointly-random shared values: a random field element nobody knows in the clear, and a random
//! bit (spec §4.D), both built on the sum-of-local-randomness trick: each party shares a uniform
//! value and the sum of everyone's shares is itself uniform, with no party ever learning it.

use tallier_field::Elem;

use super::Mpc;
use crate::error::MpcError;

impl Mpc {
    /// Each party shares a locally-sampled random element; summing the received shares gives a
    /// share of a value nobody ever learned individually. One round.
    pub async fn random_number(&self, msgid: u32) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let r_i = field.random_element(&mut rand::thread_rng());
        let shares = tallier_field::gen_shares(&field, r_i, self.params.d, self.params.t);
        let received = self.exchange(msgid, &shares).await?;
        Ok(received.into_iter().fold(field.zero(), |acc, x| field.add(acc, x)))
    }

    /// A uniformly random bit, via the standard "square a random element, resolve it in the
    /// clear, take its square root" construction: if `r^2 = 0` (which only happens when `r = 0`
    /// itself), retry on a fresh msgid range. Consumes up to `block_size` msgids per attempt, and
    /// retries are expected to be rare (probability `1/p` per attempt).
    pub async fn random_bit(&self, msgid: u32) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let mut base = msgid;
        loop {
            let r = self.random_number(base).await?;
            let r_squared = self.multiply(base + 1, r, r).await?;
            let t = self.resolve(base + 5, r_squared).await?;
            if t != 0 {
                let root = tallier_field::mod_sqrt(&field, t);
                let root_inv = field.inverse(root)?;
                let shifted = field.add(field.mul(r, root_inv), field.one());
                return Ok(field.mul(shifted, field.inverse_two()));
            }
            base += self.params.block_size;
        }
    }
}

#[cfg(test)]
mod tests {
    use tallier_field::Field;

    use super::*;
    use crate::test_support::wire_clique;

    #[tokio::test]
    async fn random_number_is_consistent_across_parties() {
        let field = Field::new(2_147_483_647).unwrap();
        let d = 5;
        let parties = wire_clique(field, d);

        let futures = parties.iter().map(|mpc| mpc.random_number(1));
        let shares = futures::future::join_all(futures).await;
        let points: Vec<_> = shares
            .into_iter()
            .enumerate()
            .map(|(i, r)| ((i + 1) as u32, r.unwrap()))
            .collect();
        // any `t` of the `d` shares must reconstruct to the same value
        let a = tallier_field::reconstruct(&field, &points, parties[0].params.t).unwrap();
        let b = tallier_field::reconstruct(&field, &points[1..], parties[0].params.t).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn random_bit_reconstructs_to_zero_or_one() {
        let field = Field::new(101).unwrap();
        let d = 5;
        let parties = wire_clique(field, d);

        let futures = parties.iter().map(|mpc| mpc.random_bit(100));
        let shares = futures::future::join_all(futures).await;
        let points: Vec<_> = shares
            .into_iter()
            .enumerate()
            .map(|(i, r)| ((i + 1) as u32, r.unwrap()))
            .collect();
        let bit = tallier_field::reconstruct(&field, &points, parties[0].params.t).unwrap();
        assert!(bit == 0 || bit == 1);
    }
}
