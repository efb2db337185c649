//! Multiplication of two Shamir-shared scalars: the BGW degree-reduction protocol and the
//! randomized designated-reconstructor protocol (spec §4.D). `Mpc::multiply` is wired to the
//! latter by default (SPEC_FULL.md §9).

use tallier_field::Elem;

use super::Mpc;
use crate::error::MpcError;

impl Mpc {
    /// Local product `a*b` lies on a degree-`2(t-1)` polynomial; re-share it at degree `t-1` and
    /// degree-reduce in one round via the precomputed inverse-Vandermonde first row (`lambda`).
    /// One round, but every party learns the product of the *local* multiplication immediately,
    /// which leaks more than `rnd_multiply` — kept for testing and as a named alternative.
    pub async fn bgw_multiply(&self, msgid: u32, a: Elem, b: Elem) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let local_product = field.mul(a, b);
        let h = tallier_field::gen_shares(&field, local_product, self.params.d, self.params.t);
        let received = self.exchange(msgid, &h).await?;

        let mut result = field.zero();
        for (r, lambda_i) in received.iter().zip(self.params.lambda.iter()) {
            result = field.add(result, field.mul(*r, *lambda_i));
        }
        Ok(result)
    }

    /// Randomized multiplication with a designated reconstructor (spec §4.D): mask the
    /// degree-doubled product with a jointly random value known only in the clear to nobody,
    /// have one party (rotating by `msgid`) reconstruct the masked product and broadcast it in
    /// the clear, then everyone subtracts off their share of the mask. Consumes four consecutive
    /// msgids starting at `msgid`; callers must reserve at least `4` (in practice a whole
    /// `block_size` slot) before reusing the range.
    pub async fn rnd_multiply(&self, msgid: u32, a: Elem, b: Elem) -> Result<Elem, MpcError> {
        let field = self.params.field;
        let d = self.params.d;
        let t = self.params.t;

        let r_i = field.random_element(&mut rand::thread_rng());
        let rd_shares = tallier_field::gen_shares(&field, r_i, d, t);
        let r2d_shares = tallier_field::gen_shares(&field, r_i, d, 2 * t - 1);

        let (rd_received, r2d_received) = tokio::try_join!(
            self.exchange(msgid, &rd_shares),
            self.exchange(msgid + 1, &r2d_shares),
        )?;

        let r_d = rd_received.iter().fold(field.zero(), |acc, x| field.add(acc, *x));
        let r_2d = r2d_received.iter().fold(field.zero(), |acc, x| field.add(acc, *x));

        let w_share = field.add(field.mul(a, b), r_2d);

        let reconstructor = (msgid as usize) % d;
        let gather_msgid = msgid + 2;
        let broadcast_msgid = msgid + 3;

        self.channels[reconstructor].write(gather_msgid, &[w_share]).await?;

        let w = if self.params.self_id as usize == reconstructor {
            let mut points = Vec::with_capacity(d);
            for (i, channel) in self.channels.iter().enumerate() {
                let v = channel.read(gather_msgid).await?;
                points.push(((i + 1) as u32, v[0]));
            }
            let w = tallier_field::reconstruct(&field, &points, 2 * t - 1)?;
            for channel in &self.channels {
                channel.write(broadcast_msgid, &[w]).await?;
            }
            w
        } else {
            let v = self.channels[reconstructor].read(broadcast_msgid).await?;
            v[0]
        };

        Ok(field.sub(w, r_d))
    }
}
