//! The MPC vector engine (spec §4.E): the same interface as the scalar engine, but every value
//! is a tuple of fixed width `S`, batching `S` independent checks into one round of
//! communication. Used by the voting-rule `validate` routines (`tallier-voting`).
//!
//! Unlike the scalar engine's `multiply` (wired to `rnd_multiply`), the vector engine's
//! `multiply` is the plain BGW degree-reduction protocol, batched across the tuple — matching
//! the original source, which never gives `MpcValidation` a randomized-reconstructor variant.

use std::sync::Arc;

use tallier_field::Elem;
use tallier_transport::{Channel, Framing, LoopbackChannel};

use crate::error::MpcError;
use crate::parameters::Parameters;

/// One tallier's view of a running vector-width MPC instance, analogous to [`crate::Mpc`] but
/// over channels framed at a fixed width `S` (spec §4.E).
pub struct MpcVector {
    params: Parameters,
    channels: Vec<Arc<dyn Channel>>,
    width: usize,
}

impl MpcVector {
    /// Build an `MpcVector` from the clique manager's returned slots, as [`crate::Mpc::new`]
    /// does for the scalar engine. `width` is the vote-vector's message size for this election's
    /// rule (`S` in spec §4.E), and must match the `Framing::Vector(width)` the clique was dialed
    /// with.
    pub fn new(params: Parameters, slots: Vec<Option<Arc<dyn Channel>>>, width: usize) -> MpcVector {
        let self_id = params.self_id as usize;
        let channels = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    debug_assert_eq!(i, self_id, "only the self_id slot should be None");
                    Arc::new(LoopbackChannel::new(Framing::Vector(width))) as Arc<dyn Channel>
                })
            })
            .collect();
        MpcVector { params, channels, width }
    }

    pub fn self_id(&self) -> u8 {
        self.params.self_id
    }

    pub fn d(&self) -> usize {
        self.params.d
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn block_size(&self) -> u32 {
        self.params.block_size
    }

    /// Exchange a batch of `n <= width` coordinates: `values[coord][peer]` in, same shape out.
    /// The channel's framing already pads/truncates each peer's write to the full `width`
    /// (spec §4.B), so this only has to transpose coordinate-major to peer-major and back.
    pub async fn exchange(&self, msgid: u32, values: &[Vec<Elem>]) -> Result<Vec<Vec<Elem>>, MpcError> {
        let n = values.len();
        debug_assert!(n <= self.width, "batch of {n} coordinates exceeds this channel's width {}", self.width);

        let futures = self.channels.iter().enumerate().map(|(peer, channel)| {
            let outgoing: Vec<Elem> = values.iter().map(|coord| coord[peer]).collect();
            async move {
                channel.write(msgid, &outgoing).await?;
                let received = channel.read(msgid).await?;
                Ok::<Vec<Elem>, tallier_transport::TransportError>(received[..n].to_vec())
            }
        });
        let per_peer = futures::future::try_join_all(futures).await?;

        Ok((0..n).map(|coord| per_peer.iter().map(|peer_values| peer_values[coord]).collect()).collect())
    }

    /// Batched BGW multiplication (spec §4.E): local product per coordinate, re-shared at
    /// degree `t-1`, degree-reduced with the same `lambda` the scalar engine precomputes.
    pub async fn multiply(&self, msgid: u32, a: &[Elem], b: &[Elem]) -> Result<Vec<Elem>, MpcError> {
        debug_assert_eq!(a.len(), b.len());
        let field = self.params.field;
        let values: Vec<Vec<Elem>> = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let local_product = field.mul(*x, *y);
                tallier_field::gen_shares(&field, local_product, self.params.d, self.params.t)
            })
            .collect();

        let received = self.exchange(msgid, &values).await?;
        Ok(received
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.params.lambda.iter())
                    .fold(field.zero(), |acc, (r, l)| field.add(acc, field.mul(*r, *l)))
            })
            .collect())
    }

    /// Open every coordinate of `a` in the clear (spec §4.E `resolve`, batched).
    pub async fn resolve(&self, msgid: u32, a: &[Elem]) -> Result<Vec<Elem>, MpcError> {
        let field = self.params.field;
        let values: Vec<Vec<Elem>> = a.iter().map(|v| vec![*v; self.params.d]).collect();
        let received = self.exchange(msgid, &values).await?;
        received
            .iter()
            .map(|row| {
                let points: Vec<(u32, Elem)> = row.iter().enumerate().map(|(i, v)| ((i + 1) as u32, *v)).collect();
                tallier_field::reconstruct(&field, &points, self.params.t).map_err(MpcError::from)
            })
            .collect()
    }

    /// `amount` jointly-random field elements, none ever known in the clear (spec §4.E
    /// `random_number`; used by `validate_borda`'s randomized pair-distinct check).
    pub async fn random_number(&self, msgid: u32, amount: usize) -> Result<Vec<Elem>, MpcError> {
        let field = self.params.field;
        let values: Vec<Vec<Elem>> = (0..amount)
            .map(|_| {
                let r = field.random_element(&mut rand::thread_rng());
                tallier_field::gen_shares(&field, r, self.params.d, self.params.t)
            })
            .collect();
        let received = self.exchange(msgid, &values).await?;
        Ok(received
            .into_iter()
            .map(|row| row.into_iter().fold(field.zero(), |acc, x| field.add(acc, x)))
            .collect())
    }

    /// Batched Fermat `is_zero` (spec §4.E): `1 - a^(p-1)` per coordinate, computed by the same
    /// repeated-squaring loop as the scalar engine but over the whole vector at once.
    pub async fn is_zero(&self, msgid: u32, a: &[Elem]) -> Result<Vec<Elem>, MpcError> {
        let field = self.params.field;
        let mut exponent = field.prime() - 1;
        let mut result = vec![field.one(); a.len()];
        let mut base = a.to_vec();
        let mut step = msgid;

        while exponent > 0 {
            if exponent % 2 == 1 {
                result = self.multiply(step, &result, &base).await?;
                step += self.params.block_size;
            }
            base = self.multiply(step, &base, &base).await?;
            step += self.params.block_size;
            exponent /= 2;
        }

        Ok(result.into_iter().map(|r| field.sub(field.one(), r)).collect())
    }

    /// Reduce each tuple in `muls` to the product of its entries, in `ceil(log2(max length))`
    /// batched rounds (spec §4.E `multi_products`): every round multiplies one pairing from
    /// every still-unfinished tuple in a single batched `multiply` call. An empty tuple reduces
    /// to `1` (the multiplicative identity), matching the original's `Mul[0] if Mul else 1`.
    pub async fn multi_products(&self, msgid: u32, muls: &[Vec<Elem>]) -> Result<Vec<Elem>, MpcError> {
        let field = self.params.field;
        let mut muls: Vec<Vec<Elem>> = muls.to_vec();
        let mut step = msgid;

        while muls.iter().any(|m| m.len() > 1) {
            let mut pairs_a = Vec::new();
            let mut pairs_b = Vec::new();
            let mut amounts = Vec::with_capacity(muls.len());
            for m in &muls {
                let amount = m.len() / 2;
                amounts.push(amount);
                for i in 0..amount {
                    pairs_a.push(m[2 * i]);
                    pairs_b.push(m[2 * i + 1]);
                }
            }

            let products = self.multiply(step, &pairs_a, &pairs_b).await?;
            step += self.params.block_size;

            let mut offset = 0;
            for (m, amount) in muls.iter_mut().zip(amounts.iter()) {
                let mut reduced: Vec<Elem> = products[offset..offset + amount].to_vec();
                offset += amount;
                if m.len() % 2 == 1 {
                    reduced.push(m[m.len() - 1]);
                }
                *m = reduced;
            }
        }

        Ok(muls.into_iter().map(|m| m.into_iter().next().unwrap_or_else(|| field.one())).collect())
    }
}
