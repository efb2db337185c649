//! The single-scalar MPC arithmetic engine (spec §4.D): multiply, resolve, random number/bit,
//! prefix-or, bitwise less-than, is-odd, less, min/max, is-zero, is-positive, all over a clique
//! of `D` [`Channel`]s, one of which (at `self_id`) is a [`LoopbackChannel`].

mod compare;
mod fan_in_or;
mod minmax;
mod multiply;
mod random;
mod resolve;
mod tournament;

pub use fan_in_or::fan_in_or_coefficients;

use std::sync::Arc;

use tallier_transport::{Channel, Framing, LoopbackChannel};

use crate::error::MpcError;
use crate::parameters::Parameters;

/// One tallier's view of a running MPC instance: the clique's channels (scalar framing) plus
/// the precomputed parameters shared with the vector engine.
pub struct Mpc {
    pub(crate) params: Parameters,
    pub(crate) channels: Vec<Arc<dyn Channel>>,
}

impl Mpc {
    /// Build an `Mpc` from the clique manager's returned slots: `None` at `self_id` is replaced
    /// with a loopback channel (spec §4.C step 5 / §4.B "Self channel").
    pub fn new(params: Parameters, slots: Vec<Option<Arc<dyn Channel>>>) -> Mpc {
        let self_id = params.self_id as usize;
        let channels = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    debug_assert_eq!(i, self_id, "only the self_id slot should be None");
                    Arc::new(LoopbackChannel::new(Framing::Scalar)) as Arc<dyn Channel>
                })
            })
            .collect();
        Mpc { params, channels }
    }

    pub fn self_id(&self) -> u8 {
        self.params.self_id
    }

    pub fn d(&self) -> usize {
        self.params.d
    }

    pub fn block_size(&self) -> u32 {
        self.params.block_size
    }

    /// `ceil(log2 p)`: the bit width every comparison primitive (`less`, `min`, `max`,
    /// `is_positive`) needs to fully cover a field element, used by callers (the voting and
    /// orchestrator crates) that don't otherwise track a narrower bound on their values.
    pub fn default_bit_width(&self) -> usize {
        let p = self.params.field.prime();
        (32 - p.leading_zeros()) as usize
    }

    /// Write `values[i]` to peer `i` and read one value back from each, in parallel
    /// (spec §4.D `exchange`). `values.len()` must equal `D`; the entry at `self_id` round-trips
    /// through the loopback channel unchanged.
    pub async fn exchange(&self, msgid: u32, values: &[tallier_field::Elem]) -> Result<Vec<tallier_field::Elem>, MpcError> {
        debug_assert_eq!(values.len(), self.channels.len());
        let futures = self.channels.iter().zip(values.iter()).map(|(channel, value)| {
            let value = *value;
            async move {
                channel.write(msgid, &[value]).await?;
                let received = channel.read(msgid).await?;
                Ok::<tallier_field::Elem, tallier_transport::TransportError>(received[0])
            }
        });
        let results = futures::future::try_join_all(futures).await?;
        Ok(results)
    }

    /// `multiply` is wired to `rnd_multiply` everywhere (spec §4.D, §9 open question resolved
    /// in SPEC_FULL.md §9): `bgw_multiply` remains reachable as a named alternative for direct
    /// testing, but no protocol in this crate composes on top of it by default.
    pub async fn multiply(&self, msgid: u32, a: tallier_field::Elem, b: tallier_field::Elem) -> Result<tallier_field::Elem, MpcError> {
        self.rnd_multiply(msgid, a, b).await
    }
}
