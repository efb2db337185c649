//! The inbound per-msgid demultiplexer (spec §4.B, design note in §9): a map from `msgid` to
//! either queued payloads or a waiter, mutated only from the cooperative (single-threaded-per-
//! channel) receive loop and from `read` calls.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::TransportError;

enum Slot {
    Queued(VecDeque<Vec<u32>>),
    Waiting(oneshot::Sender<Vec<u32>>),
}

/// A mapping `msgid -> {queued payloads | a waiter}`, per spec §9's "straightforward with
/// tagged variants + a cooperative mutex (uncontended)". The mutex here is a plain `std::sync`
/// one: every critical section is synchronous (map bookkeeping only), so there is never a
/// reason to hold it across an `.await`.
pub struct Demux {
    slots: Mutex<HashMap<u32, Slot>>,
}

impl Demux {
    pub fn new() -> Self {
        Demux {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Called by the receive loop when a frame for `msgid` arrives. If a waiter is parked on
    /// this msgid, it is woken immediately and the entry removed; otherwise the payload is
    /// queued for a future `read`.
    pub fn deliver(&self, msgid: u32, payload: Vec<u32>) {
        let mut slots = self.slots.lock().unwrap();
        match slots.remove(&msgid) {
            Some(Slot::Waiting(tx)) => {
                // the reader may have been dropped (cancelled); that's fine, just drop the payload
                let _ = tx.send(payload);
            }
            Some(Slot::Queued(mut queue)) => {
                queue.push_back(payload);
                slots.insert(msgid, Slot::Queued(queue));
            }
            None => {
                let mut queue = VecDeque::new();
                queue.push_back(payload);
                slots.insert(msgid, Slot::Queued(queue));
            }
        }
    }

    /// Return the next in-order payload tagged `msgid`, suspending until one arrives if none is
    /// queued yet.
    pub async fn read(&self, msgid: u32) -> Result<Vec<u32>, TransportError> {
        let waiter = {
            let mut slots = self.slots.lock().unwrap();
            match slots.remove(&msgid) {
                Some(Slot::Queued(mut queue)) => {
                    let payload = queue.pop_front();
                    if !queue.is_empty() {
                        slots.insert(msgid, Slot::Queued(queue));
                    }
                    match payload {
                        Some(p) => return Ok(p),
                        None => None, // empty queue entries are never stored, but be defensive
                    }
                }
                Some(Slot::Waiting(_)) | None => None,
            }
        };

        if waiter.is_none() {
            let (tx, rx) = oneshot::channel();
            self.slots.lock().unwrap().insert(msgid, Slot::Waiting(tx));
            return rx.await.map_err(Into::into);
        }
        unreachable!()
    }

    /// Drop every pending waiter, as if the channel had been cancelled (spec §5: "cancelling
    /// the receive loop drains pending writers"). Queued-but-unread payloads are abandoned too.
    pub fn drain(&self) {
        self.slots.lock().unwrap().clear();
    }
}

impl Default for Demux {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn delivers_to_a_pending_waiter() {
        let demux = Arc::new(Demux::new());
        let d2 = demux.clone();
        let handle = tokio::spawn(async move { d2.read(5).await.unwrap() });
        tokio::task::yield_now().await;
        demux.deliver(5, vec![9, 9]);
        assert_eq!(handle.await.unwrap(), vec![9, 9]);
    }

    #[tokio::test]
    async fn queues_when_nobody_is_waiting() {
        let demux = Demux::new();
        demux.deliver(1, vec![1]);
        demux.deliver(1, vec![2]);
        assert_eq!(demux.read(1).await.unwrap(), vec![1]);
        assert_eq!(demux.read(1).await.unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn msgids_are_independent() {
        let demux = Demux::new();
        demux.deliver(2, vec![20]);
        demux.deliver(1, vec![10]);
        assert_eq!(demux.read(1).await.unwrap(), vec![10]);
        assert_eq!(demux.read(2).await.unwrap(), vec![20]);
    }
}
