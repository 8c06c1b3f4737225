//! Inter-walker messaging.
//!
//! The sampler only needs point-to-point sends with tag matching, a barrier,
//! and two small reductions, so the substrate is abstracted behind
//! [`Transport`]. [`LocalTransport`] wires all workers of one process
//! together over channels; a fabric of size 1 runs the whole protocol on a
//! single worker, which is how the orchestrator is unit tested.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Barrier};

use crate::error::WlError;

/// Message tags. The high byte encodes the protocol phase and the low bytes
/// the window id, so a receive posted for one `(phase, window)` pair never
/// matches traffic of another.
pub mod tag {
    pub const WINDOW_GATHER: u32 = 0x0100_0000;
    pub const WINDOW_SCATTER: u32 = 0x0200_0000;
    pub const STITCH: u32 = 0x0300_0000;
    pub const FLAT_GATHER: u32 = 0x0400_0000;
    pub const FLAT_BCAST: u32 = 0x0500_0000;
    pub const TIME_GATHER: u32 = 0x0600_0000;
    pub const STATUS_BCAST: u32 = 0x0700_0000;

    #[inline]
    pub fn for_window(phase: u32, window_id: usize) -> u32 {
        phase | window_id as u32
    }
}

struct Message {
    src: usize,
    tag: u32,
    data: Vec<f64>,
}

/// Point-to-point messaging between `size()` workers with tagged, matched
/// receives.
///
/// A receive posted with tag T returns only messages sent with tag T from
/// the expected source; other arrivals are stashed, so out-of-order traffic
/// across windows is safe.
pub trait Transport {
    fn size(&self) -> usize;
    fn rank(&self) -> usize;
    fn send(&mut self, dst: usize, tag: u32, buf: &[f64]) -> Result<(), WlError>;
    fn recv(&mut self, src: usize, tag: u32) -> Result<Vec<f64>, WlError>;
    fn barrier(&mut self) -> Result<(), WlError>;

    /// Logical AND over all workers; every worker receives the result.
    fn all_and(&mut self, value: bool) -> Result<bool, WlError> {
        let size = self.size();
        if self.rank() == 0 {
            let mut all = value;
            for src in 1..size {
                all &= self.recv(src, tag::FLAT_GATHER)?[0] != 0.0;
            }
            let out = [f64::from(u8::from(all))];
            for dst in 1..size {
                self.send(dst, tag::FLAT_BCAST, &out)?;
            }
            Ok(all)
        } else {
            self.send(0, tag::FLAT_GATHER, &[f64::from(u8::from(value))])?;
            Ok(self.recv(0, tag::FLAT_BCAST)?[0] != 0.0)
        }
    }

    /// Minimum and maximum of `value` over all workers, delivered to the
    /// root only.
    fn reduce_minmax(&mut self, value: f64) -> Result<Option<(f64, f64)>, WlError> {
        if self.rank() == 0 {
            let (mut lo, mut hi) = (value, value);
            for src in 1..self.size() {
                let v = self.recv(src, tag::TIME_GATHER)?[0];
                lo = lo.min(v);
                hi = hi.max(v);
            }
            Ok(Some((lo, hi)))
        } else {
            self.send(0, tag::TIME_GATHER, &[value])?;
            Ok(None)
        }
    }
}

/// Channel-backed transport connecting the workers of one process.
pub struct LocalTransport {
    rank: usize,
    peers: Vec<Sender<Message>>,
    inbox: Receiver<Message>,
    stash: Vec<Message>,
    barrier: Arc<Barrier>,
}

impl LocalTransport {
    /// Build a fully connected fabric of `size` endpoints; endpoint `i` is
    /// rank `i`.
    pub fn fabric(size: usize) -> Vec<LocalTransport> {
        assert!(size > 0);
        let mut senders = Vec::with_capacity(size);
        let mut inboxes = Vec::with_capacity(size);
        for _ in 0..size {
            let (tx, rx) = unbounded();
            senders.push(tx);
            inboxes.push(rx);
        }
        let barrier = Arc::new(Barrier::new(size));
        inboxes
            .into_iter()
            .enumerate()
            .map(|(rank, inbox)| LocalTransport {
                rank,
                peers: senders.clone(),
                inbox,
                stash: Vec::new(),
                barrier: barrier.clone(),
            })
            .collect()
    }
}

impl Transport for LocalTransport {
    fn size(&self) -> usize {
        self.peers.len()
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn send(&mut self, dst: usize, tag: u32, buf: &[f64]) -> Result<(), WlError> {
        let msg = Message {
            src: self.rank,
            tag,
            data: buf.to_vec(),
        };
        self.peers[dst]
            .send(msg)
            .map_err(|_| WlError::Transport(format!("worker {dst} is gone")))
    }

    fn recv(&mut self, src: usize, tag: u32) -> Result<Vec<f64>, WlError> {
        if let Some(pos) = self
            .stash
            .iter()
            .position(|m| m.src == src && m.tag == tag)
        {
            return Ok(self.stash.swap_remove(pos).data);
        }
        loop {
            let msg = self.inbox.recv().map_err(|_| {
                WlError::Transport(format!(
                    "worker {} waiting on {src} (tag {tag:#x}) but all peers are gone",
                    self.rank
                ))
            })?;
            if msg.src == src && msg.tag == tag {
                return Ok(msg.data);
            }
            self.stash.push(msg);
        }
    }

    fn barrier(&mut self) -> Result<(), WlError> {
        self.barrier.wait();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_recv_matches_tag_out_of_order() {
        let mut fabric = LocalTransport::fabric(2);
        let mut t1 = fabric.pop().unwrap();
        let mut t0 = fabric.pop().unwrap();

        thread::scope(|s| {
            s.spawn(move || {
                t1.send(0, tag::for_window(tag::STITCH, 1), &[1.0, 2.0]).unwrap();
                t1.send(0, tag::for_window(tag::STITCH, 2), &[3.0]).unwrap();
            });
            // posted in the opposite order of arrival
            let b = t0.recv(1, tag::for_window(tag::STITCH, 2)).unwrap();
            assert_eq!(b, vec![3.0]);
            let a = t0.recv(1, tag::for_window(tag::STITCH, 1)).unwrap();
            assert_eq!(a, vec![1.0, 2.0]);
        });
    }

    #[test]
    fn test_all_and() {
        let fabric = LocalTransport::fabric(3);
        let flags = [true, false, true];
        thread::scope(|s| {
            for (mut t, flag) in fabric.into_iter().zip(flags) {
                s.spawn(move || {
                    assert!(!t.all_and(flag).unwrap());
                    assert!(t.all_and(true).unwrap());
                });
            }
        });
    }

    #[test]
    fn test_reduce_minmax_reaches_root() {
        let fabric = LocalTransport::fabric(3);
        let values = [0.5, 2.0, -1.0];
        thread::scope(|s| {
            for (mut t, v) in fabric.into_iter().zip(values) {
                s.spawn(move || {
                    let out = t.reduce_minmax(v).unwrap();
                    if t.rank() == 0 {
                        assert_eq!(out, Some((-1.0, 2.0)));
                    } else {
                        assert_eq!(out, None);
                    }
                });
            }
        });
    }

    #[test]
    fn test_self_send() {
        let mut t = LocalTransport::fabric(1).pop().unwrap();
        t.send(0, 7, &[4.0]).unwrap();
        assert_eq!(t.recv(0, 7).unwrap(), vec![4.0]);
        assert!(t.all_and(true).unwrap());
        t.barrier().unwrap();
    }
}
