//! In-process transport
//!
//! [`LocalCluster`] builds a group of [`LocalComm`] handles, one per rank,
//! that exchange byte frames through per-rank mailboxes. Each rank is
//! expected to run on its own thread, the same way each rank of a real job
//! runs in its own process.
//!
//! # Matching
//!
//! Every collective call takes the next value of a per-handle sequence
//! number. Messages are matched on `(sender, sequence)`; if the matched
//! message was sent by a different kind of collective, the ranks have
//! diverged and the receiver fails with a communication error.
//!
//! # Failure detection
//!
//! - Dropping a handle marks its rank departed and wakes every waiter. A
//!   receiver blocked on a departed rank with no pending message fails.
//! - An optional receive timeout turns an indefinite wait into a failure.
//!   There is no timeout by default.

use crate::communicator::Communicator;
use hodmock_core::{Error, Rank, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Which collective produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Gather,
    Scatter,
    ReduceUp,
    ReduceDown,
}

struct Envelope {
    from: Rank,
    seq: u64,
    op: OpKind,
    bytes: Vec<u8>,
}

struct Mailbox {
    queue: Mutex<Vec<Envelope>>,
    ready: Condvar,
}

struct Shared {
    mailboxes: Vec<Mailbox>,
    departed: Vec<AtomicBool>,
    timeout: Option<Duration>,
}

/// Factory for an in-process group of ranks
pub struct LocalCluster;

impl LocalCluster {
    /// Create `size` connected handles with no receive timeout
    pub fn new(size: usize) -> Result<Vec<LocalComm>> {
        Self::build(size, None)
    }

    /// Create `size` connected handles whose receives fail after `timeout`
    pub fn with_timeout(size: usize, timeout: Duration) -> Result<Vec<LocalComm>> {
        Self::build(size, Some(timeout))
    }

    fn build(size: usize, timeout: Option<Duration>) -> Result<Vec<LocalComm>> {
        if size == 0 {
            return Err(Error::invalid_input("a collective group needs at least one rank"));
        }
        let shared = Arc::new(Shared {
            mailboxes: (0..size)
                .map(|_| Mailbox {
                    queue: Mutex::new(Vec::new()),
                    ready: Condvar::new(),
                })
                .collect(),
            departed: (0..size).map(|_| AtomicBool::new(false)).collect(),
            timeout,
        });
        Ok((0..size)
            .map(|rank| LocalComm {
                rank,
                shared: Arc::clone(&shared),
                seq: AtomicU64::new(0),
            })
            .collect())
    }
}

/// One rank's handle onto a [`LocalCluster`]
pub struct LocalComm {
    rank: Rank,
    shared: Arc<Shared>,
    seq: AtomicU64,
}

impl std::fmt::Debug for LocalComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalComm")
            .field("rank", &self.rank)
            .field("size", &self.shared.mailboxes.len())
            .field("seq", &self.seq.load(Ordering::Relaxed))
            .finish()
    }
}

impl LocalComm {
    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    fn send(&self, to: Rank, seq: u64, op: OpKind, bytes: Vec<u8>) -> Result<()> {
        if self.shared.departed[to].load(Ordering::SeqCst) {
            return Err(Error::communication(format!(
                "rank {} cannot send {:?} to departed rank {}",
                self.rank, op, to
            )));
        }
        let mailbox = &self.shared.mailboxes[to];
        mailbox.queue.lock().push(Envelope {
            from: self.rank,
            seq,
            op,
            bytes,
        });
        mailbox.ready.notify_all();
        Ok(())
    }

    fn recv(&self, from: Rank, seq: u64, op: OpKind) -> Result<Vec<u8>> {
        let mailbox = &self.shared.mailboxes[self.rank];
        let deadline = self.shared.timeout.map(|t| Instant::now() + t);
        let mut queue = mailbox.queue.lock();
        loop {
            if let Some(pos) = queue.iter().position(|e| e.from == from && e.seq == seq) {
                let envelope = queue.remove(pos);
                if envelope.op != op {
                    return Err(Error::communication(format!(
                        "collective mismatch at step {}: rank {} expected {:?} from rank {}, got {:?}",
                        seq, self.rank, op, from, envelope.op
                    )));
                }
                return Ok(envelope.bytes);
            }
            if self.shared.departed[from].load(Ordering::SeqCst) {
                return Err(Error::communication(format!(
                    "rank {} left the group before completing step {}",
                    from, seq
                )));
            }
            match deadline {
                Some(deadline) => {
                    if mailbox.ready.wait_until(&mut queue, deadline).timed_out() {
                        // A message may have landed right at the deadline.
                        if queue.iter().any(|e| e.from == from && e.seq == seq) {
                            continue;
                        }
                        return Err(Error::communication(format!(
                            "rank {} timed out waiting for {:?} from rank {} at step {}",
                            self.rank, op, from, seq
                        )));
                    }
                }
                None => mailbox.ready.wait(&mut queue),
            }
        }
    }
}

impl Communicator for LocalComm {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.mailboxes.len()
    }

    fn gather_bytes(&self, payload: Vec<u8>, root: Rank) -> Result<Option<Vec<Vec<u8>>>> {
        self.check_root(root)?;
        let seq = self.next_seq();
        if self.rank != root {
            self.send(root, seq, OpKind::Gather, payload)?;
            debug!(target: "hodmock::comm", rank = self.rank, seq, "gather contribution sent");
            return Ok(None);
        }
        let mut own = Some(payload);
        let mut out = Vec::with_capacity(self.size());
        for from in 0..self.size() {
            if from == root {
                out.push(own.take().unwrap_or_default());
            } else {
                out.push(self.recv(from, seq, OpKind::Gather)?);
            }
        }
        debug!(target: "hodmock::comm", rank = self.rank, seq, parts = out.len(), "gather complete");
        Ok(Some(out))
    }

    fn scatter_bytes(&self, payloads: Option<Vec<Vec<u8>>>, root: Rank) -> Result<Vec<u8>> {
        self.check_root(root)?;
        let seq = self.next_seq();
        if self.rank != root {
            if payloads.is_some() {
                warn!(target: "hodmock::comm", rank = self.rank, "ignoring scatter payloads on non-root rank");
            }
            return self.recv(root, seq, OpKind::Scatter);
        }
        let payloads = payloads.ok_or_else(|| {
            Error::communication(format!("root rank {} has nothing to scatter", root))
        })?;
        if payloads.len() != self.size() {
            return Err(Error::communication(format!(
                "scatter needs {} payloads, root supplied {}",
                self.size(),
                payloads.len()
            )));
        }
        let mut own = Vec::new();
        for (to, bytes) in payloads.into_iter().enumerate() {
            if to == root {
                own = bytes;
            } else {
                self.send(to, seq, OpKind::Scatter, bytes)?;
            }
        }
        debug!(target: "hodmock::comm", rank = self.rank, seq, "scatter complete");
        Ok(own)
    }

    fn all_reduce_sum(&self, value: u64) -> Result<u64> {
        const ROOT: Rank = 0;
        let seq = self.next_seq();
        if self.rank != ROOT {
            self.send(ROOT, seq, OpKind::ReduceUp, value.to_le_bytes().to_vec())?;
            let bytes = self.recv(ROOT, seq, OpKind::ReduceDown)?;
            return decode_u64(&bytes);
        }
        let mut total = value;
        for from in 1..self.size() {
            let bytes = self.recv(from, seq, OpKind::ReduceUp)?;
            total = total
                .checked_add(decode_u64(&bytes)?)
                .ok_or_else(|| Error::communication("all-reduce sum overflowed"))?;
        }
        for to in 1..self.size() {
            self.send(to, seq, OpKind::ReduceDown, total.to_le_bytes().to_vec())?;
        }
        Ok(total)
    }
}

impl Drop for LocalComm {
    fn drop(&mut self) {
        self.shared.departed[self.rank].store(true, Ordering::SeqCst);
        // Take each lock before notifying so a waiter cannot miss the wakeup
        // between checking the flag and parking.
        for mailbox in &self.shared.mailboxes {
            let _guard = mailbox.queue.lock();
            mailbox.ready.notify_all();
        }
    }
}

fn decode_u64(bytes: &[u8]) -> Result<u64> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| Error::communication(format!("expected 8-byte reduction value, got {}", bytes.len())))?;
    Ok(u64::from_le_bytes(arr))
}
