//! Collective communication interface
//!
//! Every method on [`Communicator`] is a *collective*: all ranks in the group
//! must call the same method, with the same root, the same number of times
//! and in the same order. A rank that diverges leaves the others blocked
//! (or, with a transport timeout, failing with a communication error).
//! Divergence is a programming error, never a recoverable fault.

use hodmock_core::{Error, Rank, Result};

/// Byte-level collectives over a fixed group of ranks
pub trait Communicator: Send {
    /// This participant's rank, `0..size()`
    fn rank(&self) -> Rank;

    /// Number of ranks in the group
    fn size(&self) -> usize;

    /// Collect one payload from every rank onto `root`
    ///
    /// Returns `Some(payloads)` on `root`, indexed by rank, and `None`
    /// everywhere else.
    fn gather_bytes(&self, payload: Vec<u8>, root: Rank) -> Result<Option<Vec<Vec<u8>>>>;

    /// Deliver one payload from `root` to every rank
    ///
    /// `root` supplies exactly `size()` payloads, indexed by destination
    /// rank; every other rank supplies `None`. Each rank returns its own
    /// payload.
    fn scatter_bytes(&self, payloads: Option<Vec<Vec<u8>>>, root: Rank) -> Result<Vec<u8>>;

    /// Sum a value across all ranks; every rank receives the total
    fn all_reduce_sum(&self, value: u64) -> Result<u64>;

    /// True if this rank is `root`
    fn is_root(&self, root: Rank) -> bool {
        self.rank() == root
    }

    /// Fail unless `root` names a rank in the group
    fn check_root(&self, root: Rank) -> Result<()> {
        if root >= self.size() {
            return Err(Error::invalid_input(format!(
                "designated rank {} is outside a group of {} ranks",
                root,
                self.size()
            )));
        }
        Ok(())
    }
}

impl<C: Communicator + ?Sized> Communicator for Box<C> {
    fn rank(&self) -> Rank {
        (**self).rank()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn gather_bytes(&self, payload: Vec<u8>, root: Rank) -> Result<Option<Vec<Vec<u8>>>> {
        (**self).gather_bytes(payload, root)
    }

    fn scatter_bytes(&self, payloads: Option<Vec<Vec<u8>>>, root: Rank) -> Result<Vec<u8>> {
        (**self).scatter_bytes(payloads, root)
    }

    fn all_reduce_sum(&self, value: u64) -> Result<u64> {
        (**self).all_reduce_sum(value)
    }
}
