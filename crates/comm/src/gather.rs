//! Gather-to-one
//!
//! [`Gatherer::gather`] collects every rank's local row set onto the
//! designated rank. Contributions are concatenated in increasing rank order
//! and each contribution keeps its own row order. Ranks contributing zero
//! rows are fine, including the designated rank itself.

use crate::communicator::Communicator;
use crate::wire::{decode_frame, encode_shard, Frame};
use hodmock_core::{Error, Rank, Result, RowSet};
use tracing::debug;

/// Collects row sets onto one rank
pub struct Gatherer<'c, C: Communicator + ?Sized> {
    comm: &'c C,
    root: Rank,
}

impl<'c, C: Communicator + ?Sized> Gatherer<'c, C> {
    /// Gather onto `root`
    pub fn new(comm: &'c C, root: Rank) -> Self {
        Self { comm, root }
    }

    /// Designated rank
    pub fn root(&self) -> Rank {
        self.root
    }

    /// Contribute `local` and, on the designated rank, receive the
    /// consolidated row set
    ///
    /// Returns `Some` on the designated rank and `None` everywhere else.
    ///
    /// # Errors
    ///
    /// - `Communication` if the collective cannot complete
    /// - `SchemaMismatch` (designated rank only) if contributions disagree
    ///   on their column layout
    pub fn gather(&self, local: &RowSet) -> Result<Option<RowSet>> {
        let payload = encode_shard(local)?;
        let Some(frames) = self.comm.gather_bytes(payload, self.root)? else {
            return Ok(None);
        };

        let mut parts = Vec::with_capacity(frames.len());
        for (rank, bytes) in frames.iter().enumerate() {
            match decode_frame(bytes)? {
                Frame::Shard(rows) => parts.push(rows),
                Frame::Abort(e) => {
                    return Err(Error::communication(format!(
                        "rank {} sent an abort frame during gather: {}",
                        rank, e
                    )))
                }
            }
        }
        drop(frames);

        let consolidated = RowSet::concat(parts)?;
        debug!(
            target: "hodmock::comm",
            rank = self.comm.rank(),
            rows = consolidated.num_rows(),
            columns = consolidated.num_columns(),
            "gathered consolidated row set"
        );
        Ok(Some(consolidated))
    }
}
