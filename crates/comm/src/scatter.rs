//! Scatter-evenly
//!
//! [`ScatterDistributor`] splits a consolidated row set held by the
//! designated rank into balanced contiguous blocks (see
//! [`crate::partition`]) and delivers one block to every rank. Every shard
//! carries the full column layout of the source, even when it has no rows.
//!
//! The designated rank may instead hold a *failure*. In that case every rank
//! receives an abort frame and returns the same error, so a transform that
//! fails on one rank surfaces everywhere instead of leaving the others
//! blocked in the collective.

use crate::communicator::Communicator;
use crate::partition::balanced_ranges;
use crate::wire::{decode_frame, encode_abort, encode_shard, Frame};
use hodmock_core::{Error, Rank, Result, RowSet};
use tracing::{debug, warn};

/// Distributes a consolidated row set across all ranks
pub struct ScatterDistributor<'c, C: Communicator + ?Sized> {
    comm: &'c C,
    root: Rank,
}

impl<'c, C: Communicator + ?Sized> ScatterDistributor<'c, C> {
    /// Scatter from `root`
    pub fn new(comm: &'c C, root: Rank) -> Self {
        Self { comm, root }
    }

    /// Designated rank
    pub fn root(&self) -> Rank {
        self.root
    }

    /// Deliver each rank its balanced share of `source`
    ///
    /// `source` is `Some` on the designated rank and `None` elsewhere.
    pub fn scatter(&self, source: Option<RowSet>) -> Result<RowSet> {
        self.distribute(source.map(Ok))
    }

    /// Deliver each rank its balanced share of a designated-rank outcome
    ///
    /// On the designated rank `Some(Err(e))` sends abort frames, and every
    /// rank returns `Err(e)`.
    ///
    /// A designated rank holding `None` scatters an empty row set; a
    /// non-designated rank holding `Some` has its value ignored. Both keep
    /// the collective matched rather than leaving peers blocked.
    pub fn distribute(&self, outcome: Option<Result<RowSet>>) -> Result<RowSet> {
        if !self.comm.is_root(self.root) {
            if outcome.is_some() {
                warn!(
                    target: "hodmock::comm",
                    rank = self.comm.rank(),
                    root = self.root,
                    "ignoring scatter source held by a non-designated rank"
                );
            }
            let bytes = self.comm.scatter_bytes(None, self.root)?;
            return match decode_frame(&bytes)? {
                Frame::Shard(rows) => Ok(rows),
                Frame::Abort(e) => Err(e),
            };
        }

        let outcome = match outcome {
            Some(outcome) => outcome,
            None => {
                warn!(target: "hodmock::comm", rank = self.comm.rank(), "designated rank has no scatter source; scattering empty rows");
                Ok(RowSet::empty())
            }
        };
        let outcome = outcome.and_then(|rows| {
            let variants = rows.variant_columns();
            if variants.is_empty() {
                Ok(rows)
            } else {
                Err(Error::schema_mismatch(format!(
                    "cannot scatter non-portable columns {:?}",
                    variants
                )))
            }
        });

        match outcome {
            Ok(rows) => {
                let size = self.comm.size();
                let frames = balanced_ranges(rows.num_rows(), size)
                    .into_iter()
                    .map(|range| encode_shard(&rows.slice(range)))
                    .collect::<Result<Vec<_>>>()?;
                debug!(
                    target: "hodmock::comm",
                    rank = self.comm.rank(),
                    rows = rows.num_rows(),
                    ranks = size,
                    "scattering consolidated row set"
                );
                drop(rows);
                let own = self.comm.scatter_bytes(Some(frames), self.root)?;
                match decode_frame(&own)? {
                    Frame::Shard(rows) => Ok(rows),
                    Frame::Abort(e) => Err(e),
                }
            }
            Err(e) => {
                let frame = encode_abort(&e)?;
                let frames = vec![frame; self.comm.size()];
                self.comm.scatter_bytes(Some(frames), self.root)?;
                Err(e)
            }
        }
    }
}
