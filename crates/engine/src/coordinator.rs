//! Population cycle coordination
//!
//! One cycle composes, in this fixed order:
//! - gather every rank's halo rows onto the designated rank
//! - transform them there ([`TransformInvoker`])
//! - scatter the transform output evenly back to every rank
//! - sum the new shard sizes across ranks; a zero total fails the cycle
//!
//! A failure on the designated rank between gather and scatter travels to
//! every rank through the scatter as an abort, so all ranks return the same
//! error from the same cycle.
//!
//! The coordinator never installs anything. The caller decides what to do
//! with a [`PopulatedShard`], which keeps a failed cycle from touching the
//! catalog's current state.

use crate::invoker::{TransformInvoker, TransformRequest};
use crate::stats::StatisticsRecorder;
use hodmock_comm::{Communicator, Gatherer, ScatterDistributor};
use hodmock_core::{Error, Generation, Rank, Result, RowSet};
use hodmock_model::OccupationModel;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// This rank's share of a successful cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedShard {
    /// Rows now owned by this rank
    pub rows: RowSet,
    /// Row count summed over every rank
    pub total_rows: u64,
}

/// Runs population cycles from a fixed designated rank
///
/// The cycle counters are observational only and use Relaxed ordering.
pub struct PopulationCoordinator {
    root: Rank,
    recorder: Option<StatisticsRecorder>,
    cycles_started: AtomicU64,
    cycles_completed: AtomicU64,
    cycles_failed: AtomicU64,
}

impl PopulationCoordinator {
    /// Coordinator transforming on `root`
    pub fn new(root: Rank) -> Self {
        Self {
            root,
            recorder: None,
            cycles_started: AtomicU64::new(0),
            cycles_completed: AtomicU64::new(0),
            cycles_failed: AtomicU64::new(0),
        }
    }

    /// Record summary statistics of every transform output
    pub fn with_statistics(mut self, recorder: StatisticsRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Designated rank
    pub fn root(&self) -> Rank {
        self.root
    }

    /// Run one gather/transform/scatter cycle
    ///
    /// Collective: every rank must call this with the same `root` and
    /// `next`. `model` is only touched on the designated rank.
    ///
    /// # Errors
    ///
    /// - `EmptyResult` if no rank ends up with any row
    /// - the transform's error, on every rank, if it fails
    /// - `Communication` if the collective itself fails
    pub fn run<C: Communicator + ?Sized>(
        &self,
        comm: &C,
        local: &RowSet,
        model: &mut dyn OccupationModel,
        request: TransformRequest<'_>,
        next: Generation,
    ) -> Result<PopulatedShard> {
        self.cycles_started.fetch_add(1, Ordering::Relaxed);
        let result = self.cycle(comm, local, model, request, next);
        match &result {
            Ok(shard) => {
                self.cycles_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    target: "hodmock::populate",
                    rank = comm.rank(),
                    generation = %next,
                    rows = shard.rows.num_rows(),
                    total = shard.total_rows,
                    "cycle complete"
                );
            }
            Err(e) => {
                self.cycles_failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    target: "hodmock::populate",
                    rank = comm.rank(),
                    generation = %next,
                    error = %e,
                    "cycle failed"
                );
            }
        }
        result
    }

    fn cycle<C: Communicator + ?Sized>(
        &self,
        comm: &C,
        local: &RowSet,
        model: &mut dyn OccupationModel,
        request: TransformRequest<'_>,
        next: Generation,
    ) -> Result<PopulatedShard> {
        comm.check_root(self.root)?;

        let outcome = match Gatherer::new(comm, self.root).gather(local) {
            Ok(Some(halos)) => Some(self.transform(halos, model, request)),
            Ok(None) => None,
            // the peers are already waiting in the scatter
            Err(e) if comm.is_root(self.root) => Some(Err(e)),
            Err(e) => return Err(e),
        };

        let rows = ScatterDistributor::new(comm, self.root).distribute(outcome)?;
        let total_rows = comm.all_reduce_sum(rows.num_rows() as u64)?;
        if total_rows == 0 {
            return Err(Error::EmptyResult {
                generation: next.as_u64(),
            });
        }
        Ok(PopulatedShard { rows, total_rows })
    }

    fn transform(
        &self,
        halos: RowSet,
        model: &mut dyn OccupationModel,
        request: TransformRequest<'_>,
    ) -> Result<RowSet> {
        let num_halos = halos.num_rows();
        let galaxies = TransformInvoker::new(model).invoke(halos, request)?;
        info!(
            target: "hodmock::populate",
            halos = num_halos,
            galaxies = galaxies.num_rows(),
            "transform produced galaxies"
        );
        if let Some(recorder) = &self.recorder {
            recorder.record(&galaxies, request.mass_key);
        }
        Ok(galaxies)
    }

    /// Snapshot of the cycle counters
    pub fn metrics(&self) -> CycleMetrics {
        CycleMetrics {
            started: self.cycles_started.load(Ordering::Relaxed),
            completed: self.cycles_completed.load(Ordering::Relaxed),
            failed: self.cycles_failed.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for PopulationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopulationCoordinator")
            .field("root", &self.root)
            .field("metrics", &self.metrics())
            .finish()
    }
}

/// Population cycle counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleMetrics {
    /// Cycles entered
    pub started: u64,
    /// Cycles that produced rows
    pub completed: u64,
    /// Cycles that returned an error
    pub failed: u64,
}
