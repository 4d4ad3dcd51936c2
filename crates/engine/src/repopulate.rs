//! In-place repopulation
//!
//! [`RepopulationController`] moves a catalog from one populated generation
//! to the next. Supplied parameter names are checked against the model's
//! declared names before any communication. Everything else about the
//! cycle matches the initial population, except that the full required-
//! parameter check is skipped and the model's repopulate entry point is
//! used.
//!
//! Nothing on the catalog changes unless the cycle succeeds: shard,
//! generation, seed and parameters are replaced together.

use crate::catalog::GalaxyCatalog;
use crate::invoker::TransformMode;
use hodmock_comm::Communicator;
use hodmock_core::{Generation, ModelParameters, Result};
use tracing::info;

/// Drives repopulation of one catalog
pub struct RepopulationController<'a, C: Communicator> {
    catalog: &'a mut GalaxyCatalog<C>,
}

impl<'a, C: Communicator> RepopulationController<'a, C> {
    /// Controller over `catalog`
    pub fn new(catalog: &'a mut GalaxyCatalog<C>) -> Self {
        Self { catalog }
    }

    /// Repopulate with a new seed and updated parameters
    ///
    /// `params` holds only the names to change; the rest keep their
    /// installed values. A `None` seed draws one from entropy.
    ///
    /// Collective: every rank must call this with the same arguments.
    ///
    /// # Errors
    ///
    /// - `UnknownParameter`, before any communication
    /// - any cycle error (see [`crate::PopulationCoordinator::run`])
    ///
    /// On error the catalog is unchanged.
    pub fn repopulate(self, seed: Option<u64>, params: &ModelParameters) -> Result<Generation> {
        params.reject_unknown(self.catalog.provider().parameter_names())?;

        let mut merged = self.catalog.attrs().params.clone();
        merged.merge(params);

        let populated = self
            .catalog
            .run_cycle(&merged, seed, TransformMode::Repopulate)?;
        self.catalog.install(populated, seed, merged);

        info!(
            target: "hodmock::catalog",
            rank = self.catalog.rank(),
            generation = %self.catalog.generation(),
            rows = self.catalog.size(),
            csize = self.catalog.csize(),
            "catalog repopulated"
        );
        Ok(self.catalog.generation())
    }
}

impl<C: Communicator> GalaxyCatalog<C> {
    /// Repopulate in place; see [`RepopulationController::repopulate`]
    pub fn repopulate(&mut self, seed: Option<u64>, params: &ModelParameters) -> Result<Generation> {
        RepopulationController::new(self).repopulate(seed, params)
    }
}
