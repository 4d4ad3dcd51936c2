//! Designated-rank transform execution
//!
//! [`TransformInvoker`] drives one occupation model call:
//! 1. bind parameters onto the model's store
//! 2. normalize variant columns of the input to fixed-width text
//! 3. populate (or repopulate) from the normalized halo table
//! 4. normalize the output the same way
//!
//! The parameter store is cleared after every call, successful or not, so
//! no bound state outlives the cycle.

use hodmock_core::{Error, ModelParameters, Result, RowSet};
use hodmock_model::{HaloTable, ModelError, OccupationModel, PopulateRequest};
use tracing::debug;

/// Which model entry point a transform uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    /// Initial population with a minimum particle requirement
    Populate {
        /// Halos with fewer particles are skipped
        min_particles: u64,
    },
    /// Re-population of an existing catalog
    Repopulate,
}

/// Inputs of one transform besides the halo rows
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    /// Parameters bound for this call only
    pub params: &'a ModelParameters,
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Halo mass column
    pub mass_key: &'a str,
    /// Model entry point
    pub mode: TransformMode,
}

/// Map a model failure into the population error taxonomy
pub fn model_error(model: &str, e: ModelError) -> Error {
    match e {
        ModelError::UnknownParameter { name, valid, .. } => Error::UnknownParameter { name, valid },
        other => Error::Transform {
            model: model.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Runs an occupation model on consolidated halo rows
pub struct TransformInvoker<'m> {
    model: &'m mut dyn OccupationModel,
}

impl<'m> TransformInvoker<'m> {
    /// Invoker over `model`
    pub fn new(model: &'m mut dyn OccupationModel) -> Self {
        Self { model }
    }

    /// Transform `halos` into galaxy rows
    ///
    /// Consumes the halo rows; they are released before this returns.
    pub fn invoke(&mut self, halos: RowSet, request: TransformRequest<'_>) -> Result<RowSet> {
        let result = self.run(halos, request);
        self.model.clear_parameters();
        result
    }

    fn run(&mut self, halos: RowSet, request: TransformRequest<'_>) -> Result<RowSet> {
        let name = self.model.name().to_string();
        self.model
            .bind_parameters(request.params)
            .map_err(|e| model_error(&name, e))?;

        let table = HaloTable::new(halos.normalize_variants()).map_err(|e| model_error(&name, e))?;
        debug!(
            target: "hodmock::populate",
            model = %name,
            halos = table.len(),
            seed = ?request.seed,
            "invoking transform"
        );

        let output = match request.mode {
            TransformMode::Populate { min_particles } => self.model.populate(
                &table,
                PopulateRequest {
                    seed: request.seed,
                    min_particles,
                    mass_key: request.mass_key,
                },
            ),
            TransformMode::Repopulate => {
                self.model
                    .repopulate(&table, request.seed, request.mass_key)
            }
        }
        .map_err(|e| model_error(&name, e))?;
        drop(table);

        Ok(output.normalize_variants())
    }
}
