//! Occupation model capability interfaces
//!
//! A [`ModelProvider`] is a factory: given the catalog's attributes it builds
//! an [`OccupationModel`]. The provider declares its parameter names up
//! front so every rank can validate parameters before any collective runs,
//! even though only the designated rank ever calls into the model.

use crate::error::ModelResult;
use crate::halo::HaloTable;
use crate::mdef::MassDefinition;
use hodmock_core::{ModelParameters, RowSet};

/// Catalog attributes a model is built from
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAttrs {
    /// Halo boundary convention
    pub mass_def: MassDefinition,
    /// Redshift the catalog is populated at
    pub redshift: f64,
    /// Periodic box side lengths
    pub box_size: [f64; 3],
    /// Halo columns propagated onto every galaxy
    pub inherited_columns: Vec<String>,
}

/// Arguments of one population call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulateRequest<'a> {
    /// RNG seed; `None` draws one from entropy
    pub seed: Option<u64>,
    /// Halos with fewer particles than this are skipped
    pub min_particles: u64,
    /// Halo table column holding halo mass
    pub mass_key: &'a str,
}

/// Builds occupation models
pub trait ModelProvider: Send + Sync {
    /// Short model name used in logs and errors
    fn name(&self) -> &str;

    /// Every parameter the model recognizes; all are required
    fn parameter_names(&self) -> &[&'static str];

    /// Reference parameter values
    fn default_parameters(&self) -> ModelParameters;

    /// Build a model for a catalog
    fn make_model(&self, attrs: &ModelAttrs) -> ModelResult<Box<dyn OccupationModel>>;
}

/// A model that turns halos into galaxies
pub trait OccupationModel: Send {
    /// Short model name used in logs and errors
    fn name(&self) -> &str;

    /// Every parameter the model recognizes
    fn parameter_names(&self) -> &[&'static str];

    /// Bind values onto the parameter store
    ///
    /// Fails on the first name the model does not recognize; nothing is
    /// bound in that case.
    fn bind_parameters(&mut self, params: &ModelParameters) -> ModelResult<()>;

    /// Drop every bound value
    fn clear_parameters(&mut self);

    /// Full population from a fresh halo table
    fn populate(&mut self, halos: &HaloTable, request: PopulateRequest<'_>) -> ModelResult<RowSet>;

    /// Re-population with new parameters or a new seed
    ///
    /// The default runs a full population with a one-particle minimum.
    fn repopulate(
        &mut self,
        halos: &HaloTable,
        seed: Option<u64>,
        mass_key: &str,
    ) -> ModelResult<RowSet> {
        self.populate(
            halos,
            PopulateRequest {
                seed,
                min_particles: 1,
                mass_key,
            },
        )
    }
}
