//! Galaxy catalog state
//!
//! A [`GalaxyCatalog`] is created populated: [`CatalogBuilder::populate`]
//! validates parameters, builds the model and runs the first cycle. After
//! that the only transition is a repopulation, which replaces the shard
//! and bumps the generation (see [`crate::repopulate`]).
//!
//! # Example
//!
//! ```ignore
//! let catalog = GalaxyCatalog::builder()
//!     .params(Zheng07Provider.default_parameters())
//!     .seed(42)
//!     .mdef(MassDefinition::Critical(200))
//!     .populate(comm, halos, Arc::new(Zheng07Provider))?;
//! let position = catalog.position()?;
//! ```

use crate::config::{CatalogConfig, PopulationConfig};
use crate::coordinator::{CycleMetrics, PopulatedShard, PopulationCoordinator};
use crate::derived::DerivedColumnEngine;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::invoker::{model_error, TransformMode, TransformRequest};
use crate::stats::StatisticsRecorder;
use hodmock_comm::Communicator;
use hodmock_core::{Generation, ModelParameters, Rank, Result, RowSet};
use hodmock_model::{HaloSource, MassDefinition, ModelAttrs, ModelProvider, OccupationModel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Attributes
// ============================================================================

/// Attributes consulted by every population cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogAttrs {
    /// Periodic box side lengths, read once from the halo source
    pub box_size: [f64; 3],
    /// Halo mass definition
    pub mdef: MassDefinition,
    /// Redshift of the halo catalog
    pub redshift: f64,
    /// Redshift-space distortion direction
    pub rsd: [f64; 3],
    /// Seed of the installed generation
    pub seed: Option<u64>,
    /// Model parameters of the installed generation
    pub params: ModelParameters,
}

// ============================================================================
// Builder
// ============================================================================

/// Collects catalog attributes, then runs the initial population
pub struct CatalogBuilder {
    catalog: CatalogConfig,
    config: PopulationConfig,
    inherited_columns: Vec<String>,
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl CatalogBuilder {
    /// Builder with default configuration
    pub fn new() -> Self {
        Self::from_config(PopulationConfig::default())
    }

    /// Builder seeded from a loaded configuration
    ///
    /// The `[catalog]` section, if present, supplies the initial attributes.
    pub fn from_config(mut config: PopulationConfig) -> Self {
        let catalog = config.catalog.take().unwrap_or_default();
        Self {
            catalog,
            config,
            inherited_columns: Vec::new(),
            sink: None,
        }
    }

    /// Replace all model parameters
    pub fn params(mut self, params: ModelParameters) -> Self {
        self.catalog.params = params;
        self
    }

    /// Set one model parameter
    pub fn param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.catalog.params.insert(name, value);
        self
    }

    /// Fixed RNG seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.catalog.seed = Some(seed);
        self
    }

    /// Halo mass definition
    pub fn mdef(mut self, mdef: MassDefinition) -> Self {
        self.catalog.mdef = mdef;
        self
    }

    /// Redshift of the halo catalog
    pub fn redshift(mut self, redshift: f64) -> Self {
        self.catalog.redshift = redshift;
        self
    }

    /// Redshift-space distortion direction
    pub fn rsd(mut self, rsd: [f64; 3]) -> Self {
        self.catalog.rsd = rsd;
        self
    }

    /// Rank that runs the transform
    pub fn designated_rank(mut self, rank: Rank) -> Self {
        self.config.designated_rank = rank;
        self
    }

    /// Minimum halo particle count for the initial population
    pub fn min_particles(mut self, min_particles: u64) -> Self {
        self.config.min_particles = min_particles;
        self
    }

    /// Halo columns to propagate onto galaxies; empty means all of them
    pub fn inherited_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.inherited_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sink for population statistics; defaults to [`TracingSink`]
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validate, build the model and run the initial population
    ///
    /// Collective: every rank must call this. Parameter errors are raised
    /// before any communication, identically on every rank.
    ///
    /// # Errors
    ///
    /// - `MissingParameter` naming the first required parameter absent
    /// - `UnknownParameter` for a name the model does not recognize
    /// - `Config` for invalid attribute values
    /// - any cycle error (see [`PopulationCoordinator::run`])
    pub fn populate<C: Communicator>(
        self,
        comm: C,
        halos: Arc<dyn HaloSource>,
        provider: Arc<dyn ModelProvider>,
    ) -> Result<GalaxyCatalog<C>> {
        let CatalogBuilder {
            catalog,
            config,
            inherited_columns,
            sink,
        } = self;

        config.validate()?;
        catalog.validate()?;
        catalog
            .params
            .require_all(provider.parameter_names().iter().copied())?;
        catalog.params.reject_unknown(provider.parameter_names())?;

        let attrs = CatalogAttrs {
            box_size: halos.box_size(),
            mdef: catalog.mdef,
            redshift: catalog.redshift,
            rsd: catalog.rsd,
            seed: catalog.seed,
            params: catalog.params,
        };
        let model = provider
            .make_model(&ModelAttrs {
                mass_def: attrs.mdef,
                redshift: attrs.redshift,
                box_size: attrs.box_size,
                inherited_columns,
            })
            .map_err(|e| model_error(provider.name(), e))?;

        let mut coordinator = PopulationCoordinator::new(config.designated_rank);
        if config.record_statistics {
            let sink: Arc<dyn DiagnosticSink> = match sink {
                Some(sink) => sink,
                None => Arc::new(TracingSink),
            };
            coordinator = coordinator.with_statistics(StatisticsRecorder::new(
                sink,
                config.statistics_category_column.clone(),
                config.statistics_category.clone(),
            ));
        }

        let mut catalog = GalaxyCatalog {
            comm,
            halos,
            provider,
            model,
            coordinator,
            mass_key: attrs.mdef.mass_key(),
            attrs,
            shard: RowSet::empty(),
            generation: Generation::UNPOPULATED,
            csize: 0,
            min_particles: config.min_particles,
        };

        let params = catalog.attrs.params.clone();
        let seed = catalog.attrs.seed;
        let mode = TransformMode::Populate {
            min_particles: catalog.min_particles,
        };
        let populated = catalog.run_cycle(&params, seed, mode)?;
        catalog.install(populated, seed, params);

        info!(
            target: "hodmock::catalog",
            rank = catalog.comm.rank(),
            model = catalog.provider.name(),
            mdef = %catalog.attrs.mdef,
            rows = catalog.shard.num_rows(),
            csize = catalog.csize,
            "catalog populated"
        );
        Ok(catalog)
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// One rank's view of a populated galaxy catalog
pub struct GalaxyCatalog<C: Communicator> {
    comm: C,
    halos: Arc<dyn HaloSource>,
    provider: Arc<dyn ModelProvider>,
    model: Box<dyn OccupationModel>,
    coordinator: PopulationCoordinator,
    attrs: CatalogAttrs,
    mass_key: String,
    shard: RowSet,
    generation: Generation,
    csize: u64,
    min_particles: u64,
}

impl<C: Communicator> GalaxyCatalog<C> {
    /// Start building a catalog
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Rows owned by this rank
    pub fn shard(&self) -> &RowSet {
        &self.shard
    }

    /// Generation of the installed shard
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Local row count
    pub fn size(&self) -> usize {
        self.shard.num_rows()
    }

    /// Row count across all ranks
    pub fn csize(&self) -> u64 {
        self.csize
    }

    /// Catalog attributes of the installed generation
    pub fn attrs(&self) -> &CatalogAttrs {
        &self.attrs
    }

    /// Halo column holding halo mass
    pub fn mass_key(&self) -> &str {
        &self.mass_key
    }

    /// This rank
    pub fn rank(&self) -> Rank {
        self.comm.rank()
    }

    /// Communicator the catalog runs its collectives on
    pub fn comm(&self) -> &C {
        &self.comm
    }

    /// Model provider
    pub fn provider(&self) -> &dyn ModelProvider {
        self.provider.as_ref()
    }

    /// Population cycle counters
    pub fn metrics(&self) -> CycleMetrics {
        self.coordinator.metrics()
    }

    /// Per-row `(x, y, z)` of this rank's shard
    pub fn position(&self) -> Result<Vec<[f64; 3]>> {
        DerivedColumnEngine.position(&self.shard)
    }

    /// Per-row `(vx, vy, vz)` of this rank's shard
    pub fn velocity(&self) -> Result<Vec<[f64; 3]>> {
        DerivedColumnEngine.velocity(&self.shard)
    }

    pub(crate) fn run_cycle(
        &mut self,
        params: &ModelParameters,
        seed: Option<u64>,
        mode: TransformMode,
    ) -> Result<PopulatedShard> {
        let request = TransformRequest {
            params,
            seed,
            mass_key: &self.mass_key,
            mode,
        };
        self.coordinator.run(
            &self.comm,
            self.halos.halos(),
            self.model.as_mut(),
            request,
            self.generation.next(),
        )
    }

    pub(crate) fn install(&mut self, populated: PopulatedShard, seed: Option<u64>, params: ModelParameters) {
        self.shard = populated.rows;
        self.csize = populated.total_rows;
        self.generation = self.generation.next();
        self.attrs.seed = seed;
        self.attrs.params = params;
    }
}

impl<C: Communicator> std::fmt::Debug for GalaxyCatalog<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalaxyCatalog")
            .field("rank", &self.comm.rank())
            .field("model", &self.provider.name())
            .field("generation", &self.generation)
            .field("size", &self.size())
            .field("csize", &self.csize)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use hodmock_comm::{LocalCluster, LocalComm};
    use hodmock_core::{Column, ColumnData, Error};
    use hodmock_model::{HaloCatalog, Zheng07Provider};

    fn halo_source(n: usize) -> Arc<dyn HaloSource> {
        let f = |v: f64| ColumnData::Float64(vec![v; n]);
        let rows = RowSet::new(vec![
            Column::new("halo_mvir", f(3e15)),
            Column::new("halo_rvir", f(1.0)),
            Column::new("halo_x", f(10.0)),
            Column::new("halo_y", f(20.0)),
            Column::new("halo_z", f(30.0)),
            Column::new("halo_vx", f(0.0)),
            Column::new("halo_vy", f(0.0)),
            Column::new("halo_vz", f(0.0)),
        ])
        .unwrap();
        Arc::new(HaloCatalog::cubic(rows, 100.0).unwrap())
    }

    fn single() -> LocalComm {
        LocalCluster::new(1).unwrap().remove(0)
    }

    #[test]
    fn test_populate_single_rank() {
        let sink = Arc::new(MemorySink::new());
        let catalog = GalaxyCatalog::<LocalComm>::builder()
            .params(Zheng07Provider.default_parameters())
            .seed(3)
            .diagnostics(sink.clone())
            .populate(single(), halo_source(4), Arc::new(Zheng07Provider))
            .unwrap();

        assert_eq!(catalog.generation(), Generation::new(1));
        assert_eq!(catalog.size() as u64, catalog.csize());
        assert!(catalog.size() >= 4);
        assert_eq!(catalog.attrs().box_size, [100.0; 3]);
        assert_eq!(catalog.attrs().seed, Some(3));
        assert_eq!(catalog.mass_key(), "halo_mvir");
        assert_eq!(catalog.position().unwrap().len(), catalog.size());
        assert!(sink.lines()[0].starts_with("satellites fraction"));
    }

    #[test]
    fn test_missing_parameter_rejected_before_population() {
        let params = Zheng07Provider.default_parameters();
        let mut partial = ModelParameters::new();
        for (name, value) in params.iter().filter(|(n, _)| *n != "alpha") {
            partial.insert(name, value);
        }
        let err = GalaxyCatalog::<LocalComm>::builder()
            .params(partial)
            .populate(single(), halo_source(1), Arc::new(Zheng07Provider))
            .unwrap_err();
        assert_eq!(
            err,
            Error::MissingParameter {
                name: "alpha".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_parameter_rejected_at_construction() {
        let err = GalaxyCatalog::<LocalComm>::builder()
            .params(Zheng07Provider.default_parameters())
            .param("not_a_param", 1.0)
            .populate(single(), halo_source(1), Arc::new(Zheng07Provider))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownParameter { .. }));
    }

    #[test]
    fn test_construction_from_config_section() {
        let config: PopulationConfig = toml::from_str(
            r#"
record_statistics = false

[catalog]
seed = 11

[catalog.params]
logMmin = 13.031
sigma_logM = 0.38
alpha = 0.76
logM0 = 13.27
logM1 = 14.08
"#,
        )
        .unwrap();
        let catalog = CatalogBuilder::from_config(config)
            .populate(single(), halo_source(2), Arc::new(Zheng07Provider))
            .unwrap();
        assert_eq!(catalog.attrs().seed, Some(11));
        assert_eq!(catalog.metrics().completed, 1);
    }

    #[test]
    fn test_zero_halos_is_empty_result() {
        let err = GalaxyCatalog::<LocalComm>::builder()
            .params(Zheng07Provider.default_parameters())
            .populate(single(), halo_source(0), Arc::new(Zheng07Provider))
            .unwrap_err();
        assert_eq!(err, Error::EmptyResult { generation: 1 });
    }
}
