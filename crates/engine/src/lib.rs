//! Population engine for hodmock
//!
//! This crate composes the lower layers into galaxy catalogs:
//! - GalaxyCatalog: per-rank catalog state (shard, generation, attributes)
//! - PopulationCoordinator: gather, transform, scatter, row-count check
//! - TransformInvoker: designated-rank model invocation
//! - RepopulationController: in-place `Populated → Populated` transition
//! - DerivedColumnEngine: position and velocity vectors on demand
//! - Statistics and diagnostics sinks
//! - PopulationConfig: `hodmock.toml`
//!
//! Every rank runs the same sequence of catalog calls. Only the designated
//! rank ever touches the occupation model.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod derived;
pub mod diagnostics;
pub mod invoker;
pub mod repopulate;
pub mod stats;

pub use catalog::{CatalogAttrs, CatalogBuilder, GalaxyCatalog};
pub use config::{CatalogConfig, PopulationConfig, CONFIG_FILE_NAME};
pub use coordinator::{CycleMetrics, PopulatedShard, PopulationCoordinator};
pub use derived::DerivedColumnEngine;
pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink};
pub use invoker::{TransformInvoker, TransformMode, TransformRequest};
pub use repopulate::RepopulationController;
pub use stats::{PopulationStats, StatisticsRecorder};
