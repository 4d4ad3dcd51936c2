//! Shared test utilities for all integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::{Arc, Once};
use std::thread;

pub use hodmock::{
    Column, ColumnData, Error, Generation, GalaxyCatalog, HaloCatalog, HaloSource, LocalCluster,
    LocalComm, ModelParameters, ModelProvider, Result, RowSet, Zheng07Provider,
};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once; filtered by `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Rank harness
// ============================================================================

/// Run `f` once per rank on its own thread and collect results in rank order.
pub fn run_ranks<T, F>(size: usize, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(LocalComm) -> T + Send + Sync + 'static,
{
    init_tracing();
    let f = Arc::new(f);
    let handles: Vec<_> = LocalCluster::new(size)
        .expect("cluster")
        .into_iter()
        .map(|comm| {
            let f = Arc::clone(&f);
            thread::spawn(move || f(comm))
        })
        .collect();
    handles
        .into_iter()
        .map(|h| h.join().expect("rank thread panicked"))
        .collect()
}

// ============================================================================
// Fixtures
// ============================================================================

/// Rows with a single `id` column holding `start..start + n`.
pub fn id_rows(start: i64, n: usize) -> RowSet {
    RowSet::new(vec![Column::new(
        "id",
        ColumnData::Int64((start..start + n as i64).collect()),
    )])
    .unwrap()
}

/// Halo rows for `rank`: `n` massive halos with distinct ids.
pub fn halo_rows(rank: usize, n: usize) -> RowSet {
    let f = |v: f64| ColumnData::Float64(vec![v; n]);
    let base = rank as i64 * 1_000;
    RowSet::new(vec![
        Column::new("halo_id", ColumnData::Int64((base..base + n as i64).collect())),
        Column::new("halo_mvir", f(2e15)),
        Column::new("halo_rvir", f(1.2)),
        Column::new("halo_x", f(10.0 + rank as f64)),
        Column::new("halo_y", f(20.0)),
        Column::new("halo_z", f(30.0)),
        Column::new("halo_vx", f(100.0)),
        Column::new("halo_vy", f(-50.0)),
        Column::new("halo_vz", f(0.0)),
        Column::new("halo_vrms", f(300.0)),
    ])
    .unwrap()
}

/// Halo source for `rank` in a 250 Mpc/h box.
pub fn halo_source(rank: usize, n: usize) -> Arc<dyn HaloSource> {
    Arc::new(HaloCatalog::cubic(halo_rows(rank, n), 250.0).unwrap())
}

/// Zheng07 reference parameters.
pub fn zheng07_params() -> ModelParameters {
    Zheng07Provider.default_parameters()
}

/// Populate a Zheng07 catalog with `n` halos per rank.
pub fn populate(comm: LocalComm, halos_per_rank: usize, seed: u64) -> Result<GalaxyCatalog<LocalComm>> {
    let rank = hodmock::Communicator::rank(&comm);
    GalaxyCatalog::<LocalComm>::builder()
        .params(zheng07_params())
        .seed(seed)
        .populate(comm, halo_source(rank, halos_per_rank), Arc::new(Zheng07Provider))
}
