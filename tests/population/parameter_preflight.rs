//! Parameter validation happens before any collective runs.

use crate::common::*;
use hodmock::{CatalogBuilder, LocalCluster, PopulationConfig};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn missing_parameter_named_exactly() {
    for dropped in ["logMmin", "sigma_logM", "alpha", "logM0", "logM1"] {
        let results = run_ranks(3, move |comm| {
            let rank = hodmock::Communicator::rank(&comm);
            let mut params = ModelParameters::new();
            for (name, value) in zheng07_params().iter().filter(|(n, _)| *n != dropped) {
                params.insert(name, value);
            }
            GalaxyCatalog::<LocalComm>::builder()
                .params(params)
                .populate(comm, halo_source(rank, 2), Arc::new(Zheng07Provider))
                .map(|c| c.generation())
        });
        for result in results {
            assert_eq!(
                result.unwrap_err(),
                Error::MissingParameter {
                    name: dropped.to_string()
                }
            );
        }
    }
}

#[test]
fn preflight_needs_no_peer() {
    // a lone rank of a two-rank group fails fast instead of waiting on its peer
    let mut comms = LocalCluster::with_timeout(2, Duration::from_secs(30)).unwrap();
    let comm = comms.remove(0);
    let err = GalaxyCatalog::<LocalComm>::builder()
        .params(ModelParameters::new().with("alpha", 1.0))
        .populate(comm, halo_source(0, 1), Arc::new(Zheng07Provider))
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter { .. }));
    assert!(err.is_configuration());
    drop(comms);
}

#[test]
fn invalid_config_rejected_before_population() {
    let config = PopulationConfig {
        record_statistics: true,
        statistics_category_column: String::new(),
        ..PopulationConfig::default()
    };
    let comm = LocalCluster::new(1).unwrap().remove(0);
    let err = CatalogBuilder::from_config(config)
        .params(zheng07_params())
        .populate(comm, halo_source(0, 1), Arc::new(Zheng07Provider))
        .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}
