//! Failures on the designated rank surface on every rank.

use crate::common::*;
use hodmock::{LocalCluster, MassDefinition, ScatterDistributor};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn transform_error_reaches_every_rank() {
    // halo_rows carries halo_mvir, so a 200c catalog has no mass column
    let results = run_ranks(4, |comm| {
        let rank = hodmock::Communicator::rank(&comm);
        GalaxyCatalog::<LocalComm>::builder()
            .params(zheng07_params())
            .mdef(MassDefinition::Critical(200))
            .designated_rank(1)
            .populate(comm, halo_source(rank, 2), Arc::new(Zheng07Provider))
            .map(|c| c.generation())
    });
    let first = results[0].clone().unwrap_err();
    match &first {
        Error::Transform { model, reason } => {
            assert_eq!(model, "zheng07");
            assert!(reason.contains("halo_m200c"));
        }
        other => panic!("expected transform error, got {other:?}"),
    }
    for result in results {
        assert_eq!(result.unwrap_err(), first);
    }
}

#[test]
fn rejected_parameters_fail_repopulation_everywhere() {
    let updates = [
        ModelParameters::new().with("sigma_logM", -1.0),
        ModelParameters::new().with("logM1", -400.0),
        ModelParameters::new().with("logM1", 0.0),
        ModelParameters::new().with("alpha", f64::NAN),
    ];
    let results = run_ranks(3, move |comm| {
        let mut catalog = populate(comm, 3, 21).unwrap();
        let shard = catalog.shard().clone();
        let params = catalog.attrs().params.clone();

        let mut errors = Vec::new();
        for (i, update) in updates.iter().enumerate() {
            errors.push(catalog.repopulate(Some(30 + i as u64), update).unwrap_err());
            assert_eq!(catalog.generation(), Generation::new(1));
            assert_eq!(catalog.shard(), &shard);
            assert_eq!(catalog.attrs().params, params);
        }

        // the group is still in step afterwards
        let generation = catalog.repopulate(Some(40), &ModelParameters::new()).unwrap();
        (errors, generation)
    });

    let (first, _) = &results[0];
    for error in first {
        assert!(matches!(error, Error::Transform { model, .. } if model == "zheng07"));
    }
    for (errors, generation) in &results {
        assert_eq!(errors, first);
        assert_eq!(*generation, Generation::new(2));
    }
}

#[test]
fn no_halos_anywhere_is_empty_result() {
    let results = run_ranks(3, |comm| populate(comm, 0, 1).map(|c| c.csize()));
    for result in results {
        assert_eq!(result.unwrap_err(), Error::EmptyResult { generation: 1 });
    }
}

#[test]
fn designated_rank_outside_group_is_rejected_everywhere() {
    let results = run_ranks(2, |comm| {
        let rank = hodmock::Communicator::rank(&comm);
        GalaxyCatalog::<LocalComm>::builder()
            .params(zheng07_params())
            .designated_rank(7)
            .populate(comm, halo_source(rank, 1), Arc::new(Zheng07Provider))
            .map(|c| c.size())
    });
    for result in results {
        assert!(matches!(result.unwrap_err(), Error::InvalidInput { .. }));
    }
}

#[test]
fn departed_root_fails_waiting_ranks() {
    let mut comms = LocalCluster::with_timeout(2, Duration::from_secs(30)).unwrap();
    let peer = comms.remove(1);
    let root = comms.remove(0);
    let waiter = thread::spawn(move || ScatterDistributor::new(&peer, 0).scatter(None));
    drop(root);
    let err = waiter.join().unwrap().unwrap_err();
    assert!(err.is_fatal());
}
