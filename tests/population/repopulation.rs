//! In-place repopulation across ranks.

use crate::common::*;

#[test]
fn generations_advance_and_shards_are_replaced() {
    let results = run_ranks(3, |comm| {
        let mut catalog = populate(comm, 4, 1).unwrap();
        assert_eq!(catalog.generation(), Generation::new(1));
        let first = catalog.shard().clone();
        let first_csize = catalog.csize();

        let g2 = catalog
            .repopulate(Some(2), &ModelParameters::new())
            .unwrap();
        let g3 = catalog
            .repopulate(Some(3), &ModelParameters::new().with("logM1", 13.5))
            .unwrap();
        assert_ne!(g2, g3);
        assert_eq!(g3, Generation::new(3));
        (first, first_csize, catalog.shard().clone(), catalog.csize(), catalog.size())
    });

    let csize = results[0].3;
    let total: usize = results.iter().map(|r| r.4).sum();
    assert_eq!(total as u64, csize);
    for (_, first_csize, _, c, _) in &results {
        assert_eq!(*c, csize);
        assert!(*first_csize > 0);
    }
    // balanced shares
    let sizes: Vec<usize> = results.iter().map(|r| r.4).collect();
    assert_eq!(sizes, hodmock::balanced_counts(total, 3));
}

#[test]
fn same_seed_reproduces_the_catalog() {
    let results = run_ranks(2, |comm| {
        let mut catalog = populate(comm, 5, 77).unwrap();
        let first = catalog.shard().clone();
        catalog
            .repopulate(Some(77), &ModelParameters::new())
            .unwrap();
        first == *catalog.shard()
    });
    assert!(results.into_iter().all(|same| same));
}

#[test]
fn unknown_parameter_changes_nothing() {
    let results = run_ranks(3, |comm| {
        let mut catalog = populate(comm, 2, 9).unwrap();
        let shard = catalog.shard().clone();
        let err = catalog
            .repopulate(Some(10), &ModelParameters::new().with("not_a_param", 1.0))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownParameter { ref name, .. } if name == "not_a_param"));
        assert_eq!(catalog.generation(), Generation::new(1));
        assert_eq!(catalog.shard(), &shard);

        // the group is still in step afterwards
        catalog
            .repopulate(Some(11), &ModelParameters::new())
            .unwrap()
    });
    assert!(results.into_iter().all(|g| g == Generation::new(2)));
}
