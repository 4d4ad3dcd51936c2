//! Derived position and velocity vectors.

use crate::common::*;
use hodmock::DerivedColumnEngine;

fn xyz() -> RowSet {
    RowSet::new(vec![
        Column::new("x", ColumnData::Float64(vec![1.0, 2.0])),
        Column::new("y", ColumnData::Float64(vec![3.0, 4.0])),
        Column::new("z", ColumnData::Float64(vec![5.0, 6.0])),
    ])
    .unwrap()
}

#[test]
fn position_stacks_rows() {
    let position = DerivedColumnEngine.position(&xyz()).unwrap();
    assert_eq!(position, vec![[1.0, 3.0, 5.0], [2.0, 4.0, 6.0]]);
}

#[test]
fn position_without_z_is_missing_column() {
    let mut shard = xyz();
    shard.remove_column("z");
    let err = DerivedColumnEngine.position(&shard).unwrap_err();
    assert_eq!(
        err,
        Error::MissingColumn {
            name: "z".to_string()
        }
    );
}

#[test]
fn catalog_vectors_follow_the_installed_shard() {
    let results = run_ranks(2, |comm| {
        let mut catalog = populate(comm, 3, 5).unwrap();
        let before = catalog.position().unwrap();
        assert_eq!(before.len(), catalog.size());
        let velocity = catalog.velocity().unwrap();
        assert_eq!(velocity.len(), catalog.size());

        catalog
            .repopulate(Some(6), &ModelParameters::new().with("alpha", 1.2))
            .unwrap();
        let after = catalog.position().unwrap();
        assert_eq!(after.len(), catalog.size());
        after
            .iter()
            .all(|p| p.iter().all(|c| (0.0..250.0).contains(c)))
    });
    assert!(results.into_iter().all(|inside| inside));
}
