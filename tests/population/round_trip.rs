//! Gather followed by scatter is a content-preserving identity.

use crate::common::*;
use hodmock::{balanced_counts, Gatherer, ScatterDistributor};
use proptest::prelude::*;

fn round_trip(contributions: Vec<usize>, root: usize) -> Vec<RowSet> {
    let size = contributions.len();
    let starts: Vec<i64> = contributions
        .iter()
        .scan(0i64, |acc, &n| {
            let start = *acc;
            *acc += n as i64;
            Some(start)
        })
        .collect();
    run_ranks(size, move |comm| {
        let rank = hodmock::Communicator::rank(&comm);
        let local = id_rows(starts[rank], contributions[rank]);
        let gathered = Gatherer::new(&comm, root).gather(&local).unwrap();
        assert_eq!(gathered.is_some(), rank == root);
        ScatterDistributor::new(&comm, root).scatter(gathered).unwrap()
    })
}

fn ids(shards: &[RowSet]) -> Vec<f64> {
    shards
        .iter()
        .flat_map(|s| s.column("id").unwrap().data().to_f64().unwrap())
        .collect()
}

#[test]
fn uneven_contributions_come_back_balanced() {
    let shards = round_trip(vec![7, 0, 2, 1], 0);
    let counts: Vec<usize> = shards.iter().map(RowSet::num_rows).collect();
    assert_eq!(counts, vec![3, 3, 2, 2]);
    let expected: Vec<f64> = (0..10).map(|i| i as f64).collect();
    assert_eq!(ids(&shards), expected);
}

#[test]
fn designated_rank_other_than_zero() {
    let shards = round_trip(vec![1, 2, 3], 2);
    assert_eq!(ids(&shards), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn zero_rows_everywhere_is_tolerated() {
    let shards = round_trip(vec![0, 0, 0], 0);
    for shard in shards {
        assert_eq!(shard.num_rows(), 0);
        assert!(shard.contains("id"));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn round_trip_preserves_order_and_balances(
        contributions in prop::collection::vec(0usize..20, 1..5),
        root_pick in 0usize..8,
    ) {
        let size = contributions.len();
        let root = root_pick % size;
        let total: usize = contributions.iter().sum();
        let shards = round_trip(contributions, root);

        let counts: Vec<usize> = shards.iter().map(RowSet::num_rows).collect();
        prop_assert_eq!(&counts, &balanced_counts(total, size));
        let low = total / size;
        prop_assert!(counts.iter().all(|&c| c == low || c == low + 1));
        prop_assert_eq!(counts.iter().filter(|&&c| c == low + 1).count(), if low * size == total { 0 } else { total % size });

        let expected: Vec<f64> = (0..total).map(|i| i as f64).collect();
        prop_assert_eq!(ids(&shards), expected);
    }
}
