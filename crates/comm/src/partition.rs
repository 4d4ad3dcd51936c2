//! Balanced contiguous partitioning
//!
//! `total` rows over `size` ranks: every rank gets `total / size` rows and
//! the first `total % size` ranks get one extra. Blocks are contiguous and in
//! rank order, so rank 0 holds the first block.

use std::ops::Range;

/// Row count for each rank
pub fn balanced_counts(total: usize, size: usize) -> Vec<usize> {
    if size == 0 {
        return Vec::new();
    }
    let base = total / size;
    let remainder = total % size;
    (0..size)
        .map(|rank| if rank < remainder { base + 1 } else { base })
        .collect()
}

/// Row range for each rank
pub fn balanced_ranges(total: usize, size: usize) -> Vec<Range<usize>> {
    let mut start = 0;
    balanced_counts(total, size)
        .into_iter()
        .map(|count| {
            let range = start..start + count;
            start += count;
            range
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_remainder_goes_to_lowest_ranks() {
        assert_eq!(balanced_counts(10, 4), vec![3, 3, 2, 2]);
        assert_eq!(balanced_counts(3, 5), vec![1, 1, 1, 0, 0]);
        assert_eq!(balanced_counts(0, 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_ranges_are_contiguous() {
        assert_eq!(balanced_ranges(7, 3), vec![0..3, 3..5, 5..7]);
    }

    #[test]
    fn test_zero_ranks() {
        assert!(balanced_counts(5, 0).is_empty());
    }

    proptest! {
        #[test]
        fn counts_are_floor_or_ceil(total in 0usize..10_000, size in 1usize..64) {
            let counts = balanced_counts(total, size);
            let floor = total / size;
            let ceil = (total + size - 1) / size;
            prop_assert_eq!(counts.len(), size);
            prop_assert_eq!(counts.iter().sum::<usize>(), total);
            prop_assert!(counts.iter().all(|&c| c == floor || c == ceil));
            let larger = counts.iter().filter(|&&c| c == floor + 1).count();
            prop_assert_eq!(larger, total % size);
            // the larger blocks are a prefix
            prop_assert!(counts.windows(2).all(|w| w[0] >= w[1]));
        }

        #[test]
        fn ranges_tile_the_input(total in 0usize..10_000, size in 1usize..64) {
            let ranges = balanced_ranges(total, size);
            let mut expected_start = 0;
            for r in &ranges {
                prop_assert_eq!(r.start, expected_start);
                expected_start = r.end;
            }
            prop_assert_eq!(expected_start, total);
        }
    }
}
