use proptest::prelude::*;
use shock_core::{BucketMap, Corner, HistogramBank};

proptest! {
    /// Clamping guarantees every velocity is counted exactly once.
    #[test]
    fn bucket_index_always_in_range(
        velocity in any::<i32>(),
        bucket_count in 1usize..64,
        max_speed in 1i32..100_000,
    ) {
        let map = BucketMap::new(bucket_count, max_speed);
        prop_assert!(map.bucket_for(velocity) < bucket_count);
    }

    #[test]
    fn edge_velocities_hit_edge_buckets(
        bucket_count in 2usize..64,
        max_speed in 64i32..100_000,
    ) {
        let map = BucketMap::new(bucket_count, max_speed);
        prop_assert_eq!(map.bucket_for(i32::MIN), 0);
        prop_assert_eq!(map.bucket_for(i32::MAX), bucket_count - 1);
    }

    /// The pseudo-count keeps shares strictly below the full scale.
    #[test]
    fn normalized_shares_sum_within_scale(
        fills in proptest::collection::vec(0u64..500, 1..16),
    ) {
        let bank = HistogramBank::new(fills.len());
        for (bucket, &n) in fills.iter().enumerate() {
            for _ in 0..n {
                bank.increment(Corner::FrontLeft, bucket);
            }
        }
        let shares = bank.normalized(Corner::FrontLeft);
        let total: u64 = shares.iter().map(|&s| u64::from(s)).sum();
        prop_assert!(total <= 1000, "shares summed to {total}");
        prop_assert!(shares.iter().all(|&s| s < 1000));
    }

    #[test]
    fn reset_always_restores_the_empty_state(
        fills in proptest::collection::vec(0usize..10, 0..64),
    ) {
        let bank = HistogramBank::new(10);
        for &bucket in &fills {
            bank.increment(Corner::RearRight, bucket);
        }
        bank.reset(Corner::RearRight);
        prop_assert!(bank.counts(Corner::RearRight).iter().all(|&c| c == 0));
        prop_assert_eq!(bank.samples(Corner::RearRight), 0);
        prop_assert!(bank.normalized(Corner::RearRight).iter().all(|&s| s == 0));
    }
}
