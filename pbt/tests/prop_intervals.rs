//! Property-based testing for interval resolution.
//!
//! Every operation is a pure function over immutable inputs, so identical
//! inputs must always reproduce identical intervals; the properties below
//! lean on that to cover boundary coverage, monotonicity, and the chained
//! walk across randomized tracks.

use proptest::prelude::*;
use seekmap::mp4::{SampleSizes, SyncSamples, TimeToSample, TrackTables};
use seekmap::timing::cumulative_duration;
use seekmap::{gop_boundaries, next_video_interval, video_interval_at, GopPolicy};

/// Generate an stts table as (count, delta) runs.
fn arb_time_to_sample() -> impl Strategy<Value = TimeToSample> {
    prop::collection::vec((1u32..=50, 1u32..=2000), 1..8)
        .prop_map(TimeToSample::from_runs)
}

/// Generate a sync-sample table for a track of `sample_count` samples:
/// sample 1 is always a sync sample, later ones are a sorted subset.
fn arb_sync_samples(sample_count: u32) -> impl Strategy<Value = SyncSamples> {
    // Cap the subset size by the distinct sample numbers available so the
    // set strategy can always fill it.
    let max_extra = sample_count.saturating_sub(1).min(15) as usize;
    prop::collection::btree_set(2u32..=sample_count.max(2), 0..=max_extra).prop_map(|rest| {
        let mut numbers = vec![1u32];
        numbers.extend(rest);
        SyncSamples::new(numbers)
    })
}

/// A video track whose stss (when present) is consistent with its sample
/// count.
fn arb_video_track() -> impl Strategy<Value = TrackTables> {
    arb_time_to_sample()
        .prop_flat_map(|tts| {
            let sample_count = tts.sample_total() as u32;
            (
                Just(tts),
                prop::option::of(arb_sync_samples(sample_count)),
            )
        })
        .prop_map(|(tts, sync)| {
            let sample_count = tts.sample_total() as u32;
            let mut track = TrackTables::new(1);
            track.timescale = 600;
            track.time_to_sample = tts;
            track.sample_sizes = SampleSizes::uniform(1024, sample_count);
            track.sync_samples = sync;
            track
        })
}

proptest! {
    /// GOP windows tile [0, N) with no gaps or overlaps.
    #[test]
    fn prop_boundary_coverage(track in arb_video_track()) {
        let total = track.sample_count();
        let boundaries =
            gop_boundaries(track.sync_samples.as_ref(), total, &GopPolicy::default());

        // Windows are consecutive boundary pairs with the last extended to
        // N, so [0, N) is tiled exactly when the sequence starts at 0, is
        // strictly increasing, and stays within the track.
        prop_assert_eq!(boundaries[0], 0);
        for pair in boundaries.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        prop_assert!(*boundaries.last().unwrap() <= total.max(1));
    }

    /// Boundary start times are non-decreasing, and so are by-time results
    /// as the probe time grows.
    #[test]
    fn prop_time_monotonicity(track in arb_video_track(), probes in prop::collection::vec(0u64..200_000, 1..20)) {
        let policy = GopPolicy::default();
        let total = track.sample_count();
        let boundaries = gop_boundaries(track.sync_samples.as_ref(), total, &policy);

        let mut last_ticks = 0;
        for &b in &boundaries {
            let t = cumulative_duration(&track.time_to_sample, b);
            prop_assert!(t >= last_ticks);
            last_ticks = t;
        }

        let mut sorted = probes.clone();
        sorted.sort_unstable();
        let mut last_start = 0;
        for t in sorted {
            if let Some(interval) = video_interval_at(&track, t, &policy) {
                prop_assert!(interval.start_ticks >= last_start);
                prop_assert!(interval.start_ticks <= t && t < interval.end_ticks);
                last_start = interval.start_ticks;
            }
        }
    }

    /// The chained walk from time zero enumerates the GOPs in order and
    /// terminates at the end of the track.
    #[test]
    fn prop_chained_walk_terminates(track in arb_video_track()) {
        let policy = GopPolicy::default();
        let total = track.sample_count();

        let mut span = match video_interval_at(&track, 0, &policy) {
            Some(span) => span,
            // Degenerate zero-duration track: nothing to walk.
            None => return Ok(()),
        };
        prop_assert_eq!(span.start_sample, 0);

        let mut steps = 0;
        while span.end_sample < total {
            let next = next_video_interval(&track, span.end_sample, &policy)
                .expect("walk stays in range");
            prop_assert_eq!(next.start_sample, span.end_sample);
            prop_assert!(next.end_sample > next.start_sample);
            span = next;
            steps += 1;
            prop_assert!(steps <= total + 1);
        }
        prop_assert_eq!(span.end_sample, total);
    }

    /// Identical inputs reproduce identical results.
    #[test]
    fn prop_referential_transparency(track in arb_video_track(), t in 0u64..100_000) {
        let policy = GopPolicy::default();
        prop_assert_eq!(
            video_interval_at(&track, t, &policy),
            video_interval_at(&track, t, &policy)
        );
    }

    /// The duration accumulator is monotone in the sample count.
    #[test]
    fn prop_cumulative_duration_monotonic(tts in arb_time_to_sample(), n in 0u32..500) {
        let d0 = cumulative_duration(&tts, n);
        let d1 = cumulative_duration(&tts, n + 1);
        prop_assert!(d1 >= d0);
    }
}
