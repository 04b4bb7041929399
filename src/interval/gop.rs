//! GOP boundary extraction.

use super::GopPolicy;
use crate::mp4::{SyncSamples, TrackTables};
use crate::timing::{cumulative_duration, total_duration};

/// Ordered, strictly increasing zero-based sample indices at which a GOP
/// begins.
///
/// With a sync-sample table the boundaries are its 1-based sample numbers
/// shifted down by one; the first sample of a well-formed track is always a
/// sync sample, so the sequence starts at 0. Without a table the track has
/// no inter-frame dependency and boundaries are synthesized every
/// `policy.synthetic_gop_len` samples, an arbitrary chunking granularity
/// rather than a reconstruction of real GOP structure.
pub fn gop_boundaries(
    sync_samples: Option<&SyncSamples>,
    sample_count: u32,
    policy: &GopPolicy,
) -> Vec<u32> {
    match sync_samples {
        Some(sync) => sync
            .sample_numbers
            .iter()
            .map(|n| n.saturating_sub(1))
            .collect(),
        None => {
            let gop_len = policy.synthetic_gop_len.max(1);
            (0..=sample_count / gop_len).map(|i| i * gop_len).collect()
        }
    }
}

/// Per-query view of a track's GOP structure: each boundary with its
/// cumulative start time, plus the track totals. Built by the video
/// locators and discarded after the query.
pub(crate) struct GopTimeline {
    pub boundaries: Vec<u32>,
    pub start_ticks: Vec<u64>,
    pub total_samples: u32,
    pub total_ticks: u64,
}

impl GopTimeline {
    pub fn new(track: &TrackTables, policy: &GopPolicy) -> Self {
        let total_samples = track.sample_count();
        let boundaries = gop_boundaries(track.sync_samples.as_ref(), total_samples, policy);
        let start_ticks = boundaries
            .iter()
            .map(|&b| cumulative_duration(&track.time_to_sample, b))
            .collect();
        let total_ticks = total_duration(track);

        Self {
            boundaries,
            start_ticks,
            total_samples,
            total_ticks,
        }
    }

    /// Sample-offset window of boundary `i`; the last window extends to the
    /// track's total sample count.
    pub fn offset_window(&self, i: usize) -> (u32, u32) {
        let start = self.boundaries[i];
        let end = self
            .boundaries
            .get(i + 1)
            .copied()
            .unwrap_or(self.total_samples);
        (start, end)
    }

    /// Time window of boundary `i`; the last window extends to the track's
    /// total duration.
    pub fn time_window(&self, i: usize) -> (u64, u64) {
        let start = self.start_ticks[i];
        let end = self
            .start_ticks
            .get(i + 1)
            .copied()
            .unwrap_or(self.total_ticks);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp4::{SampleSizes, TimeToSample};

    #[test]
    fn test_boundaries_from_sync_table() {
        let sync = SyncSamples::new(vec![1, 13, 25]);
        let policy = GopPolicy::default();
        assert_eq!(gop_boundaries(Some(&sync), 30, &policy), vec![0, 12, 24]);
    }

    #[test]
    fn test_synthesized_boundaries() {
        let policy = GopPolicy::default();
        // 17 samples at the default length of 5
        assert_eq!(gop_boundaries(None, 17, &policy), vec![0, 5, 10, 15]);
        // A multiple of the length includes the trailing boundary
        assert_eq!(gop_boundaries(None, 20, &policy), vec![0, 5, 10, 15, 20]);
        // Empty table yields the single conceptual boundary at 0
        assert_eq!(gop_boundaries(None, 0, &policy), vec![0]);
    }

    #[test]
    fn test_synthesized_boundaries_custom_length() {
        let policy = GopPolicy::new().synthetic_gop_len(8);
        assert_eq!(gop_boundaries(None, 17, &policy), vec![0, 8, 16]);

        // A zero length is clamped rather than looping forever
        let degenerate = GopPolicy::new().synthetic_gop_len(0);
        assert_eq!(gop_boundaries(None, 3, &degenerate), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_timeline_windows() {
        let mut track = TrackTables::new(1);
        track.time_to_sample = TimeToSample::from_runs([(10, 512)]);
        track.sample_sizes = SampleSizes::uniform(100, 10);
        track.sync_samples = Some(SyncSamples::new(vec![1, 5, 9]));

        let timeline = GopTimeline::new(&track, &GopPolicy::default());
        assert_eq!(timeline.boundaries, vec![0, 4, 8]);
        assert_eq!(timeline.start_ticks, vec![0, 2048, 4096]);
        assert_eq!(timeline.total_samples, 10);
        assert_eq!(timeline.total_ticks, 5120);

        assert_eq!(timeline.offset_window(0), (0, 4));
        assert_eq!(timeline.offset_window(2), (8, 10));
        assert_eq!(timeline.time_window(1), (2048, 4096));
        assert_eq!(timeline.time_window(2), (4096, 5120));
    }

    #[test]
    fn test_boundary_coverage_partition() {
        let sync = SyncSamples::new(vec![1, 4, 9, 14]);
        let boundaries = gop_boundaries(Some(&sync), 20, &GopPolicy::default());

        // Consecutive windows tile [0, N) with no gaps or overlaps.
        let mut expected_start = 0;
        for pair in boundaries.windows(2) {
            assert_eq!(pair[0], expected_start);
            assert!(pair[0] < pair[1]);
            expected_start = pair[1];
        }
        assert!(expected_start < 20);
    }
}
