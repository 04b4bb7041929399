//! Cumulative duration over the time-to-sample table.

use crate::mp4::{TimeToSample, TrackTables};

/// Total elapsed ticks for the first `sample_count` samples of a track.
///
/// Sums `count * delta` over the stts runs, clipping the final run when it
/// covers more samples than requested. Monotonically non-decreasing in
/// `sample_count`; a table covering fewer samples than requested yields the
/// full table duration.
pub fn cumulative_duration(time_to_sample: &TimeToSample, sample_count: u32) -> u64 {
    let mut remaining = sample_count as u64;
    let mut ticks = 0u64;

    for run in &time_to_sample.runs {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(run.sample_count as u64);
        ticks += take * run.sample_delta as u64;
        remaining -= take;
    }

    ticks
}

/// Total track duration derived from the stts table and the sample total.
pub fn total_duration(track: &TrackTables) -> u64 {
    cumulative_duration(&track.time_to_sample, track.sample_count())
}
