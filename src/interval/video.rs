//! Video interval location, by playback time and by consumed sample.

use super::{GopPolicy, GopTimeline, TimeOffsetInterval};
use crate::mp4::TrackTables;

/// Find the GOP span of the video track whose time window contains `time`
/// (in the track's own timescale ticks).
///
/// Returns `None` when `time` falls past the end of the track; that is a
/// no-match outcome, not an error.
pub fn video_interval_at(
    track: &TrackTables,
    time: u64,
    policy: &GopPolicy,
) -> Option<TimeOffsetInterval> {
    let timeline = GopTimeline::new(track, policy);

    for i in 0..timeline.boundaries.len() {
        let (start_ticks, end_ticks) = timeline.time_window(i);
        if start_ticks <= time && time < end_ticks {
            let (start_sample, end_sample) = timeline.offset_window(i);
            let interval = TimeOffsetInterval {
                start_sample,
                end_sample,
                start_ticks,
                end_ticks,
            };

            #[cfg(feature = "tracing")]
            tracing::trace!(
                time,
                start_sample = interval.start_sample,
                end_sample = interval.end_sample,
                "resolved video interval by time"
            );

            return Some(interval);
        }
    }

    None
}

/// Advance past a consumed sample: find the GOP span whose boundary pair
/// satisfies `boundary < sample + 1 <= next_boundary`.
///
/// A consumer walking sequentially passes the exclusive end of the span it
/// just finished and receives the following GOP without resolving from
/// time zero again. Past the last boundary the final GOP is returned, so
/// the walk always terminates with a span ending at the track's total
/// sample count.
pub fn next_video_interval(
    track: &TrackTables,
    sample: u32,
    policy: &GopPolicy,
) -> Option<TimeOffsetInterval> {
    let timeline = GopTimeline::new(track, policy);

    let last_boundary = *timeline.boundaries.last()?;
    let target = u64::from(sample) + 1;

    if target > u64::from(last_boundary) {
        return Some(TimeOffsetInterval {
            start_sample: last_boundary,
            end_sample: timeline.total_samples,
            start_ticks: *timeline.start_ticks.last()?,
            end_ticks: timeline.total_ticks,
        });
    }

    for i in 0..timeline.boundaries.len().saturating_sub(1) {
        let low = u64::from(timeline.boundaries[i]);
        let high = u64::from(timeline.boundaries[i + 1]);
        if low < target && target <= high {
            return Some(TimeOffsetInterval {
                start_sample: timeline.boundaries[i],
                end_sample: timeline.boundaries[i + 1],
                start_ticks: timeline.start_ticks[i],
                end_ticks: timeline.start_ticks[i + 1],
            });
        }
    }

    None
}
