//! Audio interval synchronization.

use super::{GopPolicy, TimeOffsetInterval};
use crate::mp4::TrackTables;
use crate::{Error, Result};

/// Convert ticks between track timescales, widened through u128 so the
/// intermediate product cannot overflow.
fn convert_ticks(ticks: u64, from_timescale: u32, to_timescale: u32) -> Result<u64> {
    if from_timescale == 0 {
        return Err(Error::invalid_mp4("zero timescale"));
    }
    Ok((u128::from(ticks) * u128::from(to_timescale) / u128::from(from_timescale)) as u64)
}

/// Map a resolved video interval onto the audio track.
///
/// The video interval's time window is converted into audio timescale
/// units, then a single pass over the audio time-to-sample table advances
/// two (count, duration) accumulators in lockstep: the start pair begins at
/// the edit list's initial media offset and advances until it reaches the
/// converted start time; the end pair begins at zero and advances until it
/// reaches the converted end time. A zero start time means the interval
/// already begins at the start of the audio track, so the start pair stays
/// put (tunable via [`GopPolicy::walk_start_from_zero`]).
///
/// When the video interval closes the video track, the audio end offset is
/// forced to the audio track's total sample count so trailing audio with no
/// video coverage is still delivered.
///
/// An exhausted table is not an error; the accumulated values stand as a
/// best-effort interval reaching end-of-track.
pub fn audio_interval_for(
    video: &TrackTables,
    audio: &TrackTables,
    interval: &TimeOffsetInterval,
    policy: &GopPolicy,
) -> Result<TimeOffsetInterval> {
    let edit_list = audio.edit_list.as_ref().ok_or(Error::MissingAtom("elst"))?;
    let first_edit = edit_list
        .entries
        .first()
        .ok_or_else(|| Error::invalid_mp4("empty edit list"))?;

    let audio_start = convert_ticks(interval.start_ticks, video.timescale, audio.timescale)?;
    let audio_end = convert_ticks(interval.end_ticks, video.timescale, audio.timescale)?;

    // An empty leading edit (media_time == -1) offsets playback by its own
    // duration instead of a media time.
    let initial_offset = if first_edit.media_time != -1 {
        first_edit.media_time.max(0) as u64
    } else {
        first_edit.segment_duration
    };

    let mut start_count: u32 = 0;
    let mut end_count: u32 = 0;
    let mut start_ticks = initial_offset;
    let mut end_ticks: u64 = 0;

    let walk_start = policy.walk_start_from_zero || audio_start != 0;

    'walk: for run in &audio.time_to_sample.runs {
        let delta = u64::from(run.sample_delta);
        for _ in 0..run.sample_count {
            let advance_start = walk_start && start_ticks <= audio_start;
            let advance_end = end_ticks <= audio_end;

            if !advance_start && !advance_end {
                break 'walk;
            }
            if advance_start {
                start_ticks += delta;
                start_count += 1;
            }
            if advance_end {
                end_ticks += delta;
                end_count += 1;
            }
        }
    }

    // Final video GOP: deliver the audio tail regardless of the accumulator.
    let end_sample = if interval.end_sample == video.sample_count() {
        audio.sample_count()
    } else {
        end_count
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(
        video_start = interval.start_ticks,
        video_end = interval.end_ticks,
        start_sample = start_count,
        end_sample,
        "synchronized audio interval"
    );

    Ok(TimeOffsetInterval {
        start_sample: start_count,
        end_sample,
        start_ticks,
        end_ticks,
    })
}
