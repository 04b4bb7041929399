//! Playback-time to sample-interval resolution.
//!
//! The resolution pipeline mirrors how a progressive seeker consumes a file:
//!
//! 1. [`gop_boundaries`] derives the GOP starting points of the video track
//!    (from stss, or synthesized when the track has no inter-frame
//!    dependency).
//! 2. [`video_interval_at`] locates the GOP span containing a target time;
//!    [`next_video_interval`] advances to the GOP following an
//!    already-consumed sample.
//! 3. [`audio_interval_for`] maps a resolved video span onto the audio
//!    track, converting timescales and honoring the edit-list media offset.
//!
//! All operations are pure functions over immutable borrows; each query
//! recomputes its working state and shares nothing across calls.

mod audio;
mod gop;
mod video;

pub use audio::audio_interval_for;
pub use gop::gop_boundaries;
pub use video::{next_video_interval, video_interval_at};

pub(crate) use gop::GopTimeline;

/// A sample-index range paired with its time range, both half-open, in the
/// owning track's sample sequence and timescale units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeOffsetInterval {
    /// First sample of the span.
    pub start_sample: u32,
    /// End sample (exclusive).
    pub end_sample: u32,
    /// Start time in track timescale ticks.
    pub start_ticks: u64,
    /// End time in track timescale ticks (exclusive).
    pub end_ticks: u64,
}

impl TimeOffsetInterval {
    /// Number of samples in the span.
    pub fn sample_count(&self) -> u32 {
        self.end_sample.saturating_sub(self.start_sample)
    }

    /// Duration of the span in ticks.
    pub fn tick_span(&self) -> u64 {
        self.end_ticks.saturating_sub(self.start_ticks)
    }
}

/// Policy parameters for interval resolution.
///
/// Both values are tunable rather than hard-coded: the synthesized GOP
/// length is an arbitrary chunking granularity, not a codec-derived
/// constant, and the start-walk gate preserves the convention that a
/// zero start time means "already at the start of the audio track".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GopPolicy {
    /// GOP length used when the track has no sync-sample table.
    pub synthetic_gop_len: u32,
    /// Advance the audio start accumulator even when the converted start
    /// time is zero.
    pub walk_start_from_zero: bool,
}

impl GopPolicy {
    /// Create a policy with default settings.
    pub fn new() -> Self {
        Self {
            synthetic_gop_len: 5,
            walk_start_from_zero: false,
        }
    }

    /// Set the synthesized GOP length.
    pub fn synthetic_gop_len(mut self, len: u32) -> Self {
        self.synthetic_gop_len = len;
        self
    }

    /// Set whether the audio start accumulator advances from time zero.
    pub fn walk_start_from_zero(mut self, walk: bool) -> Self {
        self.walk_start_from_zero = walk;
        self
    }
}

impl Default for GopPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_spans() {
        let interval = TimeOffsetInterval {
            start_sample: 5,
            end_sample: 10,
            start_ticks: 2560,
            end_ticks: 5120,
        };
        assert_eq!(interval.sample_count(), 5);
        assert_eq!(interval.tick_span(), 2560);
    }

    #[test]
    fn test_policy_defaults() {
        let policy = GopPolicy::default();
        assert_eq!(policy.synthetic_gop_len, 5);
        assert!(!policy.walk_start_from_zero);

        let tuned = GopPolicy::new().synthetic_gop_len(8).walk_start_from_zero(true);
        assert_eq!(tuned.synthetic_gop_len, 8);
        assert!(tuned.walk_start_from_zero);
    }
}
