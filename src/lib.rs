//! Seekmap: GOP-aligned sample interval maps for progressive MP4 playback
//!
//! This crate computes the correspondence between playback time and sample
//! index ranges for an MP4 file's video track, and the synchronized range
//! for its paired audio track. It is the arithmetic core of a progressive
//! segmenter/seeker: the returned intervals tell an upstream serving layer
//! which sample ranges to slice out of the container next.
//!
//! # Modules
//!
//! - `mp4` - moov parsing into typed per-track timing tables
//! - `timing` - cumulative duration over the time-to-sample table
//! - `interval` - GOP boundaries, video locators, audio synchronization
//!
//! # Architecture
//!
//! A seek or progressive load resolves intervals in three steps:
//!
//! 1. Parse the moov atom once into [`Mp4File`] (stts/stss/stsz/mdhd/elst
//!    per track; sample payloads are never touched)
//! 2. Locate the video GOP span for a target time with
//!    [`video_interval_at`], or advance past a consumed sample with
//!    [`next_video_interval`]
//! 3. Map the span onto the audio track with [`audio_interval_for`],
//!    which converts timescales and applies the edit-list media offset
//!
//! Every operation is a pure function over immutable borrows: no I/O after
//! parse, no interior mutation, no cross-call cache. Queries over one
//! shared [`Mp4File`] are safe from any number of threads.

pub mod error;
pub mod interval;
pub mod mp4;
pub mod timing;

pub use error::{Error, Result};
pub use interval::{
    audio_interval_for, gop_boundaries, next_video_interval, video_interval_at, GopPolicy,
    TimeOffsetInterval,
};
pub use mp4::Mp4File;
