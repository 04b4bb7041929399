//! MP4 container parsing.
//!
//! This module provides the typed box tree the interval arithmetic operates
//! on: per-track stts/stss/stsz/mdhd/elst contents extracted from the moov
//! atom.

mod atoms;
mod reader;

pub use atoms::{
    Atom, AtomType, Edit, EditList, SampleSizes, SyncSamples, TimeToSample, TimeToSampleRun,
    TrackKind, TrackTables,
};
pub use reader::Mp4Reader;

use crate::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Parsed MP4 file with extracted track tables.
#[derive(Debug)]
pub struct Mp4File {
    /// Duration in movie timescale units.
    pub duration: u64,
    /// Movie timescale (time units per second).
    pub timescale: u32,
    /// Video track tables.
    pub video_track: Option<TrackTables>,
    /// Audio track tables.
    pub audio_track: Option<TrackTables>,
    /// Whether the file has faststart (moov before mdat).
    pub has_faststart: bool,
}

impl Mp4File {
    /// Parse an MP4 file from the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::parse(&mut reader)
    }

    /// Parse an MP4 file from a reader.
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let mut mp4_reader = Mp4Reader::new(reader);
        mp4_reader.parse()
    }

    /// Get the duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.timescale == 0 {
            0.0
        } else {
            self.duration as f64 / self.timescale as f64
        }
    }

    /// Video track tables, or the precondition error when absent.
    pub fn video(&self) -> Result<&TrackTables> {
        self.video_track
            .as_ref()
            .ok_or(Error::MissingAtom("trak (vide)"))
    }

    /// Audio track tables, or the precondition error when absent.
    pub fn audio(&self) -> Result<&TrackTables> {
        self.audio_track
            .as_ref()
            .ok_or(Error::MissingAtom("trak (soun)"))
    }
}
