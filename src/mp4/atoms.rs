//! MP4 atom definitions and decoded box contents.
//!
//! The interval arithmetic in [`crate::interval`] operates on the typed
//! contents defined here, never on raw bytes:
//! - stts: per-sample durations as (count, delta) runs
//! - stss: sync sample numbers (keyframes, 1-based)
//! - stsz: per-sample byte sizes; its count is the track's sample total
//! - mdhd: media timescale and duration
//! - elst: edit list, consulted for the initial media-time offset

/// Four-character atom type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtomType(pub [u8; 4]);

impl AtomType {
    pub const FTYP: Self = Self(*b"ftyp");
    pub const MOOV: Self = Self(*b"moov");
    pub const MDAT: Self = Self(*b"mdat");
    pub const MVHD: Self = Self(*b"mvhd");
    pub const TRAK: Self = Self(*b"trak");
    pub const TKHD: Self = Self(*b"tkhd");
    pub const EDTS: Self = Self(*b"edts");
    pub const ELST: Self = Self(*b"elst");
    pub const MDIA: Self = Self(*b"mdia");
    pub const MDHD: Self = Self(*b"mdhd");
    pub const HDLR: Self = Self(*b"hdlr");
    pub const MINF: Self = Self(*b"minf");
    pub const STBL: Self = Self(*b"stbl");
    pub const STTS: Self = Self(*b"stts");
    pub const STSS: Self = Self(*b"stss");
    pub const STSZ: Self = Self(*b"stsz");
    pub const FREE: Self = Self(*b"free");
    pub const SKIP: Self = Self(*b"skip");

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Get the 4-char code as a string.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl std::fmt::Display for AtomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed atom header.
#[derive(Debug, Clone)]
pub struct Atom {
    /// Atom type code.
    pub atom_type: AtomType,
    /// Atom size including header.
    pub size: u64,
    /// File offset where atom data starts (after header).
    pub data_offset: u64,
    /// Size of the header (8 or 16 bytes).
    pub header_size: u8,
}

impl Atom {
    /// Get the data size (size - header).
    pub fn data_size(&self) -> u64 {
        self.size.saturating_sub(self.header_size as u64)
    }

    /// Check if this atom contains child atoms.
    pub fn is_container(&self) -> bool {
        matches!(
            self.atom_type,
            AtomType::MOOV | AtomType::TRAK | AtomType::EDTS | AtomType::MDIA | AtomType::MINF | AtomType::STBL
        )
    }
}

/// Track kind from the hdlr atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackKind {
    Video,
    Audio,
    Hint,
    Meta,
    Text,
    Unknown([u8; 4]),
}

impl TrackKind {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        match &bytes {
            b"vide" => Self::Video,
            b"soun" => Self::Audio,
            b"hint" => Self::Hint,
            b"meta" => Self::Meta,
            b"text" => Self::Text,
            _ => Self::Unknown(bytes),
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video)
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio)
    }
}

/// One stts run: `sample_count` consecutive samples sharing `sample_delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeToSampleRun {
    /// Number of consecutive samples in this run.
    pub sample_count: u32,
    /// Duration of each sample, in media timescale ticks.
    pub sample_delta: u32,
}

/// Decoded stts (decoding time to sample) contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeToSample {
    /// Run-length encoded per-sample durations, in table order.
    pub runs: Vec<TimeToSampleRun>,
}

impl TimeToSample {
    /// Build from `(sample_count, sample_delta)` pairs.
    pub fn from_runs<I: IntoIterator<Item = (u32, u32)>>(runs: I) -> Self {
        Self {
            runs: runs
                .into_iter()
                .map(|(sample_count, sample_delta)| TimeToSampleRun {
                    sample_count,
                    sample_delta,
                })
                .collect(),
        }
    }

    /// Total number of samples covered by the table.
    pub fn sample_total(&self) -> u64 {
        self.runs.iter().map(|r| r.sample_count as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Decoded stss (sync sample) contents.
///
/// Absence of the table means the track has no inter-frame dependency and
/// every sample is independently decodable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncSamples {
    /// 1-based sample numbers that start a GOP, in table order.
    pub sample_numbers: Vec<u32>,
}

impl SyncSamples {
    pub fn new(sample_numbers: Vec<u32>) -> Self {
        Self { sample_numbers }
    }

    pub fn len(&self) -> usize {
        self.sample_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_numbers.is_empty()
    }
}

/// Decoded stsz (sample size) contents.
///
/// `sample_count` is authoritative for the track's sample total; the
/// per-sample vector is empty when `uniform_size` is nonzero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleSizes {
    /// Uniform byte size for every sample, or 0 when sizes vary.
    pub uniform_size: u32,
    /// Total sample count for the track.
    pub sample_count: u32,
    /// Per-sample byte sizes; empty when `uniform_size` is nonzero.
    pub sizes: Vec<u32>,
}

impl SampleSizes {
    /// Build from explicit per-sample sizes.
    pub fn per_sample(sizes: Vec<u32>) -> Self {
        Self {
            uniform_size: 0,
            sample_count: sizes.len() as u32,
            sizes,
        }
    }

    /// Build from a uniform size and sample count.
    pub fn uniform(size: u32, sample_count: u32) -> Self {
        Self {
            uniform_size: size,
            sample_count,
            sizes: Vec::new(),
        }
    }

    /// Byte size of the given zero-based sample.
    pub fn size_of(&self, index: u32) -> u32 {
        if self.uniform_size > 0 {
            self.uniform_size
        } else {
            self.sizes.get(index as usize).copied().unwrap_or(0)
        }
    }

    pub fn len(&self) -> u32 {
        self.sample_count
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// One elst entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Edit {
    /// Duration of this edit in movie timescale ticks.
    pub segment_duration: u64,
    /// Starting media time of the edit; -1 marks an empty edit.
    pub media_time: i64,
}

/// Decoded elst (edit list) contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EditList {
    /// Edit entries in table order. Only the first is consulted for the
    /// track's initial playable offset.
    pub entries: Vec<Edit>,
}

impl EditList {
    pub fn new(entries: Vec<Edit>) -> Self {
        Self { entries }
    }
}

/// One track's decoded timing boxes.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackTables {
    /// Track ID.
    pub track_id: u32,
    /// Track kind (video/audio/etc).
    pub kind: TrackKind,
    /// Media timescale (ticks per second for this track).
    pub timescale: u32,
    /// Track duration in media timescale ticks.
    pub duration: u64,
    /// stts contents.
    pub time_to_sample: TimeToSample,
    /// stss contents; `None` when every sample is a sync sample.
    pub sync_samples: Option<SyncSamples>,
    /// stsz contents.
    pub sample_sizes: SampleSizes,
    /// elst contents, if the track carries an edit list.
    pub edit_list: Option<EditList>,
}

impl TrackTables {
    /// Create empty track tables.
    pub fn new(track_id: u32) -> Self {
        Self {
            track_id,
            kind: TrackKind::Unknown([0; 4]),
            timescale: 1,
            duration: 0,
            time_to_sample: TimeToSample::default(),
            sync_samples: None,
            sample_sizes: SampleSizes::default(),
            edit_list: None,
        }
    }

    /// Total sample count; the sample-size table is authoritative.
    pub fn sample_count(&self) -> u32 {
        self.sample_sizes.len()
    }

    /// Get duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.timescale == 0 {
            0.0
        } else {
            self.duration as f64 / self.timescale as f64
        }
    }
}
