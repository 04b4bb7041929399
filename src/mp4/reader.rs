//! MP4 moov reader.
//!
//! Walks the atom tree and decodes the timing boxes each track needs for
//! interval resolution. Sample payloads are never read; mdat is only located
//! to detect faststart layout.

use super::{
    Atom, AtomType, Edit, EditList, Mp4File, SampleSizes, SyncSamples, TimeToSample,
    TimeToSampleRun, TrackKind, TrackTables,
};
use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Maximum allowed atom data size (64 MB) to prevent OOM on malformed files.
const MAX_ATOM_DATA_SIZE: u64 = 64 * 1024 * 1024;

/// Which required stbl children were present for a track.
#[derive(Default)]
struct StblSeen {
    stts: bool,
    stsz: bool,
}

/// MP4 atom reader.
pub struct Mp4Reader<R> {
    reader: R,
    file_size: u64,
}

impl<R: Read + Seek> Mp4Reader<R> {
    /// Create a new MP4 reader.
    pub fn new(mut reader: R) -> Self {
        let file_size = reader.seek(SeekFrom::End(0)).unwrap_or(0);
        let _ = reader.seek(SeekFrom::Start(0));
        Self { reader, file_size }
    }

    /// Parse the MP4 file.
    pub fn parse(&mut self) -> Result<Mp4File> {
        let mut mp4 = Mp4File {
            duration: 0,
            timescale: 1000,
            video_track: None,
            audio_track: None,
            has_faststart: false,
        };

        let mut moov_offset = None;
        let mut mdat_offset = 0u64;

        let atoms = self.read_atoms(0, self.file_size)?;

        for atom in &atoms {
            match atom.atom_type {
                AtomType::MOOV => {
                    moov_offset = Some(atom.data_offset - atom.header_size as u64);
                    self.parse_moov(atom, &mut mp4)?;
                }
                AtomType::MDAT => {
                    mdat_offset = atom.data_offset - atom.header_size as u64;
                }
                _ => {}
            }
        }

        let moov_offset = moov_offset.ok_or(Error::MissingAtom("moov"))?;

        // Faststart means moov comes before mdat
        mp4.has_faststart = moov_offset < mdat_offset || mdat_offset == 0;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            timescale = mp4.timescale,
            has_video = mp4.video_track.is_some(),
            has_audio = mp4.audio_track.is_some(),
            faststart = mp4.has_faststart,
            "parsed moov"
        );

        Ok(mp4)
    }

    /// Read atoms at the given level.
    fn read_atoms(&mut self, start: u64, end: u64) -> Result<Vec<Atom>> {
        let mut atoms = Vec::new();
        let mut pos = start;

        while pos < end {
            self.reader.seek(SeekFrom::Start(pos))?;

            let mut header = [0u8; 8];
            if self.reader.read_exact(&mut header).is_err() {
                break;
            }

            let size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
            let atom_type = AtomType::from_bytes([header[4], header[5], header[6], header[7]]);

            let (actual_size, header_size) = if size == 1 {
                // 64-bit extended size
                let mut ext = [0u8; 8];
                self.reader.read_exact(&mut ext)?;
                (u64::from_be_bytes(ext), 16u8)
            } else if size == 0 {
                // Atom extends to end of file
                (end - pos, 8u8)
            } else {
                (size, 8u8)
            };

            if actual_size < header_size as u64 {
                break;
            }

            atoms.push(Atom {
                atom_type,
                size: actual_size,
                data_offset: pos + header_size as u64,
                header_size,
            });

            pos += actual_size;
        }

        Ok(atoms)
    }

    /// Read and validate atom data, rejecting oversized atoms.
    fn read_atom_data(&mut self, atom: &Atom) -> Result<Vec<u8>> {
        let size = atom.data_size();
        if size > MAX_ATOM_DATA_SIZE {
            return Err(Error::invalid_mp4(format!(
                "Atom {} data size {} exceeds maximum {}",
                atom.atom_type, size, MAX_ATOM_DATA_SIZE
            )));
        }
        self.reader.seek(SeekFrom::Start(atom.data_offset))?;
        let mut data = vec![0u8; size as usize];
        self.reader.read_exact(&mut data)?;
        Ok(data)
    }

    /// Parse moov atom.
    fn parse_moov(&mut self, moov: &Atom, mp4: &mut Mp4File) -> Result<()> {
        let children = self.read_atoms(moov.data_offset, moov.data_offset + moov.data_size())?;

        for child in &children {
            match child.atom_type {
                AtomType::MVHD => {
                    self.parse_mvhd(child, mp4)?;
                }
                AtomType::TRAK => {
                    if let Ok(track) = self.parse_trak(child) {
                        match track.kind {
                            TrackKind::Video if mp4.video_track.is_none() => {
                                mp4.video_track = Some(track);
                            }
                            TrackKind::Audio if mp4.audio_track.is_none() => {
                                mp4.audio_track = Some(track);
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Parse mvhd (movie header).
    fn parse_mvhd(&mut self, atom: &Atom, mp4: &mut Mp4File) -> Result<()> {
        let data = self.read_atom_data(atom)?;

        if data.is_empty() {
            return Ok(());
        }

        let version = data[0];

        if version == 0 {
            // 32-bit timestamps
            if data.len() >= 20 {
                mp4.timescale = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);
                mp4.duration = u32::from_be_bytes([data[16], data[17], data[18], data[19]]) as u64;
            }
        } else {
            // 64-bit timestamps
            if data.len() >= 32 {
                mp4.timescale = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
                mp4.duration = u64::from_be_bytes([
                    data[24], data[25], data[26], data[27], data[28], data[29], data[30], data[31],
                ]);
            }
        }

        Ok(())
    }

    /// Parse trak (track) atom.
    fn parse_trak(&mut self, trak: &Atom) -> Result<TrackTables> {
        let children = self.read_atoms(trak.data_offset, trak.data_offset + trak.data_size())?;

        let mut track = TrackTables::new(0);
        let mut seen = StblSeen::default();

        for child in &children {
            match child.atom_type {
                AtomType::TKHD => {
                    self.parse_tkhd(child, &mut track)?;
                }
                AtomType::EDTS => {
                    self.parse_edts(child, &mut track)?;
                }
                AtomType::MDIA => {
                    seen = self.parse_mdia(child, &mut track)?;
                }
                _ => {}
            }
        }

        if track.kind.is_video() || track.kind.is_audio() {
            if !seen.stts {
                return Err(Error::MissingAtom("stts"));
            }
            if !seen.stsz {
                return Err(Error::MissingAtom("stsz"));
            }
        }

        Ok(track)
    }

    /// Parse tkhd (track header).
    fn parse_tkhd(&mut self, atom: &Atom, track: &mut TrackTables) -> Result<()> {
        let data = self.read_atom_data(atom)?;

        if data.is_empty() {
            return Ok(());
        }

        let version = data[0];

        if version == 0 {
            if data.len() >= 16 {
                track.track_id = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);
            }
        } else if data.len() >= 24 {
            track.track_id = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
        }

        Ok(())
    }

    /// Parse edts (edit) atom.
    fn parse_edts(&mut self, edts: &Atom, track: &mut TrackTables) -> Result<()> {
        let children = self.read_atoms(edts.data_offset, edts.data_offset + edts.data_size())?;

        for child in &children {
            if child.atom_type == AtomType::ELST {
                self.parse_elst(child, track)?;
            }
        }

        Ok(())
    }

    /// Parse elst (edit list).
    fn parse_elst(&mut self, atom: &Atom, track: &mut TrackTables) -> Result<()> {
        let data = self.read_atom_data(atom)?;

        if data.len() < 8 {
            return Ok(());
        }

        let version = data[0];
        let entry_count = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;
        let entry_size = if version == 0 { 12 } else { 20 };
        let mut entries = Vec::with_capacity(entry_count);

        for i in 0..entry_count {
            let offset = 8 + i * entry_size;
            if offset + entry_size > data.len() {
                break;
            }
            // Entry layout: segment_duration, media_time, media_rate (16.16,
            // not retained). media_time is signed; -1 marks an empty edit.
            let (segment_duration, media_time) = if version == 0 {
                let duration = u32::from_be_bytes([
                    data[offset],
                    data[offset + 1],
                    data[offset + 2],
                    data[offset + 3],
                ]) as u64;
                let media_time = i32::from_be_bytes([
                    data[offset + 4],
                    data[offset + 5],
                    data[offset + 6],
                    data[offset + 7],
                ]) as i64;
                (duration, media_time)
            } else {
                let duration = u64::from_be_bytes([
                    data[offset],
                    data[offset + 1],
                    data[offset + 2],
                    data[offset + 3],
                    data[offset + 4],
                    data[offset + 5],
                    data[offset + 6],
                    data[offset + 7],
                ]);
                let media_time = i64::from_be_bytes([
                    data[offset + 8],
                    data[offset + 9],
                    data[offset + 10],
                    data[offset + 11],
                    data[offset + 12],
                    data[offset + 13],
                    data[offset + 14],
                    data[offset + 15],
                ]);
                (duration, media_time)
            };
            entries.push(Edit {
                segment_duration,
                media_time,
            });
        }

        track.edit_list = Some(EditList::new(entries));
        Ok(())
    }

    /// Parse mdia (media) atom.
    fn parse_mdia(&mut self, mdia: &Atom, track: &mut TrackTables) -> Result<StblSeen> {
        let children = self.read_atoms(mdia.data_offset, mdia.data_offset + mdia.data_size())?;

        let mut seen = StblSeen::default();

        for child in &children {
            match child.atom_type {
                AtomType::MDHD => {
                    self.parse_mdhd(child, track)?;
                }
                AtomType::HDLR => {
                    self.parse_hdlr(child, track)?;
                }
                AtomType::MINF => {
                    seen = self.parse_minf(child, track)?;
                }
                _ => {}
            }
        }

        Ok(seen)
    }

    /// Parse mdhd (media header).
    fn parse_mdhd(&mut self, atom: &Atom, track: &mut TrackTables) -> Result<()> {
        let data = self.read_atom_data(atom)?;

        if data.is_empty() {
            return Ok(());
        }

        let version = data[0];

        if version == 0 {
            if data.len() >= 20 {
                track.timescale = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);
                track.duration =
                    u32::from_be_bytes([data[16], data[17], data[18], data[19]]) as u64;
            }
        } else {
            if data.len() >= 24 {
                track.timescale = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
            }
            if data.len() >= 32 {
                track.duration = u64::from_be_bytes([
                    data[24], data[25], data[26], data[27], data[28], data[29], data[30], data[31],
                ]);
            }
        }

        Ok(())
    }

    /// Parse hdlr (handler) atom.
    fn parse_hdlr(&mut self, atom: &Atom, track: &mut TrackTables) -> Result<()> {
        let data = self.read_atom_data(atom)?;

        if data.len() >= 12 {
            track.kind = TrackKind::from_bytes([data[8], data[9], data[10], data[11]]);
        }

        Ok(())
    }

    /// Parse minf (media info) atom.
    fn parse_minf(&mut self, minf: &Atom, track: &mut TrackTables) -> Result<StblSeen> {
        let children = self.read_atoms(minf.data_offset, minf.data_offset + minf.data_size())?;

        let mut seen = StblSeen::default();

        for child in &children {
            if child.atom_type == AtomType::STBL {
                seen = self.parse_stbl(child, track)?;
            }
        }

        Ok(seen)
    }

    /// Parse stbl (sample table) atom.
    fn parse_stbl(&mut self, stbl: &Atom, track: &mut TrackTables) -> Result<StblSeen> {
        let children = self.read_atoms(stbl.data_offset, stbl.data_offset + stbl.data_size())?;

        let mut seen = StblSeen::default();

        for child in &children {
            match child.atom_type {
                AtomType::STTS => {
                    self.parse_stts(child, track)?;
                    seen.stts = true;
                }
                AtomType::STSS => {
                    self.parse_stss(child, track)?;
                }
                AtomType::STSZ => {
                    self.parse_stsz(child, track)?;
                    seen.stsz = true;
                }
                _ => {}
            }
        }

        Ok(seen)
    }

    /// Parse stts (decoding time to sample).
    fn parse_stts(&mut self, atom: &Atom, track: &mut TrackTables) -> Result<()> {
        let data = self.read_atom_data(atom)?;

        if data.len() < 8 {
            return Ok(());
        }

        let entry_count = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;
        let mut runs = Vec::with_capacity(entry_count);

        for i in 0..entry_count {
            let offset = 8 + i * 8;
            if offset + 8 > data.len() {
                break;
            }
            let sample_count = u32::from_be_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]);
            let sample_delta = u32::from_be_bytes([
                data[offset + 4],
                data[offset + 5],
                data[offset + 6],
                data[offset + 7],
            ]);
            runs.push(TimeToSampleRun {
                sample_count,
                sample_delta,
            });
        }

        track.time_to_sample = TimeToSample { runs };
        Ok(())
    }

    /// Parse stss (sync sample).
    fn parse_stss(&mut self, atom: &Atom, track: &mut TrackTables) -> Result<()> {
        let data = self.read_atom_data(atom)?;

        if data.len() < 8 {
            return Ok(());
        }

        let entry_count = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;
        let mut sample_numbers = Vec::with_capacity(entry_count);

        for i in 0..entry_count {
            let offset = 8 + i * 4;
            if offset + 4 > data.len() {
                break;
            }
            let sample = u32::from_be_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]);
            sample_numbers.push(sample);
        }

        track.sync_samples = Some(SyncSamples::new(sample_numbers));
        Ok(())
    }

    /// Parse stsz (sample size).
    fn parse_stsz(&mut self, atom: &Atom, track: &mut TrackTables) -> Result<()> {
        let data = self.read_atom_data(atom)?;

        if data.len() < 12 {
            return Ok(());
        }

        let uniform_size = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        let sample_count = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);

        track.sample_sizes = if uniform_size == 0 {
            let mut sizes = Vec::with_capacity(sample_count as usize);
            for i in 0..sample_count as usize {
                let offset = 12 + i * 4;
                if offset + 4 > data.len() {
                    break;
                }
                let size = u32::from_be_bytes([
                    data[offset],
                    data[offset + 1],
                    data[offset + 2],
                    data[offset + 3],
                ]);
                sizes.push(size);
            }
            SampleSizes::per_sample(sizes)
        } else {
            SampleSizes::uniform(uniform_size, sample_count)
        };

        Ok(())
    }
}
