//! Movie header atom (`mvhd`).
//!
//! Location: `moov/mvhd`
//!
//! Versions 0 and 1 differ in the width of the time fields (32 vs 64
//! bits). Rate, volume, matrix, preview fields and the next track ID are
//! not interpreted; their exact bytes are kept and written back so the
//! output stays bit-compatible.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/movie_header_atom>

use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::consts::mp4_time_zero;
use crate::{FourCC, Mp4Error};

/// Bytes from `preferred_rate` through `next_track_id`,
/// identical in both versions.
const MVHD_TAIL: usize = 80;

/// Movie header atom (`mvhd`).
#[derive(Debug, Clone)]
pub struct Mvhd {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    /// Seconds since midnight, 1904-01-01 UTC
    pub(crate) creation_time: u64,
    /// Seconds since midnight, 1904-01-01 UTC
    pub(crate) modification_time: u64,
    /// Number of time units that pass in one second
    pub(crate) time_scale: u32,
    /// Unscaled duration of the longest track.
    pub(crate) duration: u64,
    /// Preferred rate/volume, matrix, preview fields, next track ID.
    pub(crate) rest: [u8; MVHD_TAIL],
}

impl Mvhd {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        let (creation_time, modification_time, time_scale, duration) = match version {
            0 => {
                let c = reader.read_be::<u32>()? as u64;
                let m = reader.read_be::<u32>()? as u64;
                let ts = reader.read_be::<u32>()?;
                let d = reader.read_be::<u32>()? as u64;
                (c, m, ts, d)
            }
            1 => {
                let c = reader.read_be::<u64>()?;
                let m = reader.read_be::<u64>()?;
                let ts = reader.read_be::<u32>()?;
                let d = reader.read_be::<u64>()?;
                (c, m, ts, d)
            }
            version => return Err(Mp4Error::UnsupportedVersion { name: "mvhd", version }),
        };
        let mut rest = [0_u8; MVHD_TAIL];
        reader.read_exact(&mut rest)?;
        Ok(Self {
            offset: header.offset,
            version,
            flags,
            creation_time,
            modification_time,
            time_scale,
            duration,
            rest,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        let timed = match self.version {
            1 => 28,
            _ => 16,
        };
        FULL_BOX_HEAD + timed + MVHD_TAIL as u64
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Mvhd, self.size(), self.version, self.flags)?;
        match self.version {
            0 => {
                writer.write_be(&(self.creation_time as u32))?;
                writer.write_be(&(self.modification_time as u32))?;
                writer.write_be(&self.time_scale)?;
                writer.write_be(&(self.duration as u32))?;
            }
            _ => {
                writer.write_be(&self.creation_time)?;
                writer.write_be(&self.modification_time)?;
                writer.write_be(&self.time_scale)?;
                writer.write_be(&self.duration)?;
            }
        }
        writer.write_all(&self.rest)?;
        Ok(())
    }

    pub fn time_scale(&self) -> u32 {
        self.time_scale
    }

    /// Unscaled duration of the longest track.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Duration of the longest track in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration as f64 / self.time_scale as f64
    }

    /// Creation time as UTC datetime.
    /// May default to MP4 default time
    /// `1904-01-01 00:00:00` depending on device and settings.
    pub fn creation_time(&self) -> time::PrimitiveDateTime {
        mp4_time_zero() + time::Duration::seconds(self.creation_time as i64)
    }

    /// Modification time as UTC datetime.
    pub fn modification_time(&self) -> time::PrimitiveDateTime {
        mp4_time_zero() + time::Duration::seconds(self.modification_time as i64)
    }
}
