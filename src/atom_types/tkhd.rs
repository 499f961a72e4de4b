//! Track header atom (`tkhd`).
//!
//! Location: `moov/trak[multiple]/tkhd`
//!
//! Only the duration is rewritten; layer, group, volume, matrix and
//! dimensions are carried as opaque bytes.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/track_header_atom>

use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::consts::mp4_time_zero;
use crate::{FourCC, Mp4Error};

/// Bytes from `layer` through `track_height` plus the 8 reserved bytes
/// preceding them, identical in both versions.
const TKHD_TAIL: usize = 60;

/// Track header atom (`tkhd`).
#[derive(Debug, Clone)]
pub struct Tkhd {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    /// Seconds since midnight, 1904-01-01 UTC
    pub(crate) creation_time: u64,
    /// Seconds since midnight, 1904-01-01 UTC
    pub(crate) modification_time: u64,
    /// Uniquely identifies the track. Value 0 cannot be used.
    pub(crate) track_id: u32,
    pub(crate) reserved: [u8; 4],
    /// Duration of this track in the movie's time coordinate system.
    pub(crate) duration: u64,
    /// Reserved area, layer, alternate group, volume, matrix,
    /// track width and height.
    pub(crate) rest: [u8; TKHD_TAIL],
}

impl Tkhd {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        let (creation_time, modification_time) = match version {
            0 => (
                reader.read_be::<u32>()? as u64,
                reader.read_be::<u32>()? as u64,
            ),
            1 => (reader.read_be::<u64>()?, reader.read_be::<u64>()?),
            version => return Err(Mp4Error::UnsupportedVersion { name: "tkhd", version }),
        };
        let track_id = reader.read_be::<u32>()?;
        let mut reserved = [0_u8; 4];
        reader.read_exact(&mut reserved)?;
        let duration = match version {
            0 => reader.read_be::<u32>()? as u64,
            _ => reader.read_be::<u64>()?,
        };
        let mut rest = [0_u8; TKHD_TAIL];
        reader.read_exact(&mut rest)?;
        Ok(Self {
            offset: header.offset,
            version,
            flags,
            creation_time,
            modification_time,
            track_id,
            reserved,
            duration,
            rest,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        let timed = match self.version {
            1 => 32,
            _ => 20,
        };
        FULL_BOX_HEAD + timed + TKHD_TAIL as u64
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Tkhd, self.size(), self.version, self.flags)?;
        match self.version {
            0 => {
                writer.write_be(&(self.creation_time as u32))?;
                writer.write_be(&(self.modification_time as u32))?;
                writer.write_be(&self.track_id)?;
                writer.write_all(&self.reserved)?;
                writer.write_be(&(self.duration as u32))?;
            }
            _ => {
                writer.write_be(&self.creation_time)?;
                writer.write_be(&self.modification_time)?;
                writer.write_be(&self.track_id)?;
                writer.write_all(&self.reserved)?;
                writer.write_be(&self.duration)?;
            }
        }
        writer.write_all(&self.rest)?;
        Ok(())
    }

    pub fn track_id(&self) -> u32 {
        self.track_id
    }

    /// This track's unscaled duration (movie timescale).
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// This track's duration in seconds.
    pub fn duration_sec(&self, time_scale: u32) -> f64 {
        self.duration as f64 / time_scale as f64
    }

    /// Creation datetime for this track.
    pub fn creation_time(&self) -> time::PrimitiveDateTime {
        mp4_time_zero() + time::Duration::seconds(self.creation_time as i64)
    }

    /// Modification datetime for this track.
    pub fn modification_time(&self) -> time::PrimitiveDateTime {
        mp4_time_zero() + time::Duration::seconds(self.modification_time as i64)
    }
}
