//! Media header atom (`mdhd`).
//!
//! Similar to `mvhd`, but only describes a single track (`trak`):
//! its media timescale and unscaled duration.
//!
//! Location: `moov/trak/mdia/mdhd`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/media_header_atom>

use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::consts::mp4_time_zero;
use crate::{FourCC, Mp4Error};

/// Language code and quality, identical in both versions.
const MDHD_TAIL: usize = 4;

/// Media header atom (`mdhd`). One per track (`trak`).
#[derive(Debug, Clone)]
pub struct Mdhd {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    /// Seconds since midnight, 1904-01-01 UTC
    pub(crate) creation_time: u64,
    /// Seconds since midnight, 1904-01-01 UTC
    pub(crate) modification_time: u64,
    /// Number of time units that pass in one second
    /// for this track's media.
    pub(crate) time_scale: u32,
    /// Unscaled duration in media time units.
    pub(crate) duration: u64,
    /// Packed ISO-639-2/T language code and quality.
    pub(crate) rest: [u8; MDHD_TAIL],
}

impl Mdhd {
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
            version => return Err(Mp4Error::UnsupportedVersion { name: "mdhd", version }),
        };
        let mut rest = [0_u8; MDHD_TAIL];
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
        FULL_BOX_HEAD + timed + MDHD_TAIL as u64
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Mdhd, self.size(), self.version, self.flags)?;
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

    pub fn duration_unscaled(&self) -> u64 {
        self.duration
    }

    /// Duration of this track's media in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration as f64 / self.time_scale as f64
    }

    /// ISO-639-2/T language code.
    ///
    /// Packed in 16 bits `X u5 u5 u5`: the most significant bit is
    /// padding, each 5 bit group plus `0x60` is an ASCII character.
    pub fn language(&self) -> String {
        let data = u16::from_be_bytes([self.rest[0], self.rest[1]]);
        [
            // value between 0-31 + 96 = ascii range so casting to u8 is ok
            (((0b0111_1100_0000_0000 & data) >> 10) as u8 + 0x60) as char,
            (((0b0000_0011_1110_0000 & data) >> 5) as u8 + 0x60) as char,
            ((0b0000_0000_0001_1111 & data) as u8 + 0x60) as char,
        ]
        .iter()
        .collect()
    }

    pub fn creation_time(&self) -> time::PrimitiveDateTime {
        mp4_time_zero() + time::Duration::seconds(self.creation_time as i64)
    }

    pub fn modification_time(&self) -> time::PrimitiveDateTime {
        mp4_time_zero() + time::Duration::seconds(self.modification_time as i64)
    }
}
