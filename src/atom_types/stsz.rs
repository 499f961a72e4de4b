//! Sample size atoms: `stsz` and its compact variant `stz2`.
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stsz`
//!
//! `stsz` lists per-sample sizes, or a single uniform size with an empty
//! table. `stz2` packs sizes into 16, 8 or 4 bit fields; 4-bit entries
//! are stored two per byte, high nibble first, with an odd final entry
//! taking the high nibble of a trailing byte.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sample_size_atom>

use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::{FourCC, Mp4Error};

/// Sample size atom (`stsz`).
#[derive(Debug, Clone)]
pub struct Stsz {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    /// Uniform size for every sample, or 0 when `sizes` lists them.
    pub(crate) sample_size: u32,
    /// Number of samples. Equals `sizes.len()` unless the size is uniform.
    pub(crate) sample_count: u32,
    pub(crate) sizes: Vec<u32>,
}

impl Stsz {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        let sample_size = reader.read_be::<u32>()?;
        let sample_count = reader.read_be::<u32>()?;
        let sizes = match sample_size {
            0 => (0..sample_count)
                .map(|_| reader.read_be::<u32>())
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };
        Ok(Self {
            offset: header.offset,
            version,
            flags,
            sample_size,
            sample_count,
            sizes,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        FULL_BOX_HEAD + 8 + 4 * self.sizes.len() as u64
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Stsz, self.size(), self.version, self.flags)?;
        writer.write_be(&self.sample_size)?;
        writer.write_be(&self.sample_count)?;
        for size in &self.sizes {
            writer.write_be(size)?;
        }
        Ok(())
    }

    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Per-sample sizes. Empty when the size is uniform.
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Drops sizes before 1-based `sample`. A uniform table keeps its
    /// size and only reduces the sample count.
    pub(crate) fn cut(&self, sample: u64) -> Result<Self, Mp4Error> {
        if sample > self.sample_count as u64 + 1 {
            return Err(Mp4Error::Format(format!(
                "cut sample {sample} past the end of a {} entry size table",
                self.sample_count
            )));
        }
        let dropped = (sample - 1) as u32;
        let sizes = match self.sample_size {
            0 => self.sizes[dropped as usize..].to_vec(),
            _ => Vec::new(),
        };
        Ok(Self {
            offset: self.offset,
            version: self.version,
            flags: self.flags,
            sample_size: self.sample_size,
            sample_count: self.sample_count - dropped,
            sizes,
        })
    }
}

/// Compact sample size atom (`stz2`).
#[derive(Debug, Clone)]
pub struct Stz2 {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    /// Bits per entry: 4, 8 or 16.
    pub(crate) field_size: u8,
    pub(crate) table: Vec<u16>,
}

impl Stz2 {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        // field size sits in the low byte of a 32 bit word
        let field_size = (reader.read_be::<u32>()? & 0xff) as u8;
        let entries = reader.read_be::<u32>()?;
        let table = match field_size {
            16 => (0..entries)
                .map(|_| reader.read_be::<u16>())
                .collect::<Result<Vec<_>, _>>()?,
            8 => (0..entries)
                .map(|_| reader.read_be::<u8>().map(u16::from))
                .collect::<Result<Vec<_>, _>>()?,
            4 => {
                let mut table = Vec::with_capacity(entries as usize);
                for _ in 0..(entries as u64 + 1) / 2 {
                    let byte = reader.read_be::<u8>()?;
                    table.push(((byte >> 4) & 0x0f) as u16);
                    table.push((byte & 0x0f) as u16);
                }
                table.truncate(entries as usize);
                table
            }
            n => {
                return Err(Mp4Error::Format(format!(
                    "stz2 field size {n} not one of 4, 8, 16"
                )))
            }
        };
        Ok(Self {
            offset: header.offset,
            version,
            flags,
            field_size,
            table,
        })
    }

    fn table_bytes(&self) -> u64 {
        let entries = self.table.len() as u64;
        match self.field_size {
            16 => 2 * entries,
            8 => entries,
            _ => (entries + 1) / 2,
        }
    }

    pub(crate) fn size(&self) -> u64 {
        FULL_BOX_HEAD + 8 + self.table_bytes()
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Stz2, self.size(), self.version, self.flags)?;
        writer.write_be(&(self.field_size as u32))?;
        writer.write_be(&(self.table.len() as u32))?;
        match self.field_size {
            16 => {
                for entry in &self.table {
                    writer.write_be(entry)?;
                }
            }
            8 => {
                for entry in &self.table {
                    writer.write_be(&(*entry as u8))?;
                }
            }
            _ => {
                for pair in self.table.chunks(2) {
                    let high = (pair[0] & 0x0f) as u8;
                    let low = pair.get(1).map(|v| (*v & 0x0f) as u8).unwrap_or(0);
                    writer.write_be(&((high << 4) | low))?;
                }
            }
        }
        Ok(())
    }

    pub fn field_size(&self) -> u8 {
        self.field_size
    }

    pub fn table(&self) -> &[u16] {
        &self.table
    }

    /// Drops sizes before 1-based `sample`.
    pub(crate) fn cut(&self, sample: u64) -> Result<Self, Mp4Error> {
        if sample > self.table.len() as u64 + 1 {
            return Err(Mp4Error::Format(format!(
                "cut sample {sample} past the end of a {} entry size table",
                self.table.len()
            )));
        }
        Ok(Self {
            offset: self.offset,
            version: self.version,
            flags: self.flags,
            field_size: self.field_size,
            table: self.table[(sample - 1) as usize..].to_vec(),
        })
    }
}

/// Exactly one of `stsz`/`stz2` describes sample sizes in a sample table.
#[derive(Debug, Clone)]
pub enum SampleSizes {
    Stsz(Stsz),
    Stz2(Stz2),
}

impl SampleSizes {
    pub(crate) fn offset(&self) -> u64 {
        match self {
            Self::Stsz(b) => b.offset,
            Self::Stz2(b) => b.offset,
        }
    }

    pub(crate) fn size(&self) -> u64 {
        match self {
            Self::Stsz(b) => b.size(),
            Self::Stz2(b) => b.size(),
        }
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        match self {
            Self::Stsz(b) => b.write(writer),
            Self::Stz2(b) => b.write(writer),
        }
    }

    /// Number of samples the table describes.
    pub fn sample_count(&self) -> u64 {
        match self {
            Self::Stsz(b) => b.sample_count as u64,
            Self::Stz2(b) => b.table.len() as u64,
        }
    }

    pub(crate) fn cut(&self, sample: u64) -> Result<Self, Mp4Error> {
        Ok(match self {
            Self::Stsz(b) => Self::Stsz(b.cut(sample)?),
            Self::Stz2(b) => Self::Stz2(b.cut(sample)?),
        })
    }
}
