//! Chunk offset atom for file sizes below the 32bit limit (`stco`),
//! and the variant-agnostic chunk offset table.
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stco`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/chunk_offset_atom>

use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::atom_types::co64::Co64;
use crate::{FourCC, Mp4Error};

/// Chunk offset atom for file sizes below the 32bit limit (`stco`).
#[derive(Debug, Clone)]
pub struct Stco {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    /// Absolute file offsets of each chunk.
    pub(crate) offsets: Vec<u32>,
}

impl Stco {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        let entries = reader.read_be::<u32>()?;
        let offsets = (0..entries)
            .map(|_| reader.read_be::<u32>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            offset: header.offset,
            version,
            flags,
            offsets,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        FULL_BOX_HEAD + 4 + 4 * self.offsets.len() as u64
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Stco, self.size(), self.version, self.flags)?;
        writer.write_be(&(self.offsets.len() as u32))?;
        for offset in &self.offsets {
            writer.write_be(offset)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }
}

/// The chunk offset table of a track, 32 or 64 bit on the wire.
#[derive(Debug, Clone)]
pub enum ChunkOffsets {
    Stco(Stco),
    Co64(Co64),
}

impl ChunkOffsets {
    pub(crate) fn offset(&self) -> u64 {
        match self {
            Self::Stco(b) => b.offset,
            Self::Co64(b) => b.offset,
        }
    }

    pub(crate) fn size(&self) -> u64 {
        match self {
            Self::Stco(b) => b.size(),
            Self::Co64(b) => b.size(),
        }
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        match self {
            Self::Stco(b) => b.write(writer),
            Self::Co64(b) => b.write(writer),
        }
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        match self {
            Self::Stco(b) => b.offsets.len(),
            Self::Co64(b) => b.offsets().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Absolute offset of 1-based `chunk`.
    pub fn get(&self, chunk: u32) -> Option<u64> {
        if chunk == 0 {
            return None;
        }
        let index = chunk as usize - 1;
        match self {
            Self::Stco(b) => b.offsets.get(index).map(|o| *o as u64),
            Self::Co64(b) => b.offsets().get(index).copied(),
        }
    }

    /// Largest offset in the table.
    pub(crate) fn max_offset(&self) -> u64 {
        match self {
            Self::Stco(b) => b.offsets.iter().map(|o| *o as u64).max().unwrap_or(0),
            Self::Co64(b) => b.offsets().iter().copied().max().unwrap_or(0),
        }
    }

    /// Drops chunks before 1-based `chunk` and subtracts `delta` from
    /// the remaining offsets.
    pub(crate) fn cut(&self, chunk: u32, delta: u64) -> Result<Self, Mp4Error> {
        let start = chunk as usize - 1;
        let sub = |offset: u64| {
            offset.checked_sub(delta).ok_or_else(|| {
                Mp4Error::Format(format!("chunk offset {offset} precedes the cut by {delta}"))
            })
        };
        Ok(match self {
            Self::Stco(b) => {
                let offsets = b.offsets[start.min(b.offsets.len())..]
                    .iter()
                    .map(|o| sub(*o as u64).map(|n| n as u32))
                    .collect::<Result<Vec<_>, _>>()?;
                Self::Stco(Stco { offsets, ..b.clone() })
            }
            Self::Co64(b) => {
                let offsets = b.offsets()[start.min(b.offsets().len())..]
                    .iter()
                    .map(|o| sub(*o))
                    .collect::<Result<Vec<_>, _>>()?;
                Self::Co64(b.with_offsets(offsets))
            }
        })
    }

    /// Adds `shift` to every offset. The caller widens 32-bit tables
    /// that would overflow beforehand.
    pub(crate) fn shifted(&self, shift: u64) -> Result<Self, Mp4Error> {
        let add = |offset: u64| offset.checked_add(shift).ok_or(Mp4Error::OffsetOverflow);
        Ok(match self {
            Self::Stco(b) => {
                let offsets = b
                    .offsets
                    .iter()
                    .map(|o| {
                        let shifted = add(*o as u64)?;
                        u32::try_from(shifted).map_err(|_| Mp4Error::OffsetOverflow)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::Stco(Stco { offsets, ..b.clone() })
            }
            Self::Co64(b) => {
                let offsets = b
                    .offsets()
                    .iter()
                    .map(|o| add(*o))
                    .collect::<Result<Vec<_>, _>>()?;
                Self::Co64(b.with_offsets(offsets))
            }
        })
    }

    /// A `co64` rendition of this table, widening `stco` entries.
    pub(crate) fn widened(&self) -> Self {
        match self {
            Self::Stco(b) => Self::Co64(Co64::from(b.clone())),
            Self::Co64(b) => Self::Co64(b.clone()),
        }
    }
}
