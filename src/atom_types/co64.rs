//! Chunk offset atom for file sizes above the 32bit limit (`co64`).
//! The 64-bit equivalent of the `stco` atom.
//!
//! Path: `moov/trak[multiple]/mdia/minf/stbl/co64`

use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::atom_types::stco::Stco;
use crate::{FourCC, Mp4Error};

/// Chunk offset atom for file sizes above the 32bit limit (`co64`).
#[derive(Debug, Clone)]
pub struct Co64 {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    pub(crate) offsets: Vec<u64>,
}

impl Co64 {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        let entries = reader.read_be::<u32>()?;
        let offsets = (0..entries)
            .map(|_| reader.read_be::<u64>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            offset: header.offset,
            version,
            flags,
            offsets,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        FULL_BOX_HEAD + 4 + 8 * self.offsets.len() as u64
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Co64, self.size(), self.version, self.flags)?;
        writer.write_be(&(self.offsets.len() as u32))?;
        for offset in &self.offsets {
            writer.write_be(offset)?;
        }
        Ok(())
    }

    /// Chunk byte offsets.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// The same atom with a replaced offset table.
    pub(crate) fn with_offsets(&self, offsets: Vec<u64>) -> Self {
        Self {
            offsets,
            ..self.clone()
        }
    }
}

impl From<Stco> for Co64 {
    fn from(value: Stco) -> Self {
        Self {
            offset: value.offset,
            version: value.version,
            flags: value.flags,
            offsets: value.offsets.iter().map(|n| *n as u64).collect(),
        }
    }
}
