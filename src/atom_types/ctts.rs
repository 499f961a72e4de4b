//! Composition offset atom (`ctts`). Optional.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/composition_offset_atom>

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::atom_types::stts::cut_run_table;
use crate::{FourCC, Mp4Error};

/// One run of consecutive samples sharing a composition offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct CompositionOffset {
    pub(crate) sample_count: u32,
    pub(crate) composition_offset: u32,
}

/// Composition offset atom (`ctts`).
#[derive(Debug, Clone)]
pub struct Ctts {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    pub(crate) table: Vec<CompositionOffset>,
}

impl Ctts {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        let entries = reader.read_be::<u32>()?;
        let table = (0..entries)
            .map(|_| reader.read_be::<CompositionOffset>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            offset: header.offset,
            version,
            flags,
            table,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        FULL_BOX_HEAD + 4 + 8 * self.table.len() as u64
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Ctts, self.size(), self.version, self.flags)?;
        writer.write_be(&(self.table.len() as u32))?;
        for entry in &self.table {
            writer.write_be(entry)?;
        }
        Ok(())
    }

    pub fn table(&self) -> &[CompositionOffset] {
        &self.table
    }

    /// Drops everything before 1-based `sample`, keeping the remainder
    /// of the run containing it.
    pub(crate) fn cut(&self, sample: u64) -> Result<Self, Mp4Error> {
        let table = cut_run_table(
            &self.table,
            sample,
            |t| t.sample_count,
            |t, sample_count| CompositionOffset { sample_count, ..*t },
        )?;
        Ok(Self {
            offset: self.offset,
            version: self.version,
            flags: self.flags,
            table,
        })
    }
}
