//! Sync sample atom (`stss`).
//!
//! Ascending 1-based numbers of the samples decoding can start from.
//! Optional; a track without one has only sync samples.
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stss`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sync_sample_atom>

use std::io::{Read, Seek, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::{FourCC, Mp4Error};

/// Sync sample atom (`stss`).
#[derive(Debug, Clone)]
pub struct Stss {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    pub(crate) table: Vec<u32>,
}

impl Stss {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        let entries = reader.read_be::<u32>()?;
        let table = (0..entries)
            .map(|_| reader.read_be::<u32>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            offset: header.offset,
            version,
            flags,
            table,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        FULL_BOX_HEAD + 4 + 4 * self.table.len() as u64
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Stss, self.size(), self.version, self.flags)?;
        writer.write_be(&(self.table.len() as u32))?;
        for entry in &self.table {
            writer.write_be(entry)?;
        }
        Ok(())
    }

    /// Sync sample numbers, ascending, 1-based.
    pub fn table(&self) -> &[u32] {
        &self.table
    }

    /// Drops sync samples before 1-based `sample` and renumbers the rest
    /// so `sample` becomes 1.
    pub(crate) fn cut(&self, sample: u64) -> Self {
        let table = self
            .table
            .iter()
            .filter(|&&s| s as u64 >= sample)
            .map(|&s| (s as u64 - sample + 1) as u32)
            .collect();
        Self {
            offset: self.offset,
            version: self.version,
            flags: self.flags,
            table,
        }
    }
}
