//! Sample to chunk atom (`stsc`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stsc`
//!
//! Run-length mapping of chunks to the number of samples they hold.
//! `first_chunk` values are 1-based and strictly ascending; the final
//! run applies to every remaining chunk of the track.
//!
//! See:
//! - <https://developer.apple.com/documentation/quicktime-file-format/sample-to-chunk_atom>
//! - <https://developer.apple.com/documentation/quicktime-file-format/sample-to-chunk_atom/sample-to-chunk_table>

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::{FourCC, Mp4Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct SampleToChunk {
    /// 1-based index of the first chunk holding `samples_per_chunk`
    /// samples. The run lasts until the next entry's `first_chunk`.
    pub(crate) first_chunk: u32,
    pub(crate) samples_per_chunk: u32,
    pub(crate) sample_description_id: u32,
}

/// Sample to chunk atom (`stsc`).
#[derive(Debug, Clone)]
pub struct Stsc {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    pub(crate) table: Vec<SampleToChunk>,
}

impl Stsc {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        let entries = reader.read_be::<u32>()?;
        let table = (0..entries)
            .map(|_| reader.read_be::<SampleToChunk>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            offset: header.offset,
            version,
            flags,
            table,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        FULL_BOX_HEAD + 4 + 12 * self.table.len() as u64
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_full_box_head(writer, &FourCC::Stsc, self.size(), self.version, self.flags)?;
        writer.write_be(&(self.table.len() as u32))?;
        for entry in &self.table {
            writer.write_be(entry)?;
        }
        Ok(())
    }

    pub fn table(&self) -> &[SampleToChunk] {
        &self.table
    }

    /// Returns the 1-based chunk containing 1-based `sample`.
    /// The final run extends indefinitely.
    pub fn chunk_containing(&self, sample: u64) -> Result<u32, Mp4Error> {
        let mut current = 1_u64;
        let mut per_chunk = 0_u64;
        let mut samples = 1_u64;
        for run in &self.table {
            let next = run.first_chunk as u64;
            let samples_here = (next - current) * per_chunk;
            if samples + samples_here > sample {
                break;
            }
            samples += samples_here;
            current = next;
            per_chunk = run.samples_per_chunk as u64;
        }
        if per_chunk == 0 {
            return Err(Mp4Error::Format(
                "sample to chunk run with zero samples per chunk".into(),
            ));
        }
        let chunk = (sample - samples) / per_chunk + current;
        u32::try_from(chunk)
            .map_err(|_| Mp4Error::Format(format!("chunk number {chunk} exceeds 32 bits")))
    }

    /// Rebases the table so 1-based `chunk` becomes chunk 1. Runs that end
    /// before it are dropped; the run in force at `chunk` starts the new
    /// table.
    pub(crate) fn cut(&self, chunk: u32) -> Result<Self, Mp4Error> {
        let rebased = |table: Vec<SampleToChunk>| Self {
            offset: self.offset,
            version: self.version,
            flags: self.flags,
            table,
        };
        let mut in_force: Option<(u32, u32)> = None;
        for (i, run) in self.table.iter().enumerate() {
            if run.first_chunk > chunk {
                let (samples_per_chunk, sample_description_id) = in_force.ok_or_else(|| {
                    Mp4Error::Format("sample to chunk table does not start at chunk 1".into())
                })?;
                let mut table = Vec::with_capacity(self.table.len() - i + 1);
                table.push(SampleToChunk {
                    first_chunk: 1,
                    samples_per_chunk,
                    sample_description_id,
                });
                table.extend(self.table[i..].iter().map(|r| SampleToChunk {
                    first_chunk: r.first_chunk - (chunk - 1),
                    ..*r
                }));
                return Ok(rebased(table));
            }
            in_force = Some((run.samples_per_chunk, run.sample_description_id));
        }
        let (samples_per_chunk, sample_description_id) = in_force.ok_or_else(|| {
            Mp4Error::Format("empty sample to chunk table".into())
        })?;
        Ok(rebased(vec![SampleToChunk {
            first_chunk: 1,
            samples_per_chunk,
            sample_description_id,
        }]))
    }
}
