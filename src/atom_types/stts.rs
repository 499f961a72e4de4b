//! Time-to-sample atom (`stts`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stts`
//!
//! See <https://developer.apple.com/documentation/quicktime-file-format/time-to-sample_atom>

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinReaderExt, BinWrite, BinWriterExt};

use crate::atom::{read_version_flags, write_full_box_head, AtomHeader, FULL_BOX_HEAD};
use crate::{FourCC, Mp4Error};

/// One run of consecutive samples sharing a decode-time delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct TimeToSample {
    pub(crate) sample_count: u32,
    pub(crate) sample_delta: u32,
}

impl TimeToSample {
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn sample_delta(&self) -> u32 {
        self.sample_delta
    }
}

/// Time to sample atom (`stts`).
///
/// Path: `moov/trak[multiple]/mdia/minf/stbl/stts`
#[derive(Debug, Clone)]
pub struct Stts {
    pub(crate) offset: u64,
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    pub(crate) table: Vec<TimeToSample>,
}

impl Stts {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let (version, flags) = read_version_flags(reader)?;
        let entries = reader.read_be::<u32>()?;
        let table = (0..entries)
            .map(|_| reader.read_be::<TimeToSample>())
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
        write_full_box_head(writer, &FourCC::Stts, self.size(), self.version, self.flags)?;
        writer.write_be(&(self.table.len() as u32))?;
        for entry in &self.table {
            writer.write_be(entry)?;
        }
        Ok(())
    }

    /// The time to sample table as `(SAMPLE_COUNT, SAMPLE_DELTA)` runs.
    pub fn table(&self) -> &[TimeToSample] {
        &self.table
    }

    /// Total number of samples described by the table.
    pub fn sample_sum(&self) -> u64 {
        self.table.iter().map(|t| t.sample_count as u64).sum()
    }

    /// Sum of all unscaled sample durations.
    pub fn duration_sum(&self) -> u64 {
        self.table
            .iter()
            .map(|t| t.sample_count as u64 * t.sample_delta as u64)
            .sum()
    }

    /// Returns the 1-based number of the sample containing media time `mt`.
    ///
    /// `mt == 0` maps to sample 1; a time at or past the end of the table
    /// maps to one past the final sample (callers clamp).
    pub fn sample_at_time(&self, mt: u64) -> u64 {
        let mut ctime = 0_u64;
        // samples are numbered from 1
        let mut samples = 1_u64;
        for run in &self.table {
            if mt == ctime {
                break;
            }
            let cdelta = run.sample_count as u64 * run.sample_delta as u64;
            if run.sample_delta > 0 && mt < ctime + cdelta {
                samples += (mt - ctime) / run.sample_delta as u64;
                break;
            }
            ctime += cdelta;
            samples += run.sample_count as u64;
        }
        samples
    }

    /// Unscaled media time at which 1-based `sample` starts.
    pub fn time_at_sample(&self, sample: u64) -> u64 {
        let mut ctime = 0_u64;
        let mut samples = 1_u64;
        for run in &self.table {
            if samples + run.sample_count as u64 >= sample {
                return ctime + (sample - samples) * run.sample_delta as u64;
            }
            ctime += run.sample_count as u64 * run.sample_delta as u64;
            samples += run.sample_count as u64;
        }
        ctime
    }

    /// Drops everything before 1-based `sample`, keeping the remainder
    /// of the run containing it.
    pub(crate) fn cut(&self, sample: u64) -> Result<Self, Mp4Error> {
        let table = cut_run_table(
            &self.table,
            sample,
            |t| t.sample_count,
            |t, sample_count| TimeToSample { sample_count, ..*t },
        )?;
        Ok(Self {
            offset: self.offset,
            version: self.version,
            flags: self.flags,
            table,
        })
    }
}

/// Cuts a `(count, value)` run-length table at 1-based `sample`.
/// Shared by `stts` and `ctts`.
///
/// `sample` may be at most one past the total sample count, in which
/// case nothing is retained.
pub(crate) fn cut_run_table<T, C, N>(
    table: &[T],
    sample: u64,
    count: C,
    with_count: N,
) -> Result<Vec<T>, Mp4Error>
where
    T: Copy,
    C: Fn(&T) -> u32,
    N: Fn(&T, u32) -> T,
{
    let total: u64 = table.iter().map(|t| count(t) as u64).sum();
    if sample > total + 1 {
        return Err(Mp4Error::Format(format!(
            "cut sample {sample} past the end of a {total} sample run table"
        )));
    }
    let mut samples = 1_u64;
    for (i, run) in table.iter().enumerate() {
        let in_run = count(run) as u64;
        if samples + in_run > sample {
            let mut out = Vec::with_capacity(table.len() - i);
            out.push(with_count(run, (samples + in_run - sample) as u32));
            out.extend_from_slice(&table[i + 1..]);
            return Ok(out);
        }
        samples += in_run;
    }
    // sample == total + 1: nothing retained
    Ok(Vec::new())
}
