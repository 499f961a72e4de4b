//! Sample table atom (`stbl`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl`
//!
//! Holds the interlocking sample tables: exactly one `stts` and `stsc`,
//! exactly one of `stsz`/`stz2`, exactly one of `stco`/`co64`, optional
//! `stss` and `ctts`. Anything else (`stsd`, `sdtp`, ...) passes through
//! untouched.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::atom::{write_atom_header, AtomHeader, RawAtom};
use crate::atom_types::{
    co64::Co64, ctts::Ctts, stco::{ChunkOffsets, Stco}, stsc::Stsc, stss::Stss,
    stsz::{SampleSizes, Stsz, Stz2}, stts::Stts,
};
use crate::{FourCC, Mp4Error};

/// Sample table atom (`stbl`).
#[derive(Debug, Clone)]
pub struct Stbl {
    pub(crate) offset: u64,
    pub(crate) stts: Stts,
    pub(crate) ctts: Option<Ctts>,
    pub(crate) stss: Option<Stss>,
    pub(crate) sizes: SampleSizes,
    pub(crate) stsc: Stsc,
    pub(crate) offsets: ChunkOffsets,
    pub(crate) others: Vec<RawAtom>,
}

fn set_unique<T>(slot: &mut Option<T>, value: T, name: &'static str) -> Result<(), Mp4Error> {
    if slot.is_some() {
        return Err(Mp4Error::CannotSelect {
            name,
            min: 0,
            max: Some(1),
            found: 2,
        });
    }
    *slot = Some(value);
    Ok(())
}

impl Stbl {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let end = header.offset_next_abs();
        let mut stts: Option<Stts> = None;
        let mut ctts: Option<Ctts> = None;
        let mut stss: Option<Stss> = None;
        let mut stsz: Option<Stsz> = None;
        let mut stz2: Option<Stz2> = None;
        let mut stsc: Option<Stsc> = None;
        let mut stco: Option<Stco> = None;
        let mut co64: Option<Co64> = None;
        let mut others = Vec::new();

        let mut pos = header.data_offset();
        while pos < end {
            reader.seek(SeekFrom::Start(pos))?;
            let child = AtomHeader::read(reader, end)?;
            if child.offset_next_abs() > end {
                return Err(Mp4Error::Format(format!(
                    "atom '{}' overruns its 'stbl' container",
                    child.name
                )));
            }
            match child.name {
                FourCC::Stts => set_unique(&mut stts, Stts::read(&child, reader)?, "stts")?,
                FourCC::Ctts => set_unique(&mut ctts, Ctts::read(&child, reader)?, "ctts")?,
                FourCC::Stss => set_unique(&mut stss, Stss::read(&child, reader)?, "stss")?,
                FourCC::Stsz => set_unique(&mut stsz, Stsz::read(&child, reader)?, "stsz")?,
                FourCC::Stz2 => set_unique(&mut stz2, Stz2::read(&child, reader)?, "stz2")?,
                FourCC::Stsc => set_unique(&mut stsc, Stsc::read(&child, reader)?, "stsc")?,
                FourCC::Stco => set_unique(&mut stco, Stco::read(&child, reader)?, "stco")?,
                FourCC::Co64 => set_unique(&mut co64, Co64::read(&child, reader)?, "co64")?,
                _ => others.push(RawAtom::read(&child, reader)?),
            }
            pos = child.offset_next_abs();
        }

        let stts = stts.ok_or(Mp4Error::CannotSelect {
            name: "stts",
            min: 1,
            max: Some(1),
            found: 0,
        })?;
        let stsc = stsc.ok_or(Mp4Error::CannotSelect {
            name: "stsc",
            min: 1,
            max: Some(1),
            found: 0,
        })?;
        let sizes = match (stsz, stz2) {
            (Some(b), None) => SampleSizes::Stsz(b),
            (None, Some(b)) => SampleSizes::Stz2(b),
            (a, b) => {
                return Err(Mp4Error::CannotSelect {
                    name: "stsz/stz2",
                    min: 1,
                    max: Some(1),
                    found: a.is_some() as usize + b.is_some() as usize,
                })
            }
        };
        let offsets = match (stco, co64) {
            (Some(b), None) => ChunkOffsets::Stco(b),
            (None, Some(b)) => ChunkOffsets::Co64(b),
            (a, b) => {
                return Err(Mp4Error::CannotSelect {
                    name: "stco/co64",
                    min: 1,
                    max: Some(1),
                    found: a.is_some() as usize + b.is_some() as usize,
                })
            }
        };

        Ok(Self {
            offset: header.offset,
            stts,
            ctts,
            stss,
            sizes,
            stsc,
            offsets,
            others,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        8 + self.stts.size()
            + self.ctts.as_ref().map_or(0, Ctts::size)
            + self.stss.as_ref().map_or(0, Stss::size)
            + self.sizes.size()
            + self.stsc.size()
            + self.offsets.size()
            + self.others.iter().map(RawAtom::size).sum::<u64>()
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_atom_header(writer, &FourCC::Stbl, self.size())?;

        enum Child<'a> {
            Stts(&'a Stts),
            Ctts(&'a Ctts),
            Stss(&'a Stss),
            Sizes(&'a SampleSizes),
            Stsc(&'a Stsc),
            Offsets(&'a ChunkOffsets),
            Other(&'a RawAtom),
        }

        let mut children: Vec<(u64, Child)> = vec![
            (self.stts.offset, Child::Stts(&self.stts)),
            (self.sizes.offset(), Child::Sizes(&self.sizes)),
            (self.stsc.offset, Child::Stsc(&self.stsc)),
            (self.offsets.offset(), Child::Offsets(&self.offsets)),
        ];
        if let Some(ctts) = &self.ctts {
            children.push((ctts.offset, Child::Ctts(ctts)));
        }
        if let Some(stss) = &self.stss {
            children.push((stss.offset, Child::Stss(stss)));
        }
        children.extend(self.others.iter().map(|o| (o.offset, Child::Other(o))));
        children.sort_by_key(|(offset, _)| *offset);

        for (_, child) in children {
            match child {
                Child::Stts(b) => b.write(writer)?,
                Child::Ctts(b) => b.write(writer)?,
                Child::Stss(b) => b.write(writer)?,
                Child::Sizes(b) => b.write(writer)?,
                Child::Stsc(b) => b.write(writer)?,
                Child::Offsets(b) => b.write(writer)?,
                Child::Other(b) => b.write(writer)?,
            }
        }
        Ok(())
    }

    pub fn stts(&self) -> &Stts {
        &self.stts
    }

    pub fn stsc(&self) -> &Stsc {
        &self.stsc
    }

    pub fn sample_sizes(&self) -> &SampleSizes {
        &self.sizes
    }

    pub fn chunk_offsets(&self) -> &ChunkOffsets {
        &self.offsets
    }

    pub fn sync_samples(&self) -> Option<&Stss> {
        self.stss.as_ref()
    }
}
