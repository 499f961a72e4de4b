//! Track atom (`trak`).
//!
//! Location: `moov/trak` (one per track)

use std::io::{Read, Seek, SeekFrom, Write};

use crate::atom::{write_atom_header, AtomHeader, RawAtom};
use crate::atom_types::{mdia::Mdia, stbl::Stbl, tkhd::Tkhd};
use crate::{FourCC, Mp4Error};

/// Track atom (`trak`). Carries the track header and media tree;
/// edit lists (`edts`) and references pass through raw.
#[derive(Debug, Clone)]
pub struct Trak {
    pub(crate) offset: u64,
    pub(crate) tkhd: Tkhd,
    pub(crate) mdia: Mdia,
    pub(crate) others: Vec<RawAtom>,
}

impl Trak {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let end = header.offset_next_abs();
        let mut tkhd: Option<Tkhd> = None;
        let mut mdia: Option<Mdia> = None;
        let mut others = Vec::new();
        let mut pos = header.data_offset();
        while pos < end {
            reader.seek(SeekFrom::Start(pos))?;
            let child = AtomHeader::read(reader, end)?;
            if child.offset_next_abs() > end {
                return Err(Mp4Error::Format(format!(
                    "atom '{}' overruns its 'trak' container",
                    child.name
                )));
            }
            match child.name {
                FourCC::Tkhd => {
                    if tkhd.is_some() {
                        return Err(Mp4Error::CannotSelect {
                            name: "tkhd",
                            min: 1,
                            max: Some(1),
                            found: 2,
                        });
                    }
                    tkhd = Some(Tkhd::read(&child, reader)?);
                }
                FourCC::Mdia => {
                    if mdia.is_some() {
                        return Err(Mp4Error::CannotSelect {
                            name: "mdia",
                            min: 1,
                            max: Some(1),
                            found: 2,
                        });
                    }
                    mdia = Some(Mdia::read(&child, reader)?);
                }
                _ => others.push(RawAtom::read(&child, reader)?),
            }
            pos = child.offset_next_abs();
        }
        let tkhd = tkhd.ok_or(Mp4Error::CannotSelect {
            name: "tkhd",
            min: 1,
            max: Some(1),
            found: 0,
        })?;
        let mdia = mdia.ok_or(Mp4Error::CannotSelect {
            name: "mdia",
            min: 1,
            max: Some(1),
            found: 0,
        })?;
        Ok(Self {
            offset: header.offset,
            tkhd,
            mdia,
            others,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        8 + self.tkhd.size() + self.mdia.size() + self.others.iter().map(RawAtom::size).sum::<u64>()
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_atom_header(writer, &FourCC::Trak, self.size())?;

        enum Child<'a> {
            Tkhd(&'a Tkhd),
            Mdia(&'a Mdia),
            Other(&'a RawAtom),
        }

        let mut children: Vec<(u64, Child)> = vec![
            (self.tkhd.offset, Child::Tkhd(&self.tkhd)),
            (self.mdia.offset, Child::Mdia(&self.mdia)),
        ];
        children.extend(self.others.iter().map(|o| (o.offset, Child::Other(o))));
        children.sort_by_key(|(offset, _)| *offset);

        for (_, child) in children {
            match child {
                Child::Tkhd(b) => b.write(writer)?,
                Child::Mdia(b) => b.write(writer)?,
                Child::Other(b) => b.write(writer)?,
            }
        }
        Ok(())
    }

    pub fn tkhd(&self) -> &Tkhd {
        &self.tkhd
    }

    pub fn mdia(&self) -> &Mdia {
        &self.mdia
    }

    /// This track's sample table.
    pub fn stbl(&self) -> &Stbl {
        &self.mdia.minf.stbl
    }
}
