//! Media information atom (`minf`).
//!
//! Location: `moov/trak[multiple]/mdia/minf`

use std::io::{Read, Seek, SeekFrom, Write};

use crate::atom::{write_atom_header, AtomHeader, RawAtom};
use crate::atom_types::stbl::Stbl;
use crate::{FourCC, Mp4Error};

/// Media information atom (`minf`). Carries the sample table; media
/// handler specifics (`vmhd`, `smhd`, `dinf`, ...) pass through raw.
#[derive(Debug, Clone)]
pub struct Minf {
    pub(crate) offset: u64,
    pub(crate) stbl: Stbl,
    pub(crate) others: Vec<RawAtom>,
}

impl Minf {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let end = header.offset_next_abs();
        let mut stbl: Option<Stbl> = None;
        let mut others = Vec::new();
        let mut pos = header.data_offset();
        while pos < end {
            reader.seek(SeekFrom::Start(pos))?;
            let child = AtomHeader::read(reader, end)?;
            if child.offset_next_abs() > end {
                return Err(Mp4Error::Format(format!(
                    "atom '{}' overruns its 'minf' container",
                    child.name
                )));
            }
            match child.name {
                FourCC::Stbl => {
                    if stbl.is_some() {
                        return Err(Mp4Error::CannotSelect {
                            name: "stbl",
                            min: 1,
                            max: Some(1),
                            found: 2,
                        });
                    }
                    stbl = Some(Stbl::read(&child, reader)?);
                }
                _ => others.push(RawAtom::read(&child, reader)?),
            }
            pos = child.offset_next_abs();
        }
        let stbl = stbl.ok_or(Mp4Error::CannotSelect {
            name: "stbl",
            min: 1,
            max: Some(1),
            found: 0,
        })?;
        Ok(Self {
            offset: header.offset,
            stbl,
            others,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        8 + self.stbl.size() + self.others.iter().map(RawAtom::size).sum::<u64>()
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_atom_header(writer, &FourCC::Minf, self.size())?;

        enum Child<'a> {
            Stbl(&'a Stbl),
            Other(&'a RawAtom),
        }

        let mut children: Vec<(u64, Child)> = vec![(self.stbl.offset, Child::Stbl(&self.stbl))];
        children.extend(self.others.iter().map(|o| (o.offset, Child::Other(o))));
        children.sort_by_key(|(offset, _)| *offset);

        for (_, child) in children {
            match child {
                Child::Stbl(b) => b.write(writer)?,
                Child::Other(b) => b.write(writer)?,
            }
        }
        Ok(())
    }

    pub fn stbl(&self) -> &Stbl {
        &self.stbl
    }
}
