//! Movie atom (`moov`).
//!
//! The metadata root: one `mvhd`, one or more `trak`, and whatever
//! else the producer put there (`udta`, `iods`, ...), which is carried
//! through byte-exactly in its original position.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::atom::{write_atom_header, AtomHeader, RawAtom};
use crate::atom_types::{mvhd::Mvhd, trak::Trak};
use crate::{FourCC, Mp4Error};

/// Movie atom (`moov`).
#[derive(Debug, Clone)]
pub struct Moov {
    pub(crate) offset: u64,
    pub(crate) mvhd: Mvhd,
    pub(crate) traks: Vec<Trak>,
    pub(crate) others: Vec<RawAtom>,
}

impl Moov {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let end = header.offset_next_abs();
        let mut mvhd: Option<Mvhd> = None;
        let mut traks = Vec::new();
        let mut others = Vec::new();
        let mut pos = header.data_offset();
        while pos < end {
            reader.seek(SeekFrom::Start(pos))?;
            let child = AtomHeader::read(reader, end)?;
            if child.offset_next_abs() > end {
                return Err(Mp4Error::Format(format!(
                    "atom '{}' overruns its 'moov' container",
                    child.name
                )));
            }
            match child.name {
                FourCC::Mvhd => {
                    if mvhd.is_some() {
                        return Err(Mp4Error::CannotSelect {
                            name: "mvhd",
                            min: 1,
                            max: Some(1),
                            found: 2,
                        });
                    }
                    mvhd = Some(Mvhd::read(&child, reader)?);
                }
                FourCC::Trak => traks.push(Trak::read(&child, reader)?),
                _ => others.push(RawAtom::read(&child, reader)?),
            }
            pos = child.offset_next_abs();
        }
        let mvhd = mvhd.ok_or(Mp4Error::CannotSelect {
            name: "mvhd",
            min: 1,
            max: Some(1),
            found: 0,
        })?;
        if traks.is_empty() {
            return Err(Mp4Error::CannotSelect {
                name: "trak",
                min: 1,
                max: None,
                found: 0,
            });
        }
        Ok(Self {
            offset: header.offset,
            mvhd,
            traks,
            others,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        8 + self.mvhd.size()
            + self.traks.iter().map(Trak::size).sum::<u64>()
            + self.others.iter().map(RawAtom::size).sum::<u64>()
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_atom_header(writer, &FourCC::Moov, self.size())?;

        enum Child<'a> {
            Mvhd(&'a Mvhd),
            Trak(&'a Trak),
            Other(&'a RawAtom),
        }

        let mut children: Vec<(u64, Child)> =
            vec![(self.mvhd.offset, Child::Mvhd(&self.mvhd))];
        children.extend(self.traks.iter().map(|t| (t.offset, Child::Trak(t))));
        children.extend(self.others.iter().map(|o| (o.offset, Child::Other(o))));
        children.sort_by_key(|(offset, _)| *offset);

        for (_, child) in children {
            match child {
                Child::Mvhd(b) => b.write(writer)?,
                Child::Trak(b) => b.write(writer)?,
                Child::Other(b) => b.write(writer)?,
            }
        }
        Ok(())
    }

    pub fn mvhd(&self) -> &Mvhd {
        &self.mvhd
    }

    pub fn traks(&self) -> &[Trak] {
        &self.traks
    }
}
