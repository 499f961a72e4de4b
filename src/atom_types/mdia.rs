//! Media atom (`mdia`).
//!
//! Location: `moov/trak[multiple]/mdia`

use std::io::{Read, Seek, SeekFrom, Write};

use crate::atom::{write_atom_header, AtomHeader, RawAtom};
use crate::atom_types::{mdhd::Mdhd, minf::Minf};
use crate::{FourCC, Mp4Error};

/// Media atom (`mdia`). Carries the media header and media information;
/// the handler reference (`hdlr`) passes through raw.
#[derive(Debug, Clone)]
pub struct Mdia {
    pub(crate) offset: u64,
    pub(crate) mdhd: Mdhd,
    pub(crate) minf: Minf,
    pub(crate) others: Vec<RawAtom>,
}

impl Mdia {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        let end = header.offset_next_abs();
        let mut mdhd: Option<Mdhd> = None;
        let mut minf: Option<Minf> = None;
        let mut others = Vec::new();
        let mut pos = header.data_offset();
        while pos < end {
            reader.seek(SeekFrom::Start(pos))?;
            let child = AtomHeader::read(reader, end)?;
            if child.offset_next_abs() > end {
                return Err(Mp4Error::Format(format!(
                    "atom '{}' overruns its 'mdia' container",
                    child.name
                )));
            }
            match child.name {
                FourCC::Mdhd => {
                    if mdhd.is_some() {
                        return Err(Mp4Error::CannotSelect {
                            name: "mdhd",
                            min: 1,
                            max: Some(1),
                            found: 2,
                        });
                    }
                    mdhd = Some(Mdhd::read(&child, reader)?);
                }
                FourCC::Minf => {
                    if minf.is_some() {
                        return Err(Mp4Error::CannotSelect {
                            name: "minf",
                            min: 1,
                            max: Some(1),
                            found: 2,
                        });
                    }
                    minf = Some(Minf::read(&child, reader)?);
                }
                _ => others.push(RawAtom::read(&child, reader)?),
            }
            pos = child.offset_next_abs();
        }
        let mdhd = mdhd.ok_or(Mp4Error::CannotSelect {
            name: "mdhd",
            min: 1,
            max: Some(1),
            found: 0,
        })?;
        let minf = minf.ok_or(Mp4Error::CannotSelect {
            name: "minf",
            min: 1,
            max: Some(1),
            found: 0,
        })?;
        Ok(Self {
            offset: header.offset,
            mdhd,
            minf,
            others,
        })
    }

    pub(crate) fn size(&self) -> u64 {
        8 + self.mdhd.size() + self.minf.size() + self.others.iter().map(RawAtom::size).sum::<u64>()
    }

    pub(crate) fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        write_atom_header(writer, &FourCC::Mdia, self.size())?;

        enum Child<'a> {
            Mdhd(&'a Mdhd),
            Minf(&'a Minf),
            Other(&'a RawAtom),
        }

        let mut children: Vec<(u64, Child)> = vec![
            (self.mdhd.offset, Child::Mdhd(&self.mdhd)),
            (self.minf.offset, Child::Minf(&self.minf)),
        ];
        children.extend(self.others.iter().map(|o| (o.offset, Child::Other(o))));
        children.sort_by_key(|(offset, _)| *offset);

        for (_, child) in children {
            match child {
                Child::Mdhd(b) => b.write(writer)?,
                Child::Minf(b) => b.write(writer)?,
                Child::Other(b) => b.write(writer)?,
            }
        }
        Ok(())
    }

    pub fn mdhd(&self) -> &Mdhd {
        &self.mdhd
    }

    pub fn minf(&self) -> &Minf {
        &self.minf
    }
}
