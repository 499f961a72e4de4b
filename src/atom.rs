//! The atom layer: scanning box headers, raw pass-through atoms,
//! and the primitives for writing headers back.
//!
//! ```ignore
//! | [X X X X] [Y Y Y Y] [Z Z Z Z Z Z Z Z] |
//!    |         |         |
//!    |         |         64bit size (optional, only if 32 bit size == 1)
//!    |         FourCC
//!    32bit size
//! ```

use std::io::{Read, Seek, SeekFrom, Write};

use binrw::{BinReaderExt, BinWriterExt};

use crate::{consts::CONTAINER, FourCC, Mp4Error};

/// Size of the 8 byte atom header plus the version/flags word of a full box.
pub(crate) const FULL_BOX_HEAD: u64 = 12;

/// Atom header.
/// 8 or 16 bytes in MP4, depending on whether
/// the size is stored as 32 or 64 bits.
#[derive(Debug, Clone)]
pub struct AtomHeader {
    /// FourCC
    pub(crate) name: FourCC,
    /// Absolute byte offset for start of atom,
    /// i.e. byte offset of its 32-bit size word.
    pub(crate) offset: u64,
    /// Total atom size in bytes including the 8/16 byte header.
    pub(crate) atom_size: u64,
    /// The raw 32-bit size word: 0 (atom extends to end of source),
    /// 1 (64-bit size follows the FourCC) or the literal size.
    pub(crate) real_size: u32,
}

impl AtomHeader {
    /// Reads the header at the current position.
    /// `stream_end` bounds the enclosing region and resolves
    /// "extends to end" (size 0) atoms.
    ///
    /// Leaves the reader at the first byte of the data load.
    pub fn read<R: Read + Seek>(reader: &mut R, stream_end: u64) -> Result<Self, Mp4Error> {
        let offset = reader.stream_position()?;
        let real_size = reader.read_be::<u32>()?;
        let name = FourCC::from_u32(reader.read_be::<u32>()?);
        let atom_size = match real_size {
            1 => reader.read_be::<u64>()?,
            0 => stream_end.saturating_sub(offset),
            n => n as u64,
        };
        let header = Self {
            name,
            offset,
            atom_size,
            real_size,
        };
        if header.atom_size < header.header_size() as u64 {
            return Err(Mp4Error::Format(format!(
                "atom '{}' @ {} is smaller than its {} byte header",
                header.name,
                offset,
                header.header_size()
            )));
        }
        Ok(header)
    }

    pub fn name(&self) -> &FourCC {
        &self.name
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn atom_size(&self) -> u64 {
        self.atom_size
    }

    /// Header size in bytes: 8, or 16 when the size was stored as 64 bits.
    pub fn header_size(&self) -> u8 {
        match self.real_size {
            1 => 16,
            _ => 8,
        }
    }

    /// Data load absolute offset, i.e. position after the header,
    /// adjusted for an optional 64bit size value.
    pub fn data_offset(&self) -> u64 {
        self.offset + self.header_size() as u64
    }

    /// Size of data load (excludes the header).
    pub fn data_size(&self) -> u64 {
        self.atom_size - self.header_size() as u64
    }

    /// Absolute offset of the next sibling atom.
    pub fn offset_next_abs(&self) -> u64 {
        self.offset + self.atom_size
    }

    /// Whether this atom nests further atoms.
    pub fn is_container(&self) -> bool {
        CONTAINER.iter().any(|c| *c == self.name.to_str())
    }
}

/// Scans atom headers from the current reader position up to `stream_end`
/// without descending into containers.
///
/// An atom spanning past `stream_end` terminates the scan (its header is
/// still returned); headers always tile a well-formed region exactly.
pub fn read_atoms<R: Read + Seek>(
    reader: &mut R,
    stream_end: u64,
) -> Result<Vec<AtomHeader>, Mp4Error> {
    let mut atoms = Vec::new();
    let mut pos = reader.stream_position()?;
    while pos < stream_end {
        reader.seek(SeekFrom::Start(pos))?;
        let header = AtomHeader::read(reader, stream_end)?;
        pos = header.offset_next_abs();
        atoms.push(header);
    }
    Ok(atoms)
}

/// An atom this crate does not interpret, carried as its exact source
/// bytes (header included) so it round-trips bit-exactly.
#[derive(Debug, Clone)]
pub struct RawAtom {
    pub(crate) name: FourCC,
    pub(crate) offset: u64,
    pub(crate) data: Vec<u8>,
}

impl RawAtom {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        reader.seek(SeekFrom::Start(header.offset))?;
        let data = read_bytes(reader, header.atom_size)?;
        Ok(Self {
            name: header.name.clone(),
            offset: header.offset,
            data,
        })
    }

    pub fn name(&self) -> &FourCC {
        &self.name
    }

    pub(crate) fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut W) -> Result<(), Mp4Error> {
        writer.write_all(&self.data)?;
        Ok(())
    }
}

/// Length-checked byte read. Fails with `ShortRead` if fewer
/// than `len` bytes are available.
pub(crate) fn read_bytes<R: Read>(reader: &mut R, len: u64) -> Result<Vec<u8>, Mp4Error> {
    let len = usize::try_from(len)
        .map_err(|_| Mp4Error::Format(format!("cannot buffer {len} bytes")))?;
    let mut buf = vec![0_u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Reads the version byte and 24-bit flags of a full box.
pub(crate) fn read_version_flags<R: Read + Seek>(
    reader: &mut R,
) -> Result<(u8, [u8; 3]), Mp4Error> {
    let version = reader.read_be::<u8>()?;
    let mut flags = [0_u8; 3];
    reader.read_exact(&mut flags)?;
    Ok((version, flags))
}

/// Writes an 8 byte atom header. Rebuilt atoms always use 32-bit sizes.
pub(crate) fn write_atom_header<W: Write + Seek>(
    writer: &mut W,
    name: &FourCC,
    size: u64,
) -> Result<(), Mp4Error> {
    let size = u32::try_from(size).map_err(|_| Mp4Error::OffsetOverflow)?;
    writer.write_be(&size)?;
    writer.write_all(&name.to_bytes())?;
    Ok(())
}

/// Writes an atom header followed by the version/flags word.
pub(crate) fn write_full_box_head<W: Write + Seek>(
    writer: &mut W,
    name: &FourCC,
    size: u64,
    version: u8,
    flags: [u8; 3],
) -> Result<(), Mp4Error> {
    write_atom_header(writer, name, size)?;
    writer.write_be(&version)?;
    writer.write_all(&flags)?;
    Ok(())
}

/// Copies `len` bytes at absolute `offset` from `reader` into `writer`.
pub(crate) fn copy_range<R, W>(
    reader: &mut R,
    writer: &mut W,
    offset: u64,
    len: u64,
) -> Result<(), Mp4Error>
where
    R: Read + Seek,
    W: Write + ?Sized,
{
    reader.seek(SeekFrom::Start(offset))?;
    let copied = std::io::copy(&mut reader.by_ref().take(len), writer)?;
    if copied != len {
        return Err(Mp4Error::ShortRead);
    }
    Ok(())
}
