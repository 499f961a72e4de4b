//! Core MP4 struct: top-level scan over a seekable source, with the
//! `moov` atom pulled into an in-memory buffer before its tree is parsed.
//!
//! ```no_run
//! use mp4split::Mp4;
//! use std::path::Path;
//!
//! fn main() -> Result<(), mp4split::Mp4Error> {
//!     let mut mp4 = Mp4::open(Path::new("VIDEO.MP4"))?;
//!
//!     for header in mp4.atoms() {
//!         println!("{} @ {} ({} bytes)", header.name(), header.offset(), header.atom_size());
//!     }
//!
//!     let (_, moov) = mp4.moov()?;
//!     println!("duration: {:.2} s", moov.mvhd().duration_seconds());
//!     Ok(())
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::atom::{copy_range, read_atoms, read_bytes};
use crate::atom_types::{Ftyp, Moov};
use crate::{AtomHeader, FourCC, Mp4Error};

/// MP4 reader over any seekable byte source.
#[derive(Debug)]
pub struct Mp4<R: Read + Seek> {
    reader: R,
    /// Source size in bytes.
    len: u64,
    /// Top-level atom headers in file order.
    atoms: Vec<AtomHeader>,
}

impl Mp4<BufReader<File>> {
    /// New `Mp4` over a file path.
    pub fn open(path: &Path) -> Result<Self, Mp4Error> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> Mp4<R> {
    /// New `Mp4` over a reader; scans the top-level box list eagerly.
    pub fn new(mut reader: R) -> Result<Self, Mp4Error> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        let atoms = read_atoms(&mut reader, len)?;
        Ok(Self { reader, len, atoms })
    }

    /// Source size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Top-level atom headers in file order.
    pub fn atoms(&self) -> &[AtomHeader] {
        &self.atoms
    }

    /// First top-level atom with the given FourCC.
    pub fn find(&self, name: &FourCC) -> Option<&AtomHeader> {
        self.atoms.iter().find(|a| &a.name == name)
    }

    /// The single top-level atom with the given FourCC;
    /// fails when there are none or several.
    pub(crate) fn select_one(
        &self,
        name: FourCC,
        display: &'static str,
    ) -> Result<&AtomHeader, Mp4Error> {
        let found = self.atoms.iter().filter(|a| a.name == name).count();
        match found {
            1 => Ok(self
                .atoms
                .iter()
                .find(|a| a.name == name)
                .ok_or_else(|| Mp4Error::NoSuchAtom(display.to_owned()))?),
            found => Err(Mp4Error::CannotSelect {
                name: display,
                min: 1,
                max: Some(1),
                found,
            }),
        }
    }

    /// Parses the `ftyp` atom.
    pub fn ftyp(&mut self) -> Result<Ftyp, Mp4Error> {
        let header = self.select_one(FourCC::Ftyp, "ftyp")?.clone();
        self.reader.seek(SeekFrom::Start(header.data_offset()))?;
        Ftyp::read(&header, &mut self.reader)
    }

    /// Buffers the whole `moov` atom in memory and parses the movie tree.
    ///
    /// Returns the on-disk header alongside; offsets inside the parsed
    /// tree are relative to the start of the `moov` atom.
    pub fn moov(&mut self) -> Result<(AtomHeader, Moov), Mp4Error> {
        let header = self.select_one(FourCC::Moov, "moov")?.clone();
        // Sample tables for hour-long content come to a few MB at most;
        // the mdat payload is never buffered.
        self.reader.seek(SeekFrom::Start(header.offset))?;
        let buf = read_bytes(&mut self.reader, header.atom_size)?;
        let mut cursor = Cursor::new(buf);
        let local = AtomHeader::read(&mut cursor, header.atom_size)?;
        let moov = Moov::read(&local, &mut cursor)?;
        Ok((header, moov))
    }

    /// Copies `len` bytes at absolute `offset` from the source into `writer`.
    pub fn copy_range<W: Write + ?Sized>(
        &mut self,
        writer: &mut W,
        offset: u64,
        len: u64,
    ) -> Result<(), Mp4Error> {
        copy_range(&mut self.reader, writer, offset, len)
    }
}
