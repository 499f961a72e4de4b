//! File type compatibility atom (`ftyp`).
//!
//! Location: `ftyp` (the very first atom in an MP4 file)
//!
//! Never rewritten; the splitter and the fast-start mover copy it
//! through verbatim. Parsed only for validation and reporting.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/file_type_compatibility_atom>

use std::io::{Read, Seek};

use binrw::BinReaderExt;

use crate::atom::AtomHeader;
use crate::Mp4Error;

/// File type compatibility atom (`ftyp`).
#[derive(Debug, Clone)]
pub struct Ftyp {
    pub(crate) offset: u64,
    pub(crate) major_brand: [u8; 4],
    pub(crate) minor_version: u32,
    pub(crate) compatible_brands: Vec<[u8; 4]>,
}

impl Ftyp {
    pub(crate) fn read<R: Read + Seek>(
        header: &AtomHeader,
        reader: &mut R,
    ) -> Result<Self, Mp4Error> {
        if header.data_size() < 8 {
            return Err(Mp4Error::Format(format!(
                "ftyp data load of {} bytes is too small",
                header.data_size()
            )));
        }
        let mut major_brand = [0_u8; 4];
        reader.read_exact(&mut major_brand)?;
        let minor_version = reader.read_be::<u32>()?;
        let compatible_brands = (0..(header.data_size() - 8) / 4)
            .map(|_| {
                let mut brand = [0_u8; 4];
                reader.read_exact(&mut brand).map(|_| brand)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            offset: header.offset,
            major_brand,
            minor_version,
            compatible_brands,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn major_brand(&self) -> String {
        self.major_brand.iter().map(|b| *b as char).collect()
    }

    pub fn minor_version(&self) -> u32 {
        self.minor_version
    }

    pub fn compatible_brands(&self) -> Vec<String> {
        self.compatible_brands
            .iter()
            .map(|brand| brand.iter().map(|b| *b as char).collect::<String>())
            .collect()
    }
}
