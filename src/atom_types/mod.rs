//! Typed representations of the atoms the splitter reads and rewrites.
//! Every other atom is carried through as a [`RawAtom`](crate::RawAtom).

mod co64;
mod ctts;
mod ftyp;
mod mdhd;
mod mdia;
mod minf;
mod moov;
mod mvhd;
mod stbl;
mod stco;
mod stsc;
mod stss;
mod stsz;
mod stts;
mod tkhd;
mod trak;

pub use co64::Co64;
pub use ctts::{CompositionOffset, Ctts};
pub use ftyp::Ftyp;
pub use mdhd::Mdhd;
pub use mdia::Mdia;
pub use minf::Minf;
pub use moov::Moov;
pub use mvhd::Mvhd;
pub use stbl::Stbl;
pub use stco::{ChunkOffsets, Stco};
pub use stsc::{SampleToChunk, Stsc};
pub use stss::Stss;
pub use stsz::{SampleSizes, Stsz, Stz2};
pub use stts::{Stts, TimeToSample};
pub use tkhd::Tkhd;
pub use trak::Trak;
