//! Split ISO MPEG-4 (MP4/ISOBMFF) files at a point in time, or move the
//! movie header ahead of the media data for HTTP progressive playback.
//! Operates purely on the container structure; does not and will not
//! de/encode the media itself.
//!
//! Fragmented MP4 (`moof`/`traf`) is not supported.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use mp4split::{move_header_and_write, split_and_write, sync_points};
//!
//! fn main() -> Result<(), mp4split::Mp4Error> {
//!     let mut input = BufReader::new(File::open("VIDEO.MP4")?);
//!
//!     // Keyframe times, to pick a clean split point from
//!     println!("{:?}", sync_points(&mut input)?);
//!
//!     // Drop everything before the sample boundary at or before 5 s
//!     let mut output = File::create("VIDEO_5S.MP4")?;
//!     split_and_write(&mut input, &mut output, 5.0)?;
//!
//!     // Relocate the movie header for progressive playback
//!     let mut faststart = File::create("VIDEO_FAST.MP4")?;
//!     let moved = move_header_and_write(&mut input, &mut faststart)?;
//!     println!("relocated moov: {moved}");
//!     Ok(())
//! }
//! ```

pub mod atom;
pub mod atom_types;
pub mod consts;
pub mod errors;
pub mod fourcc;
pub mod fstart;
pub mod mp4;
pub mod split;
pub mod splitter;
pub mod tests;

pub use atom::{read_atoms, AtomHeader, RawAtom};
pub use atom_types::{
    ChunkOffsets,
    Co64,
    CompositionOffset,
    Ctts,
    Ftyp,
    Mdhd,
    Mdia,
    Minf,
    Moov,
    Mvhd,
    SampleSizes,
    SampleToChunk,
    Stbl,
    Stco,
    Stsc,
    Stss,
    Stsz,
    Stts,
    Stz2,
    TimeToSample,
    Tkhd,
    Trak,
};
pub use consts::{mp4_time_zero, CONTAINER};
pub use errors::Mp4Error;
pub use fourcc::FourCC;
pub use fstart::move_header_and_write;
pub use mp4::Mp4;
pub use split::{split, split_and_write, split_into_buffer, sync_points};
pub use splitter::{Fed, Request, Splitter};
