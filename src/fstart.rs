//! Fast start: relocate the `moov` atom ahead of `mdat` so HTTP
//! progressive playback can begin before the whole file arrives.
//!
//! Moving `moov` forward slides `mdat` by the `moov` size, so every
//! chunk offset grows by that amount. A 32-bit `stco` that no longer
//! fits is widened to `co64`, which itself grows `moov` and feeds back
//! into the shift; the loop below runs that to a fixed point.

use std::io::{Cursor, Read, Seek, Write};

use log::debug;

use crate::atom_types::ChunkOffsets;
use crate::{FourCC, Mp4, Mp4Error};

/// Rewrites `reader` into `writer` with the `moov` atom ahead of `mdat`.
///
/// Returns `true` when the header was moved. A source that is already
/// streamable (or has no `mdat` at all) is copied through byte-exactly
/// and `false` is returned.
pub fn move_header_and_write<R, W>(reader: &mut R, writer: &mut W) -> Result<bool, Mp4Error>
where
    R: Read + Seek,
    W: Write,
{
    let mut mp4 = Mp4::new(&mut *reader)?;
    let moov_header = mp4
        .find(&FourCC::Moov)
        .ok_or_else(|| Mp4Error::NoSuchAtom("moov".to_owned()))?
        .clone();
    let mdat_header = match mp4.find(&FourCC::Mdat).cloned() {
        Some(mdat) if mdat.offset < moov_header.offset => mdat,
        _ => {
            debug!("'moov' already precedes 'mdat', passing input through");
            let len = mp4.len();
            mp4.copy_range(writer, 0, len)?;
            return Ok(false);
        }
    };

    let (_, mut moov) = mp4.moov()?;

    let mut shift = moov.size();
    loop {
        let mut widened = false;
        for trak in &mut moov.traks {
            let stbl = &mut trak.mdia.minf.stbl;
            let overflows = matches!(&stbl.offsets, ChunkOffsets::Stco(_))
                && stbl.offsets.max_offset() + shift > u32::MAX as u64;
            if overflows {
                debug!(
                    "track {}: widening stco to co64 for a {shift} byte shift",
                    trak.tkhd.track_id()
                );
                stbl.offsets = stbl.offsets.widened();
                widened = true;
            }
        }
        let new_shift = moov.size();
        if !widened && new_shift == shift {
            break;
        }
        shift = new_shift;
    }

    for trak in &mut moov.traks {
        let stbl = &mut trak.mdia.minf.stbl;
        stbl.offsets = stbl.offsets.shifted(shift)?;
    }
    debug!("moving {shift} byte 'moov' ahead of 'mdat'");

    let atoms = mp4.atoms().to_vec();
    // Everything before mdat stays put ('moov' follows 'mdat' here).
    for header in &atoms {
        if header.offset == mdat_header.offset {
            break;
        }
        mp4.copy_range(writer, header.offset, header.atom_size)?;
    }
    let mut buf = Cursor::new(Vec::new());
    moov.write(&mut buf)?;
    writer.write_all(buf.get_ref())?;
    // mdat and everything after it, minus the original moov.
    for header in &atoms {
        if header.offset < mdat_header.offset || header.offset == moov_header.offset {
            continue;
        }
        mp4.copy_range(writer, header.offset, header.atom_size)?;
    }
    Ok(true)
}
