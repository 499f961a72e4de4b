//! The cut engine: discard media data before a point in time and rebuild
//! every sample table so the remaining track stays decodable.
//!
//! The cut lands on the chunk holding the sample at or before the
//! requested time; it is not snapped to a sync sample. Callers that need
//! a clean decoder restart can pick a time from [`sync_points`] first.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use binrw::BinWriterExt;
use log::debug;
use rayon::prelude::*;

use crate::atom::copy_range;
use crate::atom_types::{Moov, Trak};
use crate::{FourCC, Mp4, Mp4Error};

/// Per-track cut point.
struct TrakCut {
    /// First retained sample, 1-based.
    sample: u64,
    /// Offset of the first chunk of the track.
    zero_offset: u64,
    /// Offset of the chunk holding `sample`.
    cut_offset: u64,
}

/// Resolves time `t` to a sample, its chunk and that chunk's offset
/// for one track.
fn find_cut_trak_info(trak: &Trak, t: f64) -> Result<TrakCut, Mp4Error> {
    let time_scale = trak.mdia.mdhd.time_scale;
    if time_scale == 0 {
        return Err(Mp4Error::Format(format!(
            "track {} has media timescale 0",
            trak.tkhd.track_id
        )));
    }
    let stbl = trak.stbl();
    let total = stbl.stts.sample_sum();
    if total == 0 {
        return Err(Mp4Error::Format(format!(
            "track {} has no samples",
            trak.tkhd.track_id
        )));
    }
    let mt = (t * time_scale as f64).floor() as u64;
    let mut sample = stbl.stts.sample_at_time(mt);
    if sample > total {
        // A track that ends before `t` keeps its final sample so it still
        // contributes a chunk offset to the cut point.
        debug!(
            "track {}: clamping cut sample {sample} to final sample {total}",
            trak.tkhd.track_id
        );
        sample = total;
    }
    let chunk = stbl.stsc.chunk_containing(sample)?;
    let zero_offset = stbl
        .offsets
        .get(1)
        .ok_or_else(|| Mp4Error::Format("empty chunk offset table".into()))?;
    let cut_offset = stbl.offsets.get(chunk).ok_or_else(|| {
        Mp4Error::Format(format!("chunk {chunk} outside the chunk offset table"))
    })?;
    debug!(
        "track {}: time {t} s = media time {mt}/{time_scale} -> sample {sample}, chunk {chunk}",
        trak.tkhd.track_id
    );
    Ok(TrakCut {
        sample,
        zero_offset,
        cut_offset,
    })
}

/// Rebuilds one track with every sample table cut at `sample` and chunk
/// offsets lowered by `data_offset_change`.
fn cut_trak(trak: &Trak, sample: u64, data_offset_change: u64) -> Result<Trak, Mp4Error> {
    let stbl = trak.stbl();
    let chunk = stbl.stsc.chunk_containing(sample)?;
    debug!(
        "track {}: cutting at sample {sample} (chunk {chunk})",
        trak.tkhd.track_id
    );
    let media_time_diff = stbl.stts.time_at_sample(sample);

    let mut new_trak = trak.clone();
    new_trak.mdia.mdhd.duration = trak.mdia.mdhd.duration.saturating_sub(media_time_diff);

    let new_stbl = &mut new_trak.mdia.minf.stbl;
    new_stbl.offsets = stbl.offsets.cut(chunk, data_offset_change)?;
    new_stbl.stsc = stbl.stsc.cut(chunk)?;
    new_stbl.sizes = stbl.sizes.cut(sample)?;
    new_stbl.stts = stbl.stts.cut(sample)?;
    if let Some(ctts) = &stbl.ctts {
        new_stbl.ctts = Some(ctts.cut(sample)?);
    }
    if let Some(stss) = &stbl.stss {
        new_stbl.stss = Some(stss.cut(sample));
    }
    Ok(new_trak)
}

/// Cuts the movie tree at time `t`.
///
/// Returns the rebuilt `moov`, the number of discarded media data bytes
/// and the absolute source offset the caller copies retained data from.
fn cut_moov(moov: &Moov, moov_disk_size: u64, t: f64) -> Result<(Moov, u64, u64), Mp4Error> {
    let time_scale = moov.mvhd.time_scale;
    if t * time_scale as f64 >= moov.mvhd.duration as f64 {
        return Err(Mp4Error::TimeOutOfRange {
            requested: t,
            duration: moov.mvhd.duration_seconds(),
        });
    }
    debug!(
        "movie timescale {time_scale}, {} tracks",
        moov.traks.len()
    );

    let cut_info = moov
        .traks
        .iter()
        .map(|trak| find_cut_trak_info(trak, t))
        .collect::<Result<Vec<_>, _>>()?;
    let new_data_offset = cut_info
        .iter()
        .map(|ci| ci.cut_offset)
        .min()
        .ok_or_else(|| Mp4Error::Format("movie without tracks".into()))?;
    let zero_offset = cut_info
        .iter()
        .map(|ci| ci.zero_offset)
        .min()
        .ok_or_else(|| Mp4Error::Format("movie without tracks".into()))?;
    let pre_cut_delta = new_data_offset.checked_sub(zero_offset).ok_or_else(|| {
        Mp4Error::Format("cut offset precedes the first chunk of the file".into())
    })?;
    debug!("new data offset {new_data_offset}, discarding {pre_cut_delta} bytes of media data");

    let new_traks = moov
        .traks
        .par_iter()
        .zip(cut_info.par_iter())
        .map(|(trak, ci)| cut_trak(trak, ci.sample, pre_cut_delta))
        .collect::<Result<Vec<_>, Mp4Error>>()?;

    let mut new_moov = moov.clone();
    new_moov.traks = new_traks;

    // Sizes are final from here on; only durations and offsets change below.
    let moov_size_diff = moov_disk_size.checked_sub(new_moov.size()).ok_or_else(|| {
        Mp4Error::Format("rebuilt moov larger than its source".into())
    })?;
    debug!(
        "moov size {moov_disk_size} -> {} (shrunk by {moov_size_diff})",
        new_moov.size()
    );

    for trak in &mut new_moov.traks {
        let mdhd = &trak.mdia.mdhd;
        // Truncating division for byte compatibility with legacy outputs.
        trak.tkhd.duration = mdhd.duration * time_scale as u64 / mdhd.time_scale as u64;
        let stbl = &mut trak.mdia.minf.stbl;
        // The rebuilt moov is smaller, so mdat slides toward the file start.
        stbl.offsets = stbl.offsets.cut(1, moov_size_diff)?;
    }
    new_moov.mvhd.duration = new_moov
        .traks
        .iter()
        .map(|t| t.tkhd.duration)
        .max()
        .unwrap_or(0);

    Ok((new_moov, pre_cut_delta, new_data_offset))
}

/// Writes all atoms up to and including the new `mdat` header.
fn split_headers<R, W>(mp4: &mut Mp4<R>, t: f64, out: &mut W) -> Result<u64, Mp4Error>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let ftyp = mp4.ftyp()?;
    debug!("major brand '{}'", ftyp.major_brand());
    let (moov_header, moov) = mp4.moov()?;
    let mdat_header = mp4
        .find(&FourCC::Mdat)
        .ok_or(Mp4Error::CannotSelect {
            name: "mdat",
            min: 1,
            max: None,
            found: 0,
        })?
        .clone();
    if mdat_header.offset < moov_header.offset {
        return Err(Mp4Error::Format(
            "'mdat' precedes 'moov'; splitting needs the movie header first".into(),
        ));
    }

    let (new_moov, pre_cut_delta, new_data_offset) = cut_moov(&moov, moov_header.atom_size, t)?;

    let atoms = mp4.atoms().to_vec();
    for header in &atoms {
        if header.offset == mdat_header.offset {
            break;
        }
        if header.offset == moov_header.offset {
            new_moov.write(out)?;
            continue;
        }
        mp4.copy_range(out, header.offset, header.atom_size)?;
    }

    let new_mdat_size = mdat_header
        .atom_size
        .checked_sub(pre_cut_delta)
        .ok_or_else(|| Mp4Error::Format("cut discards more bytes than mdat holds".into()))?;
    match mdat_header.real_size {
        1 => {
            out.write_be(&1_u32)?;
            out.write_all(&FourCC::Mdat.to_bytes())?;
            out.write_be(&new_mdat_size)?;
        }
        0 if new_mdat_size > u32::MAX as u64 => {
            // keep "extends to end of file"
            out.write_be(&0_u32)?;
            out.write_all(&FourCC::Mdat.to_bytes())?;
        }
        _ => {
            let size = u32::try_from(new_mdat_size).map_err(|_| Mp4Error::OffsetOverflow)?;
            out.write_be(&size)?;
            out.write_all(&FourCC::Mdat.to_bytes())?;
        }
    }

    Ok(new_data_offset)
}

/// Splits `reader` at `t` seconds, writing everything up to and including
/// the new `mdat` header into `writer`.
///
/// Returns the absolute source offset of the retained media data; the
/// caller appends `reader[new_data_offset..]` to complete the file.
pub fn split<R, W>(reader: &mut R, t: f64, writer: &mut W) -> Result<u64, Mp4Error>
where
    R: Read + Seek,
    W: Write,
{
    let (header, new_data_offset) = split_into_buffer(reader, t)?;
    writer.write_all(&header)?;
    Ok(new_data_offset)
}

/// As [`split`], returning the serialized header bytes instead of
/// writing them.
pub fn split_into_buffer<R: Read + Seek>(
    reader: &mut R,
    t: f64,
) -> Result<(Vec<u8>, u64), Mp4Error> {
    let mut mp4 = Mp4::new(&mut *reader)?;
    let mut out = Cursor::new(Vec::new());
    let new_data_offset = split_headers(&mut mp4, t, &mut out)?;
    Ok((out.into_inner(), new_data_offset))
}

/// Splits `reader` at `t` seconds and writes the complete output file,
/// including the bulk copy of the retained `mdat` payload and everything
/// after it.
pub fn split_and_write<R, W>(reader: &mut R, writer: &mut W, t: f64) -> Result<(), Mp4Error>
where
    R: Read + Seek,
    W: Write,
{
    let (header, new_data_offset) = split_into_buffer(reader, t)?;
    writer.write_all(&header)?;
    let end = reader.seek(SeekFrom::End(0))?;
    copy_range(reader, writer, new_data_offset, end - new_data_offset)?;
    Ok(())
}

/// Sync sample times in seconds for the first track carrying an `stss`.
///
/// Tracks without an `stss` have only sync samples and are skipped; an
/// empty result means every sample of every track is a sync sample.
pub fn sync_points<R: Read + Seek>(reader: &mut R) -> Result<Vec<f64>, Mp4Error> {
    let mut mp4 = Mp4::new(&mut *reader)?;
    let ftyp = mp4.ftyp()?;
    debug!("major brand '{}'", ftyp.major_brand());
    let (_, moov) = mp4.moov()?;
    for trak in &moov.traks {
        let stbl = trak.stbl();
        let Some(stss) = &stbl.stss else {
            continue;
        };
        let time_scale = trak.mdia.mdhd.time_scale;
        if time_scale == 0 {
            return Err(Mp4Error::Format(format!(
                "track {} has media timescale 0",
                trak.tkhd.track_id
            )));
        }
        let stts = &stbl.stts;
        let times = stss
            .table
            .par_iter()
            .map(|&s| stts.time_at_sample(s as u64) as f64 / time_scale as f64)
            .collect();
        return Ok(times);
    }
    Ok(Vec::new())
}
