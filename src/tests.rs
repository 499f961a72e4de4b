#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::atom_types::{
        ChunkOffsets, SampleSizes, SampleToChunk, Stco, Stsc, Stss, Stsz, Stts, Stz2,
        TimeToSample,
    };
    use crate::{
        move_header_and_write, split, split_and_write, split_into_buffer, sync_points,
        AtomHeader, Fed, FourCC, Mp4, Mp4Error, Splitter,
    };

    // ---------------------
    // Synthetic MP4 buffers
    // ---------------------

    fn atom(name: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + payload.len());
        out.extend_from_slice(&(payload.len() as u32 + 8).to_be_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(payload);
        out
    }

    /// Version 0, zero flags.
    fn full_atom(name: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut payload = vec![0_u8; 4];
        payload.extend_from_slice(body);
        atom(name, &payload)
    }

    fn be32s(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    fn container(name: &[u8; 4], children: &[Vec<u8>]) -> Vec<u8> {
        let payload: Vec<u8> = children.iter().flatten().copied().collect();
        atom(name, &payload)
    }

    fn ftyp_atom() -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"isom");
        payload.extend_from_slice(&0x200_u32.to_be_bytes());
        payload.extend_from_slice(b"isom");
        payload.extend_from_slice(b"mp41");
        atom(b"ftyp", &payload)
    }

    fn mvhd_atom(time_scale: u32, duration: u32) -> Vec<u8> {
        let mut body = be32s(&[0, 0, time_scale, duration]);
        body.extend((0..80).map(|i| i as u8));
        full_atom(b"mvhd", &body)
    }

    fn tkhd_atom(track_id: u32, duration: u32) -> Vec<u8> {
        let mut body = be32s(&[0, 0, track_id, 0, duration]);
        body.extend((0..60).map(|i| i as u8));
        full_atom(b"tkhd", &body)
    }

    fn mdhd_atom(time_scale: u32, duration: u32) -> Vec<u8> {
        let mut body = be32s(&[0, 0, time_scale, duration]);
        // 'und' language, quality 0
        body.extend_from_slice(&0x55c4_u16.to_be_bytes());
        body.extend_from_slice(&[0, 0]);
        full_atom(b"mdhd", &body)
    }

    fn stts_atom(table: &[(u32, u32)]) -> Vec<u8> {
        let mut body = be32s(&[table.len() as u32]);
        for (count, delta) in table {
            body.extend_from_slice(&count.to_be_bytes());
            body.extend_from_slice(&delta.to_be_bytes());
        }
        full_atom(b"stts", &body)
    }

    fn stsc_atom(table: &[(u32, u32, u32)]) -> Vec<u8> {
        let mut body = be32s(&[table.len() as u32]);
        for (first, per_chunk, sdidx) in table {
            body.extend_from_slice(&first.to_be_bytes());
            body.extend_from_slice(&per_chunk.to_be_bytes());
            body.extend_from_slice(&sdidx.to_be_bytes());
        }
        full_atom(b"stsc", &body)
    }

    fn stsz_atom(sizes: &[u32]) -> Vec<u8> {
        let mut body = be32s(&[0, sizes.len() as u32]);
        body.extend(be32s(sizes));
        full_atom(b"stsz", &body)
    }

    fn stco_atom(offsets: &[u32]) -> Vec<u8> {
        let mut body = be32s(&[offsets.len() as u32]);
        body.extend(be32s(offsets));
        full_atom(b"stco", &body)
    }

    fn co64_atom(offsets: &[u64]) -> Vec<u8> {
        let mut body = be32s(&[offsets.len() as u32]);
        for offset in offsets {
            body.extend_from_slice(&offset.to_be_bytes());
        }
        full_atom(b"co64", &body)
    }

    fn stss_atom(samples: &[u32]) -> Vec<u8> {
        let mut body = be32s(&[samples.len() as u32]);
        body.extend(be32s(samples));
        full_atom(b"stss", &body)
    }

    fn stz2_atom(field_size: u8, values: &[u16]) -> Vec<u8> {
        let mut body = be32s(&[field_size as u32, values.len() as u32]);
        match field_size {
            16 => {
                for v in values {
                    body.extend_from_slice(&v.to_be_bytes());
                }
            }
            8 => body.extend(values.iter().map(|v| *v as u8)),
            4 => {
                for pair in values.chunks(2) {
                    let high = (pair[0] & 0x0f) as u8;
                    let low = pair.get(1).map(|v| (*v & 0x0f) as u8).unwrap_or(0);
                    body.push((high << 4) | low);
                }
            }
            _ => panic!("bad field size"),
        }
        full_atom(b"stz2", &body)
    }

    fn mdat_payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    const VIDEO_SIZES: [u32; 10] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

    /// One video track: 10 samples of 9000 ticks at timescale 90000
    /// (1 s of media), two chunks of 5 samples, keyframes at 1 and 6.
    fn single_track_moov(chunk_offsets: &[u32]) -> Vec<u8> {
        let stbl = container(
            b"stbl",
            &[
                stts_atom(&[(10, 9000)]),
                stsc_atom(&[(1, 5, 1)]),
                stsz_atom(&VIDEO_SIZES),
                stco_atom(chunk_offsets),
                stss_atom(&[1, 6]),
            ],
        );
        container(
            b"moov",
            &[
                mvhd_atom(1000, 1000),
                container(
                    b"trak",
                    &[
                        tkhd_atom(1, 1000),
                        container(
                            b"mdia",
                            &[mdhd_atom(90000, 90000), container(b"minf", &[stbl])],
                        ),
                    ],
                ),
            ],
        )
    }

    /// `ftyp` `moov` `mdat`, 550 bytes of media in two chunks.
    fn sample_file() -> Vec<u8> {
        let ftyp = ftyp_atom();
        let moov_len = single_track_moov(&[0, 0]).len();
        let payload_start = (ftyp.len() + moov_len + 8) as u32;
        let moov = single_track_moov(&[payload_start, payload_start + 150]);
        let mut file = ftyp;
        file.extend(moov);
        file.extend(atom(b"mdat", &mdat_payload(550)));
        file
    }

    /// `ftyp` `mdat` `moov`: the fast-start candidate layout, with chunk
    /// offsets pointing into the leading mdat payload.
    fn tail_moov_file() -> Vec<u8> {
        let mut file = ftyp_atom();
        let payload_start = file.len() as u32 + 8;
        file.extend(atom(b"mdat", &mdat_payload(550)));
        let stbl = container(
            b"stbl",
            &[
                stts_atom(&[(10, 9000)]),
                stsc_atom(&[(1, 5, 1)]),
                stsz_atom(&VIDEO_SIZES),
                stco_atom(&[payload_start, payload_start + 150]),
            ],
        );
        file.extend(container(
            b"moov",
            &[
                mvhd_atom(1000, 1000),
                container(
                    b"trak",
                    &[
                        tkhd_atom(1, 1000),
                        container(
                            b"mdia",
                            &[mdhd_atom(90000, 90000), container(b"minf", &[stbl])],
                        ),
                    ],
                ),
            ],
        ));
        file
    }

    fn stts_from(table: &[(u32, u32)]) -> Stts {
        Stts {
            offset: 0,
            version: 0,
            flags: [0; 3],
            table: table
                .iter()
                .map(|&(sample_count, sample_delta)| TimeToSample {
                    sample_count,
                    sample_delta,
                })
                .collect(),
        }
    }

    fn stsc_from(table: &[(u32, u32, u32)]) -> Stsc {
        Stsc {
            offset: 0,
            version: 0,
            flags: [0; 3],
            table: table
                .iter()
                .map(|&(first_chunk, samples_per_chunk, sample_description_id)| SampleToChunk {
                    first_chunk,
                    samples_per_chunk,
                    sample_description_id,
                })
                .collect(),
        }
    }

    // ----------
    // Atom layer
    // ----------

    #[test]
    fn scan_top_level() {
        let file = sample_file();
        let mp4 = Mp4::new(Cursor::new(&file)).unwrap();
        let names: Vec<&str> = mp4.atoms().iter().map(|a| a.name().to_str()).collect();
        assert_eq!(names, ["ftyp", "moov", "mdat"]);
        assert_eq!(mp4.atoms()[0].offset(), 0);
        assert_eq!(mp4.atoms()[0].atom_size(), 24);
        assert_eq!(mp4.atoms()[2].atom_size(), 558);
        assert!(mp4.atoms()[1].is_container());
        assert!(!mp4.atoms()[2].is_container());
    }

    #[test]
    fn scan_64bit_and_to_eof_sizes() {
        // 16 byte header: size word 1, then the real size after the FourCC
        let mut buf = Vec::new();
        buf.extend_from_slice(&1_u32.to_be_bytes());
        buf.extend_from_slice(b"free");
        buf.extend_from_slice(&24_u64.to_be_bytes());
        buf.extend_from_slice(&[0xaa; 8]);
        // size word 0: extends to end of source
        buf.extend_from_slice(&0_u32.to_be_bytes());
        buf.extend_from_slice(b"mdat");
        buf.extend_from_slice(&[0xbb; 12]);

        let mp4 = Mp4::new(Cursor::new(&buf)).unwrap();
        let atoms = mp4.atoms();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[0].header_size(), 16);
        assert_eq!(atoms[0].atom_size(), 24);
        assert_eq!(atoms[0].data_offset(), 16);
        assert_eq!(atoms[0].data_size(), 8);
        assert_eq!(atoms[1].header_size(), 8);
        assert_eq!(atoms[1].offset(), 24);
        assert_eq!(atoms[1].atom_size(), 20);
    }

    // ---------------
    // Typed box model
    // ---------------

    #[test]
    fn parse_typed_moov() {
        let file = sample_file();
        let mut mp4 = Mp4::new(Cursor::new(&file)).unwrap();

        let ftyp = mp4.ftyp().unwrap();
        assert_eq!(ftyp.major_brand(), "isom");
        assert_eq!(ftyp.minor_version(), 0x200);
        assert_eq!(ftyp.compatible_brands(), ["isom", "mp41"]);

        let (header, moov) = mp4.moov().unwrap();
        assert_eq!(header.offset(), 24);
        assert_eq!(moov.mvhd().time_scale(), 1000);
        assert_eq!(moov.mvhd().duration(), 1000);
        assert_eq!(moov.traks().len(), 1);

        let trak = &moov.traks()[0];
        assert_eq!(trak.tkhd().track_id(), 1);
        assert_eq!(trak.tkhd().duration(), 1000);
        assert_eq!(trak.mdia().mdhd().time_scale(), 90000);
        assert_eq!(trak.mdia().mdhd().duration_unscaled(), 90000);
        assert_eq!(trak.mdia().mdhd().language(), "und");

        let stbl = trak.stbl();
        assert_eq!(stbl.stts().sample_sum(), 10);
        assert_eq!(stbl.stts().duration_sum(), 90000);
        match stbl.sample_sizes() {
            SampleSizes::Stsz(stsz) => assert_eq!(stsz.sizes(), VIDEO_SIZES),
            other => panic!("expected stsz, got {other:?}"),
        }
        assert_eq!(stbl.chunk_offsets().len(), 2);
        assert_eq!(stbl.sync_samples().unwrap().table(), [1, 6]);
    }

    /// Parsing and re-serializing an untouched moov reproduces its bytes.
    #[test]
    fn moov_round_trip_is_bit_exact() {
        let file = sample_file();
        let mut mp4 = Mp4::new(Cursor::new(&file)).unwrap();
        let (header, moov) = mp4.moov().unwrap();

        let begin = header.offset() as usize;
        let end = begin + header.atom_size() as usize;
        assert_eq!(moov.size(), header.atom_size());

        let mut out = Cursor::new(Vec::new());
        moov.write(&mut out).unwrap();
        assert_eq!(out.into_inner(), file[begin..end]);
    }

    #[test]
    fn stz2_nibble_packing_round_trip() {
        // odd entry count: the final value takes the high nibble of a
        // trailing byte, low nibble zero
        let bytes = stz2_atom(4, &[1, 2, 3, 4, 5, 6, 7]);
        let mut cursor = Cursor::new(bytes.as_slice());
        let header = AtomHeader::read(&mut cursor, bytes.len() as u64).unwrap();
        let stz2 = Stz2::read(&header, &mut cursor).unwrap();
        assert_eq!(stz2.field_size(), 4);
        assert_eq!(stz2.table(), [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(stz2.size(), bytes.len() as u64);

        let mut out = Cursor::new(Vec::new());
        stz2.write(&mut out).unwrap();
        assert_eq!(out.into_inner(), bytes);

        let cut = stz2.cut(6).unwrap();
        assert_eq!(cut.table(), [6, 7]);
    }

    #[test]
    fn co64_preserves_offsets_above_32_bits() {
        let offsets = [0x1_0000_0000_u64, 0x2_0000_0010];
        let bytes = co64_atom(&offsets);
        let mut cursor = Cursor::new(bytes.as_slice());
        let header = AtomHeader::read(&mut cursor, bytes.len() as u64).unwrap();
        let co64 = crate::atom_types::Co64::read(&header, &mut cursor).unwrap();
        assert_eq!(co64.offsets(), offsets);

        let mut out = Cursor::new(Vec::new());
        co64.write(&mut out).unwrap();
        assert_eq!(out.into_inner(), bytes);
    }

    #[test]
    fn missing_stts_is_rejected() {
        let stbl = container(
            b"stbl",
            &[
                stsc_atom(&[(1, 5, 1)]),
                stsz_atom(&VIDEO_SIZES),
                stco_atom(&[100, 250]),
            ],
        );
        let moov = container(
            b"moov",
            &[
                mvhd_atom(1000, 1000),
                container(
                    b"trak",
                    &[
                        tkhd_atom(1, 1000),
                        container(
                            b"mdia",
                            &[mdhd_atom(90000, 90000), container(b"minf", &[stbl])],
                        ),
                    ],
                ),
            ],
        );
        let mut file = ftyp_atom();
        file.extend(moov);
        file.extend(atom(b"mdat", &[0; 16]));

        let mut mp4 = Mp4::new(Cursor::new(&file)).unwrap();
        match mp4.moov() {
            Err(Mp4Error::CannotSelect { name: "stts", found: 0, .. }) => {}
            other => panic!("expected CannotSelect for stts, got {other:?}"),
        }
    }

    // ----------------
    // Table algorithms
    // ----------------

    #[test]
    fn sample_numbering_starts_at_one() {
        let stts = stts_from(&[(10, 9000)]);
        assert_eq!(stts.sample_at_time(0), 1);
        assert_eq!(stts.sample_at_time(8999), 1);
        assert_eq!(stts.sample_at_time(9000), 2);
        assert_eq!(stts.sample_at_time(89999), 10);
        // past the end: one past the final sample
        assert_eq!(stts.sample_at_time(90000), 11);
        assert_eq!(stts.sample_at_time(1_000_000), 11);
    }

    #[test]
    fn sample_at_time_across_runs() {
        let stts = stts_from(&[(2, 100), (3, 50)]);
        assert_eq!(stts.sample_at_time(199), 2);
        assert_eq!(stts.sample_at_time(200), 3);
        assert_eq!(stts.sample_at_time(250), 4);
        assert_eq!(stts.sample_at_time(349), 5);
        assert_eq!(stts.sample_at_time(350), 6);
    }

    #[test]
    fn time_at_sample_inverts_sample_at_time() {
        let stts = stts_from(&[(2, 100), (3, 50)]);
        assert_eq!(stts.time_at_sample(1), 0);
        assert_eq!(stts.time_at_sample(2), 100);
        assert_eq!(stts.time_at_sample(3), 200);
        assert_eq!(stts.time_at_sample(4), 250);
        assert_eq!(stts.time_at_sample(6), 350);
        for sample in 1..=5_u64 {
            assert_eq!(stts.sample_at_time(stts.time_at_sample(sample)), sample);
        }
    }

    #[test]
    fn chunk_lookup_final_run_extends() {
        let stsc = stsc_from(&[(1, 5, 1)]);
        assert_eq!(stsc.chunk_containing(1).unwrap(), 1);
        assert_eq!(stsc.chunk_containing(5).unwrap(), 1);
        assert_eq!(stsc.chunk_containing(6).unwrap(), 2);
        assert_eq!(stsc.chunk_containing(10).unwrap(), 2);
        // the final run keeps going
        assert_eq!(stsc.chunk_containing(11).unwrap(), 3);

        let stsc = stsc_from(&[(1, 3, 1), (3, 2, 1)]);
        assert_eq!(stsc.chunk_containing(6).unwrap(), 2);
        assert_eq!(stsc.chunk_containing(7).unwrap(), 3);
        assert_eq!(stsc.chunk_containing(9).unwrap(), 4);
    }

    #[test]
    fn cut_stts_keeps_run_remainder() {
        let stts = stts_from(&[(10, 9000)]);
        let cut = stts.cut(6).unwrap();
        assert_eq!(cut.table().len(), 1);
        assert_eq!(cut.table()[0].sample_count(), 5);
        assert_eq!(cut.table()[0].sample_delta(), 9000);

        let stts = stts_from(&[(2, 100), (3, 50)]);
        let cut = stts.cut(2).unwrap();
        assert_eq!(
            cut.table()
                .iter()
                .map(|t| (t.sample_count(), t.sample_delta()))
                .collect::<Vec<_>>(),
            [(1, 100), (3, 50)]
        );
        let cut = stts.cut(3).unwrap();
        assert_eq!(
            cut.table()
                .iter()
                .map(|t| (t.sample_count(), t.sample_delta()))
                .collect::<Vec<_>>(),
            [(3, 50)]
        );
    }

    /// One past the end retains nothing; further than that is a defect.
    #[test]
    fn cut_stts_past_end() {
        let stts = stts_from(&[(10, 9000)]);
        assert!(stts.cut(11).unwrap().table().is_empty());
        assert!(matches!(stts.cut(12), Err(Mp4Error::Format(_))));
    }

    #[test]
    fn cut_stsc_rebases_to_chunk_one() {
        let stsc = stsc_from(&[(1, 3, 1), (3, 2, 2)]);
        let cut = stsc.cut(2).unwrap();
        assert_eq!(
            cut.table()
                .iter()
                .map(|t| (t.first_chunk, t.samples_per_chunk, t.sample_description_id))
                .collect::<Vec<_>>(),
            [(1, 3, 1), (2, 2, 2)]
        );
        let cut = stsc.cut(3).unwrap();
        assert_eq!(
            cut.table()
                .iter()
                .map(|t| (t.first_chunk, t.samples_per_chunk, t.sample_description_id))
                .collect::<Vec<_>>(),
            [(1, 2, 2)]
        );
    }

    #[test]
    fn cut_chunk_offsets_drops_and_rebases() {
        let offsets = ChunkOffsets::Stco(Stco {
            offset: 0,
            version: 0,
            flags: [0; 3],
            offsets: vec![100, 250, 400],
        });
        let cut = offsets.cut(2, 150).unwrap();
        assert_eq!(cut.len(), 2);
        assert_eq!(cut.get(1), Some(100));
        assert_eq!(cut.get(2), Some(250));
    }

    #[test]
    fn cut_stss_renumbers() {
        let stss = Stss {
            offset: 0,
            version: 0,
            flags: [0; 3],
            table: vec![1, 6],
        };
        assert_eq!(stss.cut(6).table(), [1]);
        assert_eq!(stss.cut(4).table(), [3]);
        assert!(stss.cut(7).table().is_empty());
    }

    #[test]
    fn cut_uniform_stsz_keeps_count_consistent() {
        let stsz = Stsz {
            offset: 0,
            version: 0,
            flags: [0; 3],
            sample_size: 100,
            sample_count: 10,
            sizes: Vec::new(),
        };
        let cut = stsz.cut(6).unwrap();
        assert_eq!(cut.sample_size(), 100);
        assert_eq!(cut.sample_count(), 5);
        assert!(cut.sizes().is_empty());
    }

    // ----------
    // Cut engine
    // ----------

    #[test]
    fn split_mid_file() {
        let file = sample_file();
        let (header, new_data_offset) =
            split_into_buffer(&mut Cursor::new(&file), 0.5).unwrap();

        // samples 6..=10 live in the second chunk
        let old_payload_start = file.len() as u64 - 550;
        assert_eq!(new_data_offset, old_payload_start + 150);

        let mut out = header.clone();
        out.extend_from_slice(&file[new_data_offset as usize..]);
        // 150 bytes of media dropped, moov shrinks by 28
        // (5 stsz entries, 1 stco entry, 1 stss entry)
        assert_eq!(out.len(), file.len() - 150 - 28);

        let mut out_mp4 = Mp4::new(Cursor::new(&out)).unwrap();
        let (out_moov_header, out_moov) = out_mp4.moov().unwrap();
        assert_eq!(out_moov.size(), out_moov_header.atom_size());
        assert_eq!(out_moov.mvhd().duration(), 500);

        let trak = &out_moov.traks()[0];
        assert_eq!(trak.tkhd().duration(), 500);
        assert_eq!(trak.mdia().mdhd().duration_unscaled(), 45000);

        let stbl = trak.stbl();
        assert_eq!(stbl.stts().sample_sum(), 5);
        assert_eq!(stbl.sample_sizes().sample_count(), 5);
        assert_eq!(stbl.stts().table()[0].sample_delta(), 9000);
        match stbl.sample_sizes() {
            SampleSizes::Stsz(stsz) => {
                assert_eq!(stsz.sizes(), [60, 70, 80, 90, 100]);
                // invariant: stts and stsz agree on the sample count
                assert_eq!(stbl.stts().sample_sum(), stsz.sizes().len() as u64);
            }
            other => panic!("expected stsz, got {other:?}"),
        }
        assert_eq!(stbl.sync_samples().unwrap().table(), [1]);
        assert_eq!(
            stbl.stsc()
                .table()
                .iter()
                .map(|t| (t.first_chunk, t.samples_per_chunk))
                .collect::<Vec<_>>(),
            [(1, 5)]
        );

        // every chunk offset lands inside the new mdat payload
        let out_mdat = out_mp4.find(&FourCC::Mdat).unwrap().clone();
        assert_eq!(out_mdat.atom_size(), 8 + 400);
        assert_eq!(stbl.chunk_offsets().len(), 1);
        assert_eq!(stbl.chunk_offsets().get(1), Some(out_mdat.data_offset()));
    }

    /// A cut at 0 discards nothing and reproduces the input bytes.
    #[test]
    fn split_at_zero_is_identity() {
        let file = sample_file();
        let (header, new_data_offset) =
            split_into_buffer(&mut Cursor::new(&file), 0.0).unwrap();
        assert_eq!(new_data_offset, file.len() as u64 - 550);
        assert_eq!(header, file[..file.len() - 550]);
    }

    #[test]
    fn split_beyond_duration_fails() {
        let file = sample_file();
        // duration is exactly 1 s
        assert!(matches!(
            split_into_buffer(&mut Cursor::new(&file), 1.0),
            Err(Mp4Error::TimeOutOfRange { .. })
        ));
        assert!(matches!(
            split_into_buffer(&mut Cursor::new(&file), 90.0),
            Err(Mp4Error::TimeOutOfRange { .. })
        ));
    }

    #[test]
    fn split_requires_moov_before_mdat() {
        let file = tail_moov_file();
        assert!(matches!(
            split_into_buffer(&mut Cursor::new(&file), 0.5),
            Err(Mp4Error::Format(_))
        ));
    }

    #[test]
    fn split_writer_variants_agree() {
        let file = sample_file();
        let (header, offset) = split_into_buffer(&mut Cursor::new(&file), 0.5).unwrap();

        let mut written = Vec::new();
        let offset2 = split(&mut Cursor::new(&file), 0.5, &mut written).unwrap();
        assert_eq!(offset2, offset);
        assert_eq!(written, header);

        let mut full = Vec::new();
        split_and_write(&mut Cursor::new(&file), &mut full, 0.5).unwrap();
        let mut expected = header.clone();
        expected.extend_from_slice(&file[offset as usize..]);
        assert_eq!(full, expected);
    }

    /// The global cut point is the minimum chunk offset across tracks.
    #[test]
    fn split_two_tracks_cuts_at_min_offset() {
        // video: 10 x 0.1 s samples of 100 bytes, audio: 10 x 0.1 s
        // samples of 50 bytes, interleaved as vc1 ac1 vc2 ac2
        let video_sizes = [100_u32; 10];
        let audio_sizes = [50_u32; 10];
        let build = |v_offsets: &[u32], a_offsets: &[u32]| -> Vec<u8> {
            let video_stbl = container(
                b"stbl",
                &[
                    stts_atom(&[(10, 9000)]),
                    stsc_atom(&[(1, 5, 1)]),
                    stsz_atom(&video_sizes),
                    stco_atom(v_offsets),
                    stss_atom(&[1, 6]),
                ],
            );
            let audio_stbl = container(
                b"stbl",
                &[
                    stts_atom(&[(10, 4410)]),
                    stsc_atom(&[(1, 5, 1)]),
                    stsz_atom(&audio_sizes),
                    stco_atom(a_offsets),
                ],
            );
            container(
                b"moov",
                &[
                    mvhd_atom(1000, 1000),
                    container(
                        b"trak",
                        &[
                            tkhd_atom(1, 1000),
                            container(
                                b"mdia",
                                &[mdhd_atom(90000, 90000), container(b"minf", &[video_stbl])],
                            ),
                        ],
                    ),
                    container(
                        b"trak",
                        &[
                            tkhd_atom(2, 1000),
                            container(
                                b"mdia",
                                &[mdhd_atom(44100, 44100), container(b"minf", &[audio_stbl])],
                            ),
                        ],
                    ),
                ],
            )
        };
        let ftyp = ftyp_atom();
        let moov_len = build(&[0, 0], &[0, 0]).len();
        let p = (ftyp.len() + moov_len + 8) as u32;
        let moov = build(&[p, p + 750], &[p + 500, p + 1250]);
        let mut file = ftyp;
        file.extend(moov);
        file.extend(atom(b"mdat", &mdat_payload(1500)));

        let (header, new_data_offset) =
            split_into_buffer(&mut Cursor::new(&file), 0.5).unwrap();
        // video chunk 2 starts before audio chunk 2
        assert_eq!(new_data_offset, p as u64 + 750);

        let mut out = header;
        out.extend_from_slice(&file[new_data_offset as usize..]);
        let mut out_mp4 = Mp4::new(Cursor::new(&out)).unwrap();
        let (_, out_moov) = out_mp4.moov().unwrap();
        let out_mdat = out_mp4.find(&FourCC::Mdat).unwrap().clone();
        assert_eq!(out_mdat.atom_size(), 8 + 750);

        let video = &out_moov.traks()[0];
        let audio = &out_moov.traks()[1];
        assert_eq!(
            video.stbl().chunk_offsets().get(1),
            Some(out_mdat.data_offset())
        );
        assert_eq!(
            audio.stbl().chunk_offsets().get(1),
            Some(out_mdat.data_offset() + 500)
        );
        assert_eq!(video.tkhd().duration(), 500);
        assert_eq!(audio.tkhd().duration(), 500);
        assert_eq!(out_moov.mvhd().duration(), 500);
        assert_eq!(video.mdia().mdhd().duration_unscaled(), 45000);
        assert_eq!(audio.mdia().mdhd().duration_unscaled(), 22050);
    }

    #[test]
    fn sync_point_times() {
        let file = sample_file();
        let times = sync_points(&mut Cursor::new(&file)).unwrap();
        assert_eq!(times, [0.0, 0.5]);
    }

    // ----------
    // Fast start
    // ----------

    #[test]
    fn faststart_moves_moov_and_shifts_offsets() {
        let payload_start = ftyp_atom().len() as u32 + 8;
        let file = tail_moov_file();
        let mut out = Vec::new();
        let moved = move_header_and_write(&mut Cursor::new(&file), &mut out).unwrap();
        assert!(moved);

        let mp4 = Mp4::new(Cursor::new(&out)).unwrap();
        let names: Vec<&str> = mp4.atoms().iter().map(|a| a.name().to_str()).collect();
        assert_eq!(names, ["ftyp", "moov", "mdat"]);

        let mut out_mp4 = Mp4::new(Cursor::new(&out)).unwrap();
        let (moov_header, moov) = out_mp4.moov().unwrap();
        let out_mdat = out_mp4.find(&FourCC::Mdat).unwrap().clone();
        let stbl = moov.traks()[0].stbl();
        assert_eq!(stbl.chunk_offsets().get(1), Some(out_mdat.data_offset()));
        assert_eq!(
            stbl.chunk_offsets().get(2),
            Some(out_mdat.data_offset() + 150)
        );
        // every offset grew by exactly the relocated moov size
        assert_eq!(
            stbl.chunk_offsets().get(1),
            Some(payload_start as u64 + moov_header.atom_size())
        );
    }

    /// Fast-starting a streamable file is a byte-exact pass-through,
    /// and fast-start output fast-starts to itself.
    #[test]
    fn faststart_is_idempotent() {
        let file = tail_moov_file();
        let mut first = Vec::new();
        assert!(move_header_and_write(&mut Cursor::new(&file), &mut first).unwrap());

        let mut second = Vec::new();
        let moved = move_header_and_write(&mut Cursor::new(&first), &mut second).unwrap();
        assert!(!moved);
        assert_eq!(first, second);
    }

    /// Shifting near-2^32 offsets widens the table to co64 and accounts
    /// for the widened moov in the shift itself.
    #[test]
    fn faststart_widens_overflowing_stco() {
        let base = u32::MAX - 100;
        let mut file = ftyp_atom();
        file.extend(atom(b"mdat", &mdat_payload(16)));
        let stbl = container(
            b"stbl",
            &[
                stts_atom(&[(10, 9000)]),
                stsc_atom(&[(1, 10, 1)]),
                stsz_atom(&VIDEO_SIZES),
                stco_atom(&[base]),
            ],
        );
        let moov = container(
            b"moov",
            &[
                mvhd_atom(1000, 1000),
                container(
                    b"trak",
                    &[
                        tkhd_atom(1, 1000),
                        container(
                            b"mdia",
                            &[mdhd_atom(90000, 90000), container(b"minf", &[stbl])],
                        ),
                    ],
                ),
            ],
        );
        let moov_len = moov.len() as u64;
        file.extend(moov);

        let mut out = Vec::new();
        assert!(move_header_and_write(&mut Cursor::new(&file), &mut out).unwrap());

        let mut out_mp4 = Mp4::new(Cursor::new(&out)).unwrap();
        let (_, out_moov) = out_mp4.moov().unwrap();
        match out_moov.traks()[0].stbl().chunk_offsets() {
            ChunkOffsets::Co64(co64) => {
                // widening a single-entry stco grows moov by 4 bytes
                assert_eq!(co64.offsets(), [base as u64 + moov_len + 4]);
            }
            other => panic!("expected co64 after widening, got {other:?}"),
        }
    }

    // -----------------
    // Streaming adapter
    // -----------------

    #[test]
    fn splitter_matches_synchronous_split() {
        let file = sample_file();
        let mut splitter = Splitter::new(0.5);
        let mut request = splitter.start();
        loop {
            let begin = request.offset as usize;
            let end = (begin + request.size as usize).min(file.len());
            match splitter.feed(&file[begin..end]).unwrap() {
                Fed::Again(next) => request = next,
                Fed::Complete => break,
            }
        }
        let (header, new_data_offset) = splitter.result().unwrap();
        let (expected_header, expected_offset) =
            split_into_buffer(&mut Cursor::new(&file), 0.5).unwrap();
        assert_eq!(header, expected_header);
        assert_eq!(new_data_offset, expected_offset);
    }

    #[test]
    fn splitter_rejects_mdat_before_moov() {
        let file = tail_moov_file();
        let mut splitter = Splitter::new(0.5);
        let mut request = splitter.start();
        let err = loop {
            let begin = request.offset as usize;
            let end = (begin + request.size as usize).min(file.len());
            match splitter.feed(&file[begin..end]) {
                Ok(Fed::Again(next)) => request = next,
                Ok(Fed::Complete) => panic!("expected a streaming failure"),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, Mp4Error::MoovAfterMdat));
    }
}
