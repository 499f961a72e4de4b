//! Pull-based streaming adapter for environments that cannot seek.
//!
//! The caller drives a request/feed loop: every [`Request`] names the
//! byte range the splitter wants next, [`Splitter::feed`] hands those
//! bytes back, and once the whole header region is collected the cut
//! engine runs over it in memory. Exactly one request is outstanding
//! at any time.
//!
//! ```no_run
//! use mp4split::{Fed, Splitter};
//!
//! fn demo(file: &[u8]) -> Result<(), mp4split::Mp4Error> {
//!     let mut splitter = Splitter::new(5.0);
//!     let mut request = splitter.start();
//!     loop {
//!         let begin = request.offset as usize;
//!         let end = (begin + request.size as usize).min(file.len());
//!         match splitter.feed(&file[begin..end])? {
//!             Fed::Again(next) => request = next,
//!             Fed::Complete => break,
//!         }
//!     }
//!     let (header, new_data_offset) = splitter.result()?;
//!     // write `header`, then append `file[new_data_offset as usize..]`
//!     Ok(())
//! }
//! ```

use std::io::Cursor;

use crate::split::split_into_buffer;
use crate::{FourCC, Mp4Error};

/// Byte range the splitter wants next: `size` bytes from absolute `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub size: u64,
    pub offset: u64,
}

/// Outcome of feeding a chunk.
#[derive(Debug)]
pub enum Fed {
    /// More data wanted.
    Again(Request),
    /// Header fully collected; call [`Splitter::result`].
    Complete,
}

/// Enough bytes to resolve a 64-bit extended box size.
const MIN_HEAD_CHUNK: u64 = 16;

/// Data-driven splitting: scans top-level box headers one probe at a
/// time, then collects everything up to the `mdat` header in one read.
#[derive(Debug)]
pub struct Splitter {
    /// Split point in seconds.
    t: f64,
    /// Offset of the next unscanned top-level box.
    offset: u64,
    /// Offset of the most recently scanned box.
    inc_offset: u64,
    moov_found: bool,
    all_found: bool,
    head: Option<Vec<u8>>,
}

impl Splitter {
    /// New splitter cutting at `t` seconds.
    pub fn new(t: f64) -> Self {
        Self {
            t,
            offset: 0,
            inc_offset: 0,
            moov_found: false,
            all_found: false,
            head: None,
        }
    }

    /// The first request.
    pub fn start(&self) -> Request {
        Request {
            size: MIN_HEAD_CHUNK,
            offset: self.offset,
        }
    }

    /// Supplies the bytes of the previous request. May return the next
    /// request or signal that the header region is complete.
    pub fn feed(&mut self, data: &[u8]) -> Result<Fed, Mp4Error> {
        if self.all_found {
            self.head = Some(data.to_vec());
            return Ok(Fed::Complete);
        }
        if data.len() < 8 {
            return Err(Mp4Error::ShortRead);
        }
        let real_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let name = FourCC::from_slice(&data[4..8]);
        let size = match real_size {
            1 => {
                let ext: [u8; 8] = data
                    .get(8..16)
                    .and_then(|b| b.try_into().ok())
                    .ok_or(Mp4Error::ShortRead)?;
                Some(u64::from_be_bytes(ext))
            }
            // extends to the end of the source
            0 => None,
            n => Some(n as u64),
        };

        match name {
            FourCC::Mdat => {
                if !self.moov_found {
                    return Err(Mp4Error::MoovAfterMdat);
                }
                self.all_found = true;
            }
            FourCC::Moov => self.moov_found = true,
            _ => {}
        }

        self.inc_offset = self.offset;
        if self.all_found {
            // One final read: everything up to and including the mdat header.
            return Ok(Fed::Again(Request {
                size: self.inc_offset + MIN_HEAD_CHUNK,
                offset: 0,
            }));
        }
        match size {
            Some(size) if size >= 8 => {
                self.offset += size;
                Ok(Fed::Again(Request {
                    size: MIN_HEAD_CHUNK,
                    offset: self.offset,
                }))
            }
            _ => Err(Mp4Error::Format(
                "not all needed atoms found before the source ended".into(),
            )),
        }
    }

    /// The rewritten header bytes and the absolute source offset copying
    /// should continue from, equal to what the synchronous [`split`]
    /// returns for the same source.
    ///
    /// [`split`]: crate::split::split
    pub fn result(&self) -> Result<(Vec<u8>, u64), Mp4Error> {
        let head = self
            .head
            .as_ref()
            .ok_or_else(|| Mp4Error::Format("streaming parse has not completed".into()))?;
        let mut cursor = Cursor::new(head.as_slice());
        split_into_buffer(&mut cursor, self.t)
    }
}
