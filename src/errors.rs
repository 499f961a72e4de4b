//! Errors raised while parsing or rewriting MP4 container structure.

use std::fmt;

/// Read/parse/rewrite errors for MP4 container surgery.
#[derive(Debug)]
pub enum Mp4Error {
    /// IO error.
    Io(std::io::Error),
    /// Converted `binrw` error.
    BinRw(binrw::Error),
    /// Source ended in the middle of a field.
    ShortRead,
    /// Violated structural invariant, e.g. a child atom overrunning
    /// its container or a bad `stz2` field size.
    Format(String),
    /// `mvhd`/`tkhd`/`mdhd` version outside {0, 1}.
    UnsupportedVersion { name: &'static str, version: u8 },
    /// Required child atom count outside `[min, max]`.
    CannotSelect {
        name: &'static str,
        min: usize,
        max: Option<usize>,
        found: usize,
    },
    /// Requested split time at or beyond movie duration.
    TimeOutOfRange { requested: f64, duration: f64 },
    /// Chunk offsets no longer fit, even in 64-bit tables.
    OffsetOverflow,
    /// Streaming parse met `mdat` before `moov` and cannot rewind.
    MoovAfterMdat,
    /// No atom with the given FourCC.
    NoSuchAtom(String),
}

impl std::error::Error for Mp4Error {}

impl fmt::Display for Mp4Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mp4Error::Io(err) => write!(f, "IO error: {err}"),
            Mp4Error::BinRw(err) => write!(f, "{err}"),
            Mp4Error::ShortRead => write!(f, "Source ended in the middle of a field."),
            Mp4Error::Format(msg) => write!(f, "Format error: {msg}."),
            Mp4Error::UnsupportedVersion { name, version } => {
                write!(f, "Unsupported '{name}' version {version}, expected 0 or 1.")
            }
            Mp4Error::CannotSelect { name, min, max, found } => match max {
                Some(max) => write!(
                    f,
                    "Requested number of '{name}' atoms in [{min}; {max}], found {found}."
                ),
                None => write!(
                    f,
                    "Requested number of '{name}' atoms in [{min}; unbounded], found {found}."
                ),
            },
            Mp4Error::TimeOutOfRange { requested, duration } => {
                write!(f, "Time {requested} s exceeds file duration {duration} s.")
            }
            Mp4Error::OffsetOverflow => write!(f, "Chunk offsets do not fit the offset table."),
            Mp4Error::MoovAfterMdat => {
                write!(f, "No 'moov' before 'mdat' found - cannot seek.")
            }
            Mp4Error::NoSuchAtom(name) => write!(f, "No such atom '{name}'."),
        }
    }
}

/// Converts std::io::Error to Mp4Error.
/// A read that runs off the end of the source is a `ShortRead`.
impl From<std::io::Error> for Mp4Error {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Mp4Error::ShortRead
        } else {
            Mp4Error::Io(err)
        }
    }
}

/// Converts binrw::Error to Mp4Error.
impl From<binrw::Error> for Mp4Error {
    fn from(err: binrw::Error) -> Mp4Error {
        fn ends_early(err: &binrw::Error) -> bool {
            match err {
                binrw::Error::Io(io) => io.kind() == std::io::ErrorKind::UnexpectedEof,
                binrw::Error::Backtrace(bt) => ends_early(&bt.error),
                _ => false,
            }
        }
        if ends_early(&err) {
            Mp4Error::ShortRead
        } else {
            Mp4Error::BinRw(err)
        }
    }
}
