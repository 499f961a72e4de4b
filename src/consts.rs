//! Main "container" atoms, i.e. atoms that contain more atoms,
//! and the MP4 epoch.

use time::{self, Month, PrimitiveDateTime};

/// FourCC:s for known "container" atoms.
/// If the atom is a "container",
/// it's nested and contains more atoms,
/// within its specified, total size.
/// - `moov`: offset tables, timing, metadata
/// - `trak`: moov.trak
/// - `tref`: moov.trak.tref
/// - `edts`: moov.trak.edts
/// - `mdia`: moov.trak.mdia
/// - `minf`: moov.trak.mdia.minf
/// - `dinf`: moov.trak.mdia.minf.dinf
/// - `stbl`: moov.trak.mdia.minf.stbl, contains timing (stts), offsets (stco)
pub const CONTAINER: [&str; 8] = [
    "moov", "trak", "tref", "edts", "mdia", "minf", "dinf", "stbl",
];

/// Time zero for MP4 containers. January 1, 1904.
pub fn mp4_time_zero() -> PrimitiveDateTime {
    time::Date::from_calendar_date(1904, Month::January, 1)
        .expect("invalid MP4 epoch date")
        .with_hms_milli(0, 0, 0, 0)
        .expect("invalid MP4 epoch time")
}
