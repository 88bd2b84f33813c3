//! Remote ephemeris archive: addressing, retrieval, decompression.
use hifitime::Epoch;

use crate::error::Error;

mod ftp;
pub(crate) mod lzw;

pub use ftp::CddisFtp;

/// Archive addressing key: weeks elapsed since the GPS epoch
/// (1980-01-06) and day of that week, 0 = Sunday .. 6 = Saturday.
/// Distinct calendar dates may resolve to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpsWeekDay {
    pub week: u32,
    pub day: u8,
}

impl std::fmt::Display for GpsWeekDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.week, self.day)
    }
}

impl GpsWeekDay {
    /// Resolves a Gregorian calendar date. Pure and deterministic:
    /// no network, no side effects. Dates before the GPS epoch cannot
    /// be represented.
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Result<Self, Error> {
        let t = Epoch::maybe_from_gregorian_utc(year, month, day, 0, 0, 0, 0)
            .map_err(|_| Error::InvalidDate(year, month, day))?;
        let days = t.to_gpst_days();
        if days < 0.0 {
            return Err(Error::PreGpsEpoch);
        }
        let days = days.floor() as u64;
        Ok(Self {
            week: (days / 7) as u32,
            day: (days % 7) as u8,
        })
    }

    /// IGS final product file name for this key, compress(1) compressed.
    pub fn filename(&self) -> String {
        format!("igs{}{}.sp3.Z", self.week, self.day)
    }

    /// Absolute remote path below the archive product root.
    pub fn remote_path(&self, product_root: &str) -> String {
        format!(
            "/{}/{}/{}",
            product_root.trim_matches('/'),
            self.week,
            self.filename()
        )
    }
}

/// Ephemeris providers implement [EphemerisSource]. This is the seam the
/// pipeline is tested through, offline: [CddisFtp] is the production
/// implementation.
pub trait EphemerisSource {
    /// Returns the decompressed SP3 payload covering this key.
    /// A failure here only affects the epochs that resolve to this key.
    fn fetch(&mut self, key: GpsWeekDay) -> Result<Vec<u8>, Error>;
}
