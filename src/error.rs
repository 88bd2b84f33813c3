//! Crate wide error taxonomy.
use thiserror::Error;

/// Every failure the pipeline may report. Retrieval and solving errors are
/// scoped to the epoch(s) they affect; only [Error::NoEpochs] and session
/// level failures ([Error::Connection], [Error::Login]) abort a whole run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Nothing in the uploaded file was recognized as an observation epoch.
    #[error("no observation epochs recognized")]
    NoEpochs,

    /// Epoch header token failed validation. The surrounding epoch is
    /// dropped, never silently zeroed.
    #[error("invalid {field} \"{token}\" in epoch header")]
    EpochHeader {
        field: &'static str,
        token: String,
    },

    /// Calendar date that does not exist in the Gregorian calendar.
    #[error("invalid calendar date {0:04}-{1:02}-{2:02}")]
    InvalidDate(i32, u8, u8),

    /// GPS week numbering starts 1980-01-06; earlier dates cannot be
    /// resolved to an archive directory.
    #[error("date predates the GPS epoch (1980-01-06)")]
    PreGpsEpoch,

    /// Control session could not be established or broke down.
    /// Fatal for the whole request: nothing can be solved without ephemerides.
    #[error("archive connection failed: {0}")]
    Connection(String),

    /// Anonymous login was refused by the archive.
    #[error("archive login failed: {0}")]
    Login(String),

    /// Bounded network timeout expired. Retryable.
    #[error("archive timed out: {0}")]
    Timeout(String),

    /// The archive has no product for this week/day yet (publication
    /// latency) or the key is wrong. Scoped to the epochs needing that key.
    #[error("no product for week {week} day {day}: {reason}")]
    ProductNotFound {
        week: u32,
        day: u8,
        reason: String,
    },

    /// Retrieved payload does not carry the compress(1) magic bytes.
    #[error("payload is not a compress(1) stream")]
    BadMagic,

    /// Compressed payload cannot be decoded.
    #[error("corrupt LZW stream: {0}")]
    CorruptLzw(&'static str),

    /// No SP3 epoch brackets the observation epoch.
    #[error("no ephemeris epoch within 15 minutes of the observation")]
    NoEphemerisEpoch,

    /// Solving (x, y, z, t) requires at least 4 matched vehicles.
    #[error("not enough matched satellites ({0} found, 4 required)")]
    NotEnoughSatellites(usize),

    /// Degenerate satellite geometry: the normal matrix cannot be inverted.
    #[error("failed to invert normal matrix")]
    MatrixInversion,

    /// Iterations diverged to a non finite state.
    #[error("solver reached a non finite state")]
    NonFiniteState,
}
