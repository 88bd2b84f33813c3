//! Observation file parsing.
use std::str::FromStr;

use gnss::prelude::{Constellation, SV};
use log::{debug, warn};

use crate::error::Error;

/// One code measurement: a GPS vehicle and the pseudorange it was
/// observed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationRecord {
    /// Observed vehicle
    pub sv: SV,
    /// Measured apparent distance in meters, clock errors included
    pub pseudorange_m: f64,
}

/// One timestamped set of [ObservationRecord]s, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationEpoch {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Records in file order. One per vehicle: a duplicated vehicle
    /// overwrites its previous record.
    pub records: Vec<ObservationRecord>,
}

/// Epoch header fields, in their exact line order after the `>` marker.
/// Headers are consumed through this schema, never by raw token index.
#[derive(Debug, Clone, Copy, PartialEq)]
enum HeaderField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

const HEADER_FIELDS: [HeaderField; 6] = [
    HeaderField::Year,
    HeaderField::Month,
    HeaderField::Day,
    HeaderField::Hour,
    HeaderField::Minute,
    HeaderField::Second,
];

impl HeaderField {
    const fn name(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
        }
    }
    /// Validates one token and assigns it to its slot.
    fn assign(&self, token: &str, epoch: &mut ObservationEpoch) -> Result<(), Error> {
        let invalid = || Error::EpochHeader {
            field: self.name(),
            token: token.to_string(),
        };
        match self {
            Self::Year => {
                epoch.year = token.parse::<i32>().map_err(|_| invalid())?;
            },
            Self::Month => {
                let month = token.parse::<u8>().map_err(|_| invalid())?;
                if !(1..=12).contains(&month) {
                    return Err(invalid());
                }
                epoch.month = month;
            },
            Self::Day => {
                let day = token.parse::<u8>().map_err(|_| invalid())?;
                if !(1..=31).contains(&day) {
                    return Err(invalid());
                }
                epoch.day = day;
            },
            Self::Hour => {
                let hour = token.parse::<u8>().map_err(|_| invalid())?;
                if hour > 23 {
                    return Err(invalid());
                }
                epoch.hour = hour;
            },
            Self::Minute => {
                let minute = token.parse::<u8>().map_err(|_| invalid())?;
                if minute > 59 {
                    return Err(invalid());
                }
                epoch.minute = minute;
            },
            Self::Second => {
                // leap second slots exist in observation files
                let second = token
                    .parse::<f64>()
                    .map_err(|_| invalid())?;
                if !(0.0..61.0).contains(&second) {
                    return Err(invalid());
                }
                epoch.second = second as u8;
            },
        }
        Ok(())
    }
}

/// Parses one `>` header line.
fn parse_header(line: &str) -> Result<ObservationEpoch, Error> {
    let mut epoch = ObservationEpoch {
        year: 0,
        month: 0,
        day: 0,
        hour: 0,
        minute: 0,
        second: 0,
        records: Vec::new(),
    };
    let content = line.trim_start_matches('>');
    let mut tokens = content.split_ascii_whitespace();
    for field in HEADER_FIELDS {
        let token = tokens.next().ok_or(Error::EpochHeader {
            field: field.name(),
            token: String::new(),
        })?;
        field.assign(token, &mut epoch)?;
    }
    // trailing tokens (flag, number of vehicles..) are not needed
    Ok(epoch)
}

/// Parses one `G` measurement line. Anything that is not a well formed
/// GPS measurement is discarded.
fn parse_record(line: &str) -> Option<ObservationRecord> {
    let mut tokens = line.split_ascii_whitespace();
    let sv_token = tokens.next()?;
    let sv = match SV::from_str(sv_token) {
        Ok(sv) => sv,
        Err(_) => {
            debug!("discarding malformed vehicle token \"{}\"", sv_token);
            return None;
        },
    };
    if sv.constellation != Constellation::GPS {
        return None;
    }
    let pr_token = match tokens.next() {
        Some(token) => token,
        None => {
            debug!("{}: missing pseudo range observation", sv);
            return None;
        },
    };
    match pr_token.parse::<f64>() {
        Ok(pseudorange_m) => Some(ObservationRecord { sv, pseudorange_m }),
        Err(_) => {
            debug!("{}: malformed pseudo range \"{}\"", sv, pr_token);
            None
        },
    }
}

/// Parses raw observation bytes into at most `max_epochs` epochs,
/// in file order. Empty input yields an empty set, not an error.
///
/// Tolerance policy: a malformed measurement line is skipped; a malformed
/// epoch header drops the whole epoch it opens (logged, never zeroed).
pub fn parse(bytes: &[u8], max_epochs: usize) -> Vec<ObservationEpoch> {
    let text = String::from_utf8_lossy(bytes);
    let mut epochs = Vec::<ObservationEpoch>::new();
    let mut current: Option<ObservationEpoch> = None;

    for line in text.lines() {
        if line.starts_with('>') {
            if let Some(done) = current.take() {
                epochs.push(done);
            }
            if epochs.len() >= max_epochs {
                debug!("epoch bound ({}) reached: remaining input ignored", max_epochs);
                return epochs;
            }
            match parse_header(line) {
                Ok(epoch) => current = Some(epoch),
                Err(e) => {
                    // skip the whole epoch: its records have no timestamp
                    warn!("dropping epoch: {}", e);
                },
            }
        } else if line.starts_with('G') {
            if let Some(epoch) = current.as_mut() {
                if let Some(record) = parse_record(line) {
                    push_record(epoch, record);
                }
            }
        }
        // any other line (blank, other constellation, header text) is ignored
    }
    if let Some(done) = current.take() {
        epochs.push(done);
    }
    epochs
}

/// Last write wins on a duplicated vehicle.
fn push_record(epoch: &mut ObservationEpoch, record: ObservationRecord) {
    if let Some(existing) = epoch.records.iter_mut().find(|r| r.sv == record.sv) {
        debug!("{}: duplicated measurement, keeping the last one", record.sv);
        *existing = record;
    } else {
        epoch.records.push(record);
    }
}
