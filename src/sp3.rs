//! SP3 precise orbit product parsing.
use std::str::FromStr;

use gnss::prelude::{Constellation, SV};
use log::{debug, warn};

use crate::error::Error;

/// Position and clock state of one vehicle, as published.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sp3Entry {
    pub sv: SV,
    /// ECEF position in kilometers
    pub x_km: f64,
    pub y_km: f64,
    pub z_km: f64,
    /// Clock bias in microseconds
    pub clock_us: f64,
}

/// One publication epoch of the orbit product.
#[derive(Debug, Clone, PartialEq)]
pub struct Sp3Epoch {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub entries: Vec<Sp3Entry>,
}

fn new_epoch(line: &str) -> bool {
    line.starts_with('*')
}

fn position_entry(line: &str) -> bool {
    line.starts_with('P')
}

fn end_of_file(line: &str) -> bool {
    line.starts_with("EOF")
}

/// Epoch header fields after the `*` marker, in line order.
#[derive(Debug, Clone, Copy, PartialEq)]
enum EpochField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

const EPOCH_FIELDS: [EpochField; 5] = [
    EpochField::Year,
    EpochField::Month,
    EpochField::Day,
    EpochField::Hour,
    EpochField::Minute,
];

impl EpochField {
    const fn name(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
        }
    }
    fn assign(&self, token: &str, epoch: &mut Sp3Epoch) -> Result<(), Error> {
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
        }
        Ok(())
    }
}

fn parse_epoch_header(line: &str) -> Result<Sp3Epoch, Error> {
    let mut epoch = Sp3Epoch {
        year: 0,
        month: 0,
        day: 0,
        hour: 0,
        minute: 0,
        entries: Vec::new(),
    };
    let content = line.trim_start_matches('*');
    let mut tokens = content.split_ascii_whitespace();
    for field in EPOCH_FIELDS {
        let token = tokens.next().ok_or(Error::EpochHeader {
            field: field.name(),
            token: String::new(),
        })?;
        field.assign(token, &mut epoch)?;
    }
    // seconds are published too, but products are minute aligned
    Ok(epoch)
}

/// Parses one `P` entry line. Non GPS vehicles and malformed lines
/// are discarded.
fn parse_entry(line: &str) -> Option<Sp3Entry> {
    let mut tokens = line.split_ascii_whitespace();
    let sv_token = tokens.next()?;
    // "PG01" -> "G01"
    let sv = match SV::from_str(sv_token.get(1..)?) {
        Ok(sv) => sv,
        Err(_) => {
            debug!("discarding malformed vehicle token \"{}\"", sv_token);
            return None;
        },
    };
    if sv.constellation != Constellation::GPS {
        return None;
    }
    let mut coordinates = [0.0_f64; 4];
    for slot in coordinates.iter_mut() {
        let token = tokens.next()?;
        match token.parse::<f64>() {
            Ok(value) => *slot = value,
            Err(_) => {
                debug!("{}: malformed coordinates \"{}\"", sv, token);
                return None;
            },
        }
    }
    Some(Sp3Entry {
        sv,
        x_km: coordinates[0],
        y_km: coordinates[1],
        z_km: coordinates[2],
        clock_us: coordinates[3],
    })
}

/// Parses decompressed SP3 bytes, best effort: malformed entry lines are
/// skipped without aborting the file.
pub fn parse(bytes: &[u8]) -> Vec<Sp3Epoch> {
    let text = String::from_utf8_lossy(bytes);
    let mut epochs = Vec::<Sp3Epoch>::new();
    let mut current: Option<Sp3Epoch> = None;

    for line in text.lines() {
        if end_of_file(line) {
            break;
        } else if new_epoch(line) {
            if let Some(done) = current.take() {
                epochs.push(done);
            }
            match parse_epoch_header(line) {
                Ok(epoch) => current = Some(epoch),
                Err(e) => warn!("dropping product epoch: {}", e),
            }
        } else if position_entry(line) {
            if let Some(epoch) = current.as_mut() {
                if let Some(entry) = parse_entry(line) {
                    epoch.entries.push(entry);
                }
            }
        }
        // header, comment and velocity lines are not needed
    }
    if let Some(done) = current.take() {
        epochs.push(done);
    }
    epochs
}
