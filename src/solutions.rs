//! Solver products.
use gnss::prelude::SV;
use nalgebra::Vector3;

use crate::error::Error;

/// Matched measurement / ephemeris pair that contributed to a fix,
/// as consumed by the adjustment (pre unit conversion).
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub sv: SV,
    /// Observed pseudorange in meters
    pub pseudorange_m: f64,
    /// Published vehicle position in kilometers
    pub position_km: (f64, f64, f64),
    /// Published vehicle clock bias in microseconds
    pub clock_us: f64,
}

/// Resolved receiver position for one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    /// ECEF position in meters
    pub ecef_m: Vector3<f64>,
    /// Latitude in decimal degrees
    pub latitude_deg: f64,
    /// Longitude in decimal degrees
    pub longitude_deg: f64,
    /// The vehicles this fix was resolved from
    pub contributions: Vec<Contribution>,
}

/// Per epoch outcome. Failures are scoped to one epoch so a multi epoch
/// file still returns every solvable fix.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSolution {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub fix: Result<PositionFix, Error>,
}
