#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

pub mod archive;
pub mod cfg;
pub mod obs;
pub mod pipeline;
pub mod solutions;
pub mod solver;
pub mod sp3;

mod constants;
mod error;

#[cfg(test)]
mod tests;

pub use error::Error;

// prelude
pub mod prelude {
    pub use crate::archive::{CddisFtp, EphemerisSource, GpsWeekDay};
    pub use crate::cfg::{ArchiveConfig, Config};
    pub use crate::obs::{ObservationEpoch, ObservationRecord};
    pub use crate::pipeline::Pipeline;
    pub use crate::solutions::{Contribution, EpochSolution, PositionFix};
    pub use crate::sp3::{Sp3Entry, Sp3Epoch};
    pub use crate::Error;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use map_3d::Ellipsoid;
}
