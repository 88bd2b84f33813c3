//! Pipeline parametrization.
use std::time::Duration;

use map_3d::Ellipsoid;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::constants::SPEED_OF_LIGHT_M_S;

fn default_max_epochs() -> usize {
    10
}

fn default_iterations() -> usize {
    10
}

fn default_apriori() -> (f64, f64, f64) {
    // somewhere on the Earth surface, well inside the basin of
    // convergence for any terrestrial receiver
    (4_331_297.3480, 567_555.6390, 4_633_133.7280)
}

fn default_speed_of_light() -> f64 {
    SPEED_OF_LIGHT_M_S
}

fn default_ellipsoid() -> Ellipsoid {
    Ellipsoid::WGS84
}

fn default_host() -> String {
    "gdc.cddis.eosdis.nasa.gov".to_string()
}

fn default_port() -> u16 {
    21
}

fn default_product_root() -> String {
    "pub/gps/products".to_string()
}

fn default_credential() -> String {
    "anonymous".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Remote ephemeris archive parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct ArchiveConfig {
    /// Archive host name
    #[cfg_attr(feature = "serde", serde(default = "default_host"))]
    pub host: String,
    /// FTP control port
    #[cfg_attr(feature = "serde", serde(default = "default_port"))]
    pub port: u16,
    /// Directory below which weekly product directories live
    #[cfg_attr(feature = "serde", serde(default = "default_product_root"))]
    pub product_root: String,
    /// Public login pair: no secret is involved
    #[cfg_attr(feature = "serde", serde(default = "default_credential"))]
    pub username: String,
    #[cfg_attr(feature = "serde", serde(default = "default_credential"))]
    pub password: String,
    /// Bound on connection establishment and socket reads
    #[cfg_attr(feature = "serde", serde(default = "default_timeout"))]
    pub timeout: Duration,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            product_root: default_product_root(),
            username: default_credential(),
            password: default_credential(),
            timeout: default_timeout(),
        }
    }
}

/// Solver and pipeline configuration. All physical constants the solver
/// relies on live here, not in hidden module state, so they can be
/// substituted in tests.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    /// Hard bound on the number of epochs processed per file.
    /// Input past that point is discarded, deliberately.
    #[cfg_attr(feature = "serde", serde(default = "default_max_epochs"))]
    pub max_epochs: usize,
    /// Fixed number of least-squares refinements per epoch,
    /// without convergence criteria.
    #[cfg_attr(feature = "serde", serde(default = "default_iterations"))]
    pub iterations: usize,
    /// Initial (x, y, z) guess in meters, ECEF.
    #[cfg_attr(feature = "serde", serde(default = "default_apriori"))]
    pub apriori_ecef_m: (f64, f64, f64),
    /// Speed of light in m.s⁻¹, used both in the clock bias correction
    /// and in the clock partial derivative.
    #[cfg_attr(feature = "serde", serde(default = "default_speed_of_light"))]
    pub speed_of_light_m_s: f64,
    /// Reference ellipsoid for the final geodetic conversion.
    #[cfg_attr(feature = "serde", serde(skip, default = "default_ellipsoid"))]
    pub ellipsoid: Ellipsoid,
    /// Remote archive parameters.
    #[cfg_attr(feature = "serde", serde(default))]
    pub archive: ArchiveConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_epochs: default_max_epochs(),
            iterations: default_iterations(),
            apriori_ecef_m: default_apriori(),
            speed_of_light_m_s: default_speed_of_light(),
            ellipsoid: default_ellipsoid(),
            archive: ArchiveConfig::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    // [Ellipsoid] does not implement Debug
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("max_epochs", &self.max_epochs)
            .field("iterations", &self.iterations)
            .field("apriori_ecef_m", &self.apriori_ecef_m)
            .field("speed_of_light_m_s", &self.speed_of_light_m_s)
            .field("archive", &self.archive)
            .finish_non_exhaustive()
    }
}
