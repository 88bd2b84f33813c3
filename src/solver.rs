//! Iterative least-squares position adjustment.
use log::debug;
use map_3d::{ecef2geodetic, rad2deg};
use nalgebra::{DVector, Matrix4, MatrixXx4, RowVector4, Vector3, Vector4};

use crate::cfg::Config;
use crate::constants::CLOCK_UNKNOWN_SCALING;
use crate::error::Error;
use crate::obs::ObservationEpoch;
use crate::solutions::{Contribution, PositionFix};
use crate::sp3::{Sp3Entry, Sp3Epoch};

/// (x, y, z, t) resolution requires this many matched vehicles.
pub const MIN_SV_REQUIRED: usize = 4;

/// Resolves one epoch against the ephemerides published for it.
///
/// Observations without a published ephemeris entry are excluded from the
/// adjustment. The refinement runs for exactly `cfg.iterations` rounds from
/// `cfg.apriori_ecef_m`, without convergence criteria: correctness relies
/// on the a priori being in the basin of convergence, which holds for any
/// Earth surface receiver.
pub fn resolve(
    epoch: &ObservationEpoch,
    ephemerides: &Sp3Epoch,
    cfg: &Config,
) -> Result<PositionFix, Error> {
    let matches = match_vehicles(epoch, ephemerides);
    if matches.len() < MIN_SV_REQUIRED {
        return Err(Error::NotEnoughSatellites(matches.len()));
    }

    let c = cfg.speed_of_light_m_s;

    // unit normalization (km -> m, us -> s) and vehicle clock correction,
    // invariant across iterations
    let positions_m: Vec<Vector3<f64>> = matches
        .iter()
        .map(|(_, entry)| Vector3::new(entry.x_km, entry.y_km, entry.z_km) * 1.0E3)
        .collect();

    let corrected_pr = DVector::<f64>::from_iterator(
        matches.len(),
        matches
            .iter()
            .map(|(pr, entry)| pr + entry.clock_us * 1.0E-6 * c),
    );

    let (mut x, mut y, mut z) = cfg.apriori_ecef_m;
    let mut t = 0.0_f64;

    for ith in 0..cfg.iterations {
        let mut rows = Vec::<RowVector4<f64>>::with_capacity(matches.len());
        let mut residuals = Vec::<f64>::with_capacity(matches.len());

        for (i, sv_pos) in positions_m.iter().enumerate() {
            let dx = x - sv_pos.x;
            let dy = y - sv_pos.y;
            let dz = z - sv_pos.z;
            let rho = (dx * dx + dy * dy + dz * dz).sqrt();
            residuals.push(corrected_pr[i] - rho);
            rows.push(RowVector4::new(
                dx / rho,
                dy / rho,
                dz / rho,
                c * CLOCK_UNKNOWN_SCALING,
            ));
        }

        let h = MatrixXx4::from_rows(&rows);
        let r = DVector::from_vec(residuals);

        let ht = h.transpose();
        let ht_h: Matrix4<f64> = &ht * &h;
        let ht_h_inv = ht_h.try_inverse().ok_or(Error::MatrixInversion)?;
        let dxyzt: Vector4<f64> = ht_h_inv * (&ht * &r);

        x += dxyzt[0];
        y += dxyzt[1];
        z += dxyzt[2];
        t += dxyzt[3];

        debug!(
            "(i={}) correction dx={:.3e} dy={:.3e} dz={:.3e} dt={:.3e}",
            ith, dxyzt[0], dxyzt[1], dxyzt[2], dxyzt[3]
        );
    }

    if !(x.is_finite() && y.is_finite() && z.is_finite() && t.is_finite()) {
        return Err(Error::NonFiniteState);
    }

    let (lat_rad, long_rad, _alt_m) = ecef2geodetic(x, y, z, cfg.ellipsoid);

    Ok(PositionFix {
        ecef_m: Vector3::new(x, y, z),
        latitude_deg: rad2deg(lat_rad),
        longitude_deg: rad2deg(long_rad),
        contributions: matches
            .iter()
            .map(|(pr, entry)| Contribution {
                sv: entry.sv,
                pseudorange_m: *pr,
                position_km: (entry.x_km, entry.y_km, entry.z_km),
                clock_us: entry.clock_us,
            })
            .collect(),
    })
}

/// Pairs each observation with its published ephemeris entry, in
/// observation order. Unmatched vehicles do not contribute.
fn match_vehicles<'a>(
    epoch: &ObservationEpoch,
    ephemerides: &'a Sp3Epoch,
) -> Vec<(f64, &'a Sp3Entry)> {
    let mut matches = Vec::with_capacity(epoch.records.len());
    for record in &epoch.records {
        match ephemerides.entries.iter().find(|e| e.sv == record.sv) {
            Some(entry) => matches.push((record.pseudorange_m, entry)),
            None => debug!("{}: no published ephemeris, excluded", record.sv),
        }
    }
    matches
}
