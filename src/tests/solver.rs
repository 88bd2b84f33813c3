use std::str::FromStr;

use crate::cfg::Config;
use crate::error::Error;
use crate::obs::{ObservationEpoch, ObservationRecord};
use crate::prelude::SV;
use crate::solver::resolve;
use crate::sp3::{Sp3Entry, Sp3Epoch};
use crate::tests::init_logger;

/// Synthetic constellation with exactly computed pseudoranges from a
/// known receiver location (4331300.0, 567560.0, 4633140.0) m ECEF,
/// a few meters away from the solver's a priori seed.
fn fixture() -> (ObservationEpoch, Sp3Epoch) {
    let vehicles = [
        ("G02", 15600.123456, 7540.567890, 20140.987654, 12.345678, 20394890.966543),
        ("G05", -11200.456789, 13910.111213, 19500.141516, -45.678912, 25317584.722254),
        ("G10", 1250.171819, 23190.202122, 13280.232425, 103.456789, 24383109.339466),
        ("G21", 20100.262728, -4560.293031, 16890.323334, -7.891234, 20622588.949170),
        ("G30", 9870.353637, 18200.383940, 14955.414243, 56.789123, 21152456.404243),
    ];
    let mut records = Vec::new();
    let mut entries = Vec::new();
    for (name, x_km, y_km, z_km, clock_us, pseudorange_m) in vehicles {
        let sv = SV::from_str(name).unwrap();
        records.push(ObservationRecord { sv, pseudorange_m });
        entries.push(Sp3Entry {
            sv,
            x_km,
            y_km,
            z_km,
            clock_us,
        });
    }
    (
        ObservationEpoch {
            year: 2021,
            month: 12,
            day: 6,
            hour: 3,
            minute: 15,
            second: 30,
            records,
        },
        Sp3Epoch {
            year: 2021,
            month: 12,
            day: 6,
            hour: 3,
            minute: 15,
            entries,
        },
    )
}

#[test]
fn recovers_known_position() {
    init_logger();
    let (epoch, ephemerides) = fixture();
    let fix = resolve(&epoch, &ephemerides, &Config::default()).unwrap();

    assert!((fix.ecef_m[0] - 4331300.0).abs() < 1.0E-3, "x={}", fix.ecef_m[0]);
    assert!((fix.ecef_m[1] - 567560.0).abs() < 1.0E-3, "y={}", fix.ecef_m[1]);
    assert!((fix.ecef_m[2] - 4633140.0).abs() < 1.0E-3, "z={}", fix.ecef_m[2]);

    assert!((fix.latitude_deg - 46.877112185).abs() < 1.0E-6);
    assert!((fix.longitude_deg - 7.465325391).abs() < 1.0E-6);

    assert_eq!(fix.contributions.len(), 5);
    let g02 = &fix.contributions[0];
    assert_eq!(g02.sv, SV::from_str("G02").unwrap());
    assert!((g02.position_km.0 - 15600.123456).abs() < 1.0E-9);
    assert!((g02.clock_us - 12.345678).abs() < 1.0E-9);
}

#[test]
fn three_vehicles_is_not_enough() {
    let (mut epoch, ephemerides) = fixture();
    epoch.records.truncate(3);
    assert_eq!(
        resolve(&epoch, &ephemerides, &Config::default()),
        Err(Error::NotEnoughSatellites(3))
    );
}

#[test]
fn unmatched_observations_are_excluded() {
    let (epoch, mut ephemerides) = fixture();
    // only 3 published vehicles remain: under the minimum
    ephemerides.entries.truncate(3);
    assert_eq!(
        resolve(&epoch, &ephemerides, &Config::default()),
        Err(Error::NotEnoughSatellites(3))
    );
}

#[test]
fn aligned_vehicles_are_singular() {
    init_logger();
    let (mut epoch, mut ephemerides) = fixture();
    // every vehicle sits on the receiver's z axis: the x and y partials
    // vanish and the normal matrix is rank deficient
    let cfg = Config {
        apriori_ecef_m: (4_331_000.0, 567_000.0, 4_633_000.0),
        ..Default::default()
    };
    for (i, (name, z_km)) in [
        ("G02", 24_633.0),
        ("G05", 25_633.0),
        ("G10", 26_633.0),
        ("G21", 27_633.0),
    ]
    .iter()
    .enumerate()
    {
        let sv = SV::from_str(name).unwrap();
        epoch.records[i] = ObservationRecord {
            sv,
            pseudorange_m: 21.0E6,
        };
        ephemerides.entries[i] = Sp3Entry {
            sv,
            x_km: 4331.0,
            y_km: 567.0,
            z_km: *z_km,
            clock_us: 0.0,
        };
    }
    epoch.records.truncate(4);
    ephemerides.entries.truncate(4);
    assert_eq!(
        resolve(&epoch, &ephemerides, &cfg),
        Err(Error::MatrixInversion)
    );
}

#[test]
fn iterations_come_from_the_configuration() {
    let (epoch, ephemerides) = fixture();
    let cfg = Config {
        iterations: 1,
        ..Default::default()
    };
    // one Gauss-Newton step from a seed a few meters off is not exact yet,
    // but already lands within centimeters
    let fix = resolve(&epoch, &ephemerides, &cfg).unwrap();
    let err = ((fix.ecef_m[0] - 4331300.0).powi(2)
        + (fix.ecef_m[1] - 567560.0).powi(2)
        + (fix.ecef_m[2] - 4633140.0).powi(2))
    .sqrt();
    assert!(err < 1.0, "single iteration error: {} m", err);
    assert!(err > 1.0E-9);
}
