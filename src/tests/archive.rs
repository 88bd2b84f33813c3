use rstest::rstest;

use crate::archive::GpsWeekDay;
use crate::error::Error;

#[rstest]
#[case(1980, 1, 6, 0, 0)] // GPS epoch itself
#[case(1980, 1, 12, 0, 6)] // last day of week 0
#[case(1980, 1, 13, 1, 0)] // first rollover
#[case(2006, 1, 1, 1356, 0)]
#[case(2019, 10, 27, 2077, 0)]
#[case(2021, 12, 6, 2187, 1)]
#[case(2021, 12, 13, 2188, 1)]
fn calendar_resolution(
    #[case] year: i32,
    #[case] month: u8,
    #[case] day: u8,
    #[case] week: u32,
    #[case] dow: u8,
) {
    let key = GpsWeekDay::from_calendar(year, month, day).unwrap();
    assert_eq!(key, GpsWeekDay { week, day: dow });
    // deterministic and idempotent
    assert_eq!(GpsWeekDay::from_calendar(year, month, day).unwrap(), key);
}

#[test]
fn seven_days_apart_is_one_week() {
    let a = GpsWeekDay::from_calendar(2021, 12, 6).unwrap();
    let b = GpsWeekDay::from_calendar(2021, 12, 13).unwrap();
    assert_eq!(b.week, a.week + 1);
    assert_eq!(b.day, a.day);
}

#[test]
fn pre_gps_epoch_is_rejected() {
    assert_eq!(
        GpsWeekDay::from_calendar(1980, 1, 5),
        Err(Error::PreGpsEpoch)
    );
    assert_eq!(
        GpsWeekDay::from_calendar(1979, 12, 31),
        Err(Error::PreGpsEpoch)
    );
}

#[test]
fn impossible_date_is_rejected() {
    assert!(matches!(
        GpsWeekDay::from_calendar(2021, 13, 1),
        Err(Error::InvalidDate(2021, 13, 1))
    ));
    assert!(matches!(
        GpsWeekDay::from_calendar(2021, 2, 30),
        Err(Error::InvalidDate(..))
    ));
}

#[test]
fn remote_addressing() {
    let key = GpsWeekDay::from_calendar(2021, 12, 6).unwrap();
    assert_eq!(key.filename(), "igs21871.sp3.Z");
    assert_eq!(
        key.remote_path("pub/gps/products"),
        "/pub/gps/products/2187/igs21871.sp3.Z"
    );
    // tolerant to decorated roots
    assert_eq!(
        key.remote_path("/pub/gps/products/"),
        "/pub/gps/products/2187/igs21871.sp3.Z"
    );
}
