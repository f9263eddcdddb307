use pulsewire::timestamp::normalize;
use pulsewire::TelemetryError;

// Inclusive [1971, 2100] bounds per unit, same table the daemon uses.
const SECS_1971: i64 = 31_536_000;
const SECS_2100: i64 = 4_102_444_800;
const MILLI_1971: i64 = 31_536_000_000;
const MILLI_2100: i64 = 4_102_444_800_000;
const MICRO_1971: i64 = 31_536_000_000_000;
const MICRO_2100: i64 = 4_102_444_800_000_000;
const NANO_1971: i64 = 31_536_000_000_000_000;
const NANO_2100: i64 = 4_102_444_800_000_000_000;

#[test]
fn test_seconds_range() {
    // A 2023-ish epoch in seconds.
    let t = 1_700_000_000;
    let out = normalize(t).unwrap();
    assert_eq!(out, t * 1_000_000);
    // Round-trip: dividing by the unit multiplier recovers the input.
    assert_eq!(out / 1_000_000, t);
    assert!((MICRO_1971..=MICRO_2100).contains(&out));
}

#[test]
fn test_milliseconds_range() {
    let t = 1_700_000_000_000;
    let out = normalize(t).unwrap();
    assert_eq!(out, t * 1_000);
    assert_eq!(out / 1_000, t);
    assert!((MICRO_1971..=MICRO_2100).contains(&out));
}

#[test]
fn test_microseconds_identity() {
    let t = 1_700_000_000_000_000;
    assert_eq!(normalize(t).unwrap(), t);
}

#[test]
fn test_nanoseconds_range() {
    let t = 1_700_000_000_000_000_000;
    let out = normalize(t).unwrap();
    assert_eq!(out, t / 1_000);
    assert!((MICRO_1971..=MICRO_2100).contains(&out));
}

#[test]
fn test_range_boundaries_inclusive() {
    assert_eq!(normalize(SECS_1971).unwrap(), SECS_1971 * 1_000_000);
    assert_eq!(normalize(SECS_2100).unwrap(), SECS_2100 * 1_000_000);
    assert_eq!(normalize(NANO_2100).unwrap(), NANO_2100 / 1_000);
    assert_eq!(normalize(MICRO_2100).unwrap(), MICRO_2100);
}

#[test]
fn test_gaps_between_unit_ranges_fail() {
    // The four ranges are disjoint with dead zones between them. A value in
    // a gap (e.g. a seconds value from the year 2200) matches no unit.
    for bad in [SECS_2100 + 1, MILLI_1971 - 1, MILLI_2100 + 1, MICRO_2100 + 1, NANO_1971 - 1] {
        assert!(normalize(bad).is_err(), "gap value {} should fail", bad);
    }
}

#[test]
fn test_out_of_range_values_fail() {
    for bad in [0, 1, SECS_1971 - 1, -1_700_000_000, i64::MIN, i64::MAX] {
        match normalize(bad) {
            Err(TelemetryError::InvalidTimestamp(v)) => assert_eq!(v, bad),
            other => panic!("expected InvalidTimestamp for {}, got {:?}", bad, other),
        }
    }
}
