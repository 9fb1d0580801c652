use super::*;
use crate::ButtonKind;

fn compound(scan: u16, output: u16, secondary_output: u16) -> UnitConfig {
    UnitConfig::Compound {
        primary: ButtonConfig::synthetic_momentary(scan, output)
            .with_release(ReleaseBehaviour::SyntheticPress),
        secondary: ButtonConfig::secondary(secondary_output),
    }
}

#[test]
fn validate_ok() {
    let units = [
        UnitConfig::Primary(ButtonConfig::momentary(0, 0)),
        compound(1, 1, 0),
        UnitConfig::Primary(ButtonConfig::synthetic_momentary(2, 2)),
    ];

    assert_eq!(validate(&units, 3, 3), Ok(()));
}

#[test]
fn validate_scan_index() {
    let units = [
        UnitConfig::Primary(ButtonConfig::momentary(0, 0)),
        UnitConfig::Primary(ButtonConfig::momentary(40, 1)),
    ];

    assert_eq!(
        validate(&units, 40, 2),
        Err(LayoutError::ScanIndexOutOfRange {
            unit: 1,
            scan_index: 40
        })
    );
}

#[test]
fn validate_output_index() {
    let units = [compound(0, 0, 5)];

    assert_eq!(
        validate(&units, 1, 5),
        Err(LayoutError::OutputIndexOutOfRange {
            unit: 0,
            output_index: 5
        })
    );
}

#[test]
fn validate_duplicate_primary_output() {
    let units = [
        UnitConfig::Primary(ButtonConfig::momentary(0, 3)),
        UnitConfig::Primary(ButtonConfig::momentary(1, 2)),
        UnitConfig::Primary(ButtonConfig::momentary(2, 3)),
    ];

    assert_eq!(
        validate(&units, 3, 4),
        Err(LayoutError::DuplicateOutput {
            unit: 2,
            output_index: 3
        })
    );
}

#[test]
fn validate_secondary_may_share_output() {
    let units = [
        UnitConfig::Primary(ButtonConfig::momentary(0, 0)),
        compound(1, 1, 1),
        compound(2, 2, 0),
    ];

    assert_eq!(validate(&units, 3, 3), Ok(()));
}

#[test]
fn validate_release_behaviour() {
    let units = [UnitConfig::Primary(
        ButtonConfig::momentary(0, 0).with_release(ReleaseBehaviour::SyntheticPress),
    )];
    assert_eq!(
        validate(&units, 1, 1),
        Err(LayoutError::MissingSecondary { unit: 0 })
    );

    let units = [UnitConfig::Compound {
        primary: ButtonConfig::momentary(0, 0).with_release(ReleaseBehaviour::SyntheticPress),
        secondary: ButtonConfig::secondary(1).with_release(ReleaseBehaviour::SyntheticPress),
    }];
    assert_eq!(
        validate(&units, 1, 2),
        Err(LayoutError::UnexpectedSecondary { unit: 0 })
    );
}

#[test]
fn validate_unit_count_fits_header() {
    extern crate std;

    let unit = UnitConfig::Primary(ButtonConfig::momentary(0, 0));
    let units = std::vec![unit; u16::MAX as usize + 1];
    assert_eq!(validate(&units, 1, 1), Err(LayoutError::TooManyUnits));
}

#[test]
fn read_layout() {
    let units = [
        UnitConfig::Primary(ButtonConfig::momentary(22, 0).with_debounce(10)),
        compound(6, 1, 2),
        UnitConfig::Primary(ButtonConfig::synthetic_momentary(30, 3).with_momentary(80)),
    ];

    let mut reader = LayoutReader::new(serialize(40, 4, &units)).unwrap();
    assert_eq!(
        reader.header(),
        &LayoutHeader {
            scan_len: 40,
            output_count: 4,
            unit_count: 3
        }
    );

    assert_eq!(reader.next(), Some(Ok(units[0])));
    assert_eq!(reader.next(), Some(Ok(units[1])));
    let Some(Ok(UnitConfig::Primary(last))) = reader.next() else {
        panic!("expected a primary unit");
    };
    assert_eq!(last.kind, ButtonKind::SyntheticMomentary);
    assert_eq!(last.momentary_ms, 80);
    assert_eq!(reader.next(), None);
}

#[test]
fn read_bad_header() {
    assert_eq!(
        LayoutReader::new([PROTOCOL_VERSION + 1, 1, 1, 0]).err(),
        Some(LayoutError::VersionMismatch)
    );
    assert_eq!(
        LayoutReader::new([PROTOCOL_VERSION, 1]).err(),
        Some(LayoutError::Corrupt)
    );
}

#[test]
fn read_truncated() {
    let units = [compound(0, 0, 1)];
    let words = serialize(1, 2, &units);
    let mut reader = LayoutReader::new(words.take(HEADER_LEN + 7)).unwrap();

    assert_eq!(reader.next(), Some(Err(LayoutError::Corrupt)));
    assert_eq!(reader.next(), None);
}
