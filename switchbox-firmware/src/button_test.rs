use switchbox_common::ReleaseBehaviour;

use super::*;

const T0: u64 = 1_000;

fn at(ms: u64) -> Instant {
    Instant::from_millis(T0 + ms)
}

#[test]
fn delta_wire_values() {
    assert_eq!(Delta::Pressed.as_i8(), -1);
    assert_eq!(Delta::None.as_i8(), 0);
    assert_eq!(Delta::Released.as_i8(), 1);

    assert_eq!(Delta::from_i8(-1), Delta::Pressed);
    assert_eq!(Delta::from_i8(1), Delta::Released);
    assert_eq!(Delta::from_i8(0), Delta::None);
    assert_eq!(Delta::from_i8(5), Delta::None);
}

#[test]
fn press_reported_on_first_cycle() {
    let mut unit = DebounceUnit::new(ButtonConfig::momentary(3, 7));

    assert_eq!(unit.advance(false, at(0)), Delta::None);
    assert_eq!(unit.state(), ButtonState::Inactive);

    assert_eq!(unit.advance(true, at(1)), Delta::Pressed);
    assert_eq!(unit.state(), ButtonState::Active);
    assert_eq!(unit.state_change(), (7, Delta::Pressed));

    assert_eq!(unit.advance(true, at(2)), Delta::None);
    assert_eq!(unit.state_change(), (7, Delta::None));
}

#[test]
fn momentary_release_waits_for_debounce() {
    let mut unit = DebounceUnit::new(ButtonConfig::momentary(0, 0).with_debounce(50));

    assert_eq!(unit.advance(true, at(0)), Delta::Pressed);

    for cycle in 1..10 {
        assert_eq!(unit.advance(false, at(cycle * 5)), Delta::None, "cycle {cycle}");
        assert_eq!(unit.state(), ButtonState::ActivePresenting);
    }

    assert_eq!(unit.advance(false, at(55)), Delta::Released);
    assert_eq!(unit.state(), ButtonState::Inactive);

    assert_eq!(unit.advance(false, at(60)), Delta::None);
}

#[test]
fn release_needs_deadline_strictly_passed() {
    let mut unit = DebounceUnit::new(ButtonConfig::momentary(0, 0).with_debounce(50));

    unit.advance(true, at(0));
    assert_eq!(unit.advance(false, at(50)), Delta::None);
    assert_eq!(unit.advance(false, at(51)), Delta::Released);
}

#[test]
fn bounce_is_absorbed() {
    let mut unit = DebounceUnit::new(ButtonConfig::momentary(0, 0).with_debounce(20));

    assert_eq!(unit.advance(true, at(0)), Delta::Pressed);

    let mut events = 0;
    for (i, level) in [false, true, false, true, false, false, true, false]
        .into_iter()
        .enumerate()
    {
        if !unit.advance(level, at(i as u64 * 2 + 1)).is_none() {
            events += 1;
        }
    }
    assert_eq!(events, 0);
    assert_eq!(unit.state(), ButtonState::ActivePresenting);

    assert_eq!(unit.advance(false, at(21)), Delta::Released);
}

#[test]
fn momentary_held_never_auto_releases() {
    let mut unit = DebounceUnit::new(
        ButtonConfig::momentary(0, 0)
            .with_debounce(10)
            .with_momentary(10),
    );

    assert_eq!(unit.advance(true, at(0)), Delta::Pressed);
    for ms in (5..500).step_by(5) {
        assert_eq!(unit.advance(true, at(ms)), Delta::None);
    }
    assert_eq!(unit.state(), ButtonState::Active);
}

#[test]
fn synthetic_momentary_auto_release() {
    let mut unit = DebounceUnit::new(
        ButtonConfig::synthetic_momentary(0, 0)
            .with_debounce(25)
            .with_momentary(30),
    );

    assert_eq!(unit.advance(true, at(0)), Delta::Pressed);

    for ms in (5..=55).step_by(5) {
        assert_eq!(unit.advance(true, at(ms)), Delta::None, "at {ms}ms");
    }

    assert_eq!(unit.advance(true, at(56)), Delta::Released);
    assert_eq!(unit.state(), ButtonState::InactivePresenting);

    for ms in (60..300).step_by(10) {
        assert_eq!(unit.advance(true, at(ms)), Delta::None);
        assert_eq!(unit.state(), ButtonState::InactivePresenting);
    }

    assert_eq!(unit.advance(false, at(300)), Delta::None);
    assert_eq!(unit.state(), ButtonState::Inactive);

    assert_eq!(unit.advance(true, at(310)), Delta::Pressed);
}

#[test]
fn synthetic_momentary_opened_early_releases_normally() {
    let mut unit = DebounceUnit::new(
        ButtonConfig::synthetic_momentary(0, 0)
            .with_debounce(25)
            .with_momentary(30),
    );

    assert_eq!(unit.advance(true, at(0)), Delta::Pressed);
    assert_eq!(unit.advance(false, at(10)), Delta::None);
    assert_eq!(unit.advance(false, at(26)), Delta::Released);
    assert_eq!(unit.state(), ButtonState::Inactive);

    assert_eq!(unit.advance(false, at(100)), Delta::None);
}

#[test]
fn release_behaviour_does_not_change_fsm() {
    let mut unit = DebounceUnit::new(
        ButtonConfig::momentary(0, 0)
            .with_debounce(5)
            .with_release(ReleaseBehaviour::SyntheticPress),
    );

    assert_eq!(unit.advance(true, at(0)), Delta::Pressed);
    assert_eq!(unit.advance(false, at(6)), Delta::None);
    assert_eq!(unit.advance(false, at(7)), Delta::Released);
}
