use embassy_time::{Duration, Instant};
use switchbox_common::ButtonConfig;

/// Wire value of a press. Inherited from the controller's report protocol; consumers should match
/// on [Delta] rather than rely on the sign.
pub const PRESSED_DELTA: i8 = -1;
/// Wire value of a release.
pub const RELEASED_DELTA: i8 = 1;

/// The event a unit emitted on the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delta {
    Pressed,
    #[default]
    None,
    Released,
}

impl Delta {
    pub const fn as_i8(self) -> i8 {
        match self {
            Delta::Pressed => PRESSED_DELTA,
            Delta::None => 0,
            Delta::Released => RELEASED_DELTA,
        }
    }

    pub const fn from_i8(value: i8) -> Self {
        match value {
            PRESSED_DELTA => Delta::Pressed,
            RELEASED_DELTA => Delta::Released,
            _ => Delta::None,
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, Delta::None)
    }
}

/// `Inactive` and `Active` are the settled, reported states. The presenting states hold a
/// unit after a transition until it may report the opposite edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    #[default]
    Inactive,
    Active,
    /// Reported as pressed but the contact has opened; waiting out the debounce window.
    ActivePresenting,
    /// Reported as released while the contact is still closed; waiting for it to open.
    InactivePresenting,
}

/// Debounce and presentation state for one scan position.
///
/// A press is reported on the first cycle the active level is seen. The debounce window it opens
/// gates the *next* release: the contact must be open past the window before the release is
/// reported. Synthetic momentary inputs also report a release once the momentary hold has
/// elapsed, even while the contact stays closed.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceUnit {
    config: ButtonConfig,
    state: ButtonState,
    debounce_until: Instant,
    momentary_until: Instant,
    delta: Delta,
}

impl DebounceUnit {
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            config,
            state: ButtonState::Inactive,
            debounce_until: Instant::MIN,
            momentary_until: Instant::MIN,
            delta: Delta::None,
        }
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// The delta recorded by the last [Self::advance].
    pub fn delta(&self) -> Delta {
        self.delta
    }

    pub fn state_change(&self) -> (u16, Delta) {
        (self.config.output_index, self.delta)
    }

    /// Advance one cycle. `is_active` is the sampled level at this unit's scan position with
    /// polarity already applied.
    pub fn advance(&mut self, is_active: bool, now: Instant) -> Delta {
        use ButtonState::*;

        let (state, delta) = match self.state {
            Inactive if is_active => {
                let debounce = Duration::from_millis(self.config.debounce_ms.into());
                let momentary = Duration::from_millis(self.config.momentary_ms.into());
                self.debounce_until = now + debounce;
                self.momentary_until = now + debounce + momentary;
                (Active, Delta::Pressed)
            }
            Inactive => (Inactive, Delta::None),
            Active if !is_active => (ActivePresenting, Delta::None),
            Active if self.config.is_synthetic_momentary() && now > self.momentary_until => {
                (InactivePresenting, Delta::Released)
            }
            Active => (Active, Delta::None),
            InactivePresenting if !is_active => (Inactive, Delta::None),
            InactivePresenting => (InactivePresenting, Delta::None),
            ActivePresenting if is_active => (Active, Delta::None),
            ActivePresenting if now > self.debounce_until => (Inactive, Delta::Released),
            ActivePresenting => (ActivePresenting, Delta::None),
        };

        self.state = state;
        self.delta = delta;
        delta
    }
}

#[cfg(test)]
#[path = "button_test.rs"]
mod test;
