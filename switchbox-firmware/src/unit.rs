use core::iter;

use embassy_time::Instant;
use switchbox_common::{ReleaseBehaviour, UnitConfig};

use crate::button::{Delta, DebounceUnit};

/// One registry slot.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    Primary(DebounceUnit),
    /// A primary fed from the scan and a secondary fed only by the primary's releases.
    Compound {
        primary: DebounceUnit,
        secondary: DebounceUnit,
        rule: ReleaseBehaviour,
    },
}

impl Unit {
    pub fn new(config: &UnitConfig) -> Self {
        match config {
            UnitConfig::Primary(primary) => Unit::Primary(DebounceUnit::new(*primary)),
            UnitConfig::Compound { primary, secondary } => Unit::Compound {
                primary: DebounceUnit::new(*primary),
                secondary: DebounceUnit::new(*secondary),
                rule: primary.release_behaviour,
            },
        }
    }

    pub fn primary(&self) -> &DebounceUnit {
        match self {
            Unit::Primary(primary) | Unit::Compound { primary, .. } => primary,
        }
    }

    pub fn secondary(&self) -> Option<&DebounceUnit> {
        match self {
            Unit::Primary(_) => None,
            Unit::Compound { secondary, .. } => Some(secondary),
        }
    }

    pub fn scan_index(&self) -> usize {
        self.primary().config().scan_index as usize
    }

    /// Advance the primary with the sampled level. A compound secondary sees an inactive level on
    /// the cycle its primary reports a release and an active level on every other cycle.
    pub fn advance(&mut self, is_active: bool, now: Instant) {
        match self {
            Unit::Primary(primary) => {
                primary.advance(is_active, now);
            }
            Unit::Compound {
                primary,
                secondary,
                rule,
            } => {
                let delta = primary.advance(is_active, now);
                if matches!(rule, ReleaseBehaviour::SyntheticPress) {
                    secondary.advance(delta != Delta::Released, now);
                }
            }
        }
    }

    /// The `(output index, delta)` pairs for this cycle; primary first.
    pub fn state_changes(&self) -> impl Iterator<Item = (u16, Delta)> {
        let primary = self.primary().state_change();
        let secondary = self.secondary().map(DebounceUnit::state_change);
        iter::once(primary).chain(secondary)
    }
}

#[cfg(test)]
#[path = "unit_test.rs"]
mod test;
