use embassy_time::Instant;
use heapless::Vec;
use switchbox_common::{validate, LayoutError, UnitConfig};

use crate::{button::Delta, scan::InputState, unit::Unit};

/// Every unit of the controller, in registration order, and the per-output change buffer.
///
/// `UNITS` bounds the number of units, `OUTPUTS` is the number of logical buttons and `SCAN` the
/// number of scan positions per cycle.
pub struct UnitRegistry<const UNITS: usize, const OUTPUTS: usize, const SCAN: usize> {
    units: Vec<Unit, UNITS>,
    changes: [Delta; OUTPUTS],
}

impl<const UNITS: usize, const OUTPUTS: usize, const SCAN: usize>
    UnitRegistry<UNITS, OUTPUTS, SCAN>
{
    /// Build the registry from validated configs. Any configuration error refuses the whole set.
    pub fn new(configs: &[UnitConfig]) -> Result<Self, LayoutError> {
        if configs.len() > UNITS {
            crate::warn!("too many units: {} > {}", configs.len(), UNITS);
            return Err(LayoutError::TooManyUnits);
        }
        if let Err(err) = validate(configs, SCAN, OUTPUTS) {
            crate::warn!("invalid unit config {:?}", err);
            return Err(err);
        }

        let mut units = Vec::new();
        for config in configs {
            units
                .push(Unit::new(config))
                .map_err(|_| LayoutError::TooManyUnits)?;
        }
        crate::debug!("registered {} units", units.len());

        Ok(Self {
            units,
            changes: [Delta::None; OUTPUTS],
        })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Advance every unit once, in registration order, with a single `now` for the whole cycle.
    pub fn update(&mut self, state: &InputState<SCAN>, now: Instant) {
        for unit in self.units.iter_mut() {
            let is_active = state.is_active(unit.scan_index());
            unit.advance(is_active, now);
        }
    }

    /// Gather this cycle's deltas by output index. Outputs with no event are [Delta::None]; when
    /// two units write the same output the later-registered one wins.
    pub fn collect_changes(&mut self) -> &[Delta; OUTPUTS] {
        self.changes.fill(Delta::None);
        for unit in self.units.iter() {
            for (output_index, delta) in unit.state_changes() {
                self.changes[output_index as usize] = delta;
            }
        }
        &self.changes
    }

    /// The buffer filled by the last [Self::collect_changes].
    pub fn changes(&self) -> &[Delta; OUTPUTS] {
        &self.changes
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod test;
