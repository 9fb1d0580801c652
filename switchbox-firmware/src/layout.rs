//! The controller's own wiring: how its scan is laid out and which logical button each input
//! drives.

use heapless::Vec;
use switchbox_common::{ButtonConfig, ButtonKind, LayoutError, LayoutReader, UnitConfig};

use crate::{
    registry::UnitRegistry,
    scan::InputState,
};

pub const MATRIX_COLUMNS: usize = 7;
pub const MATRIX_ROWS: usize = 4;
pub const ROTARY_POSITIONS: usize = 8;
pub const ENCODER_COUNT: usize = 2;

/// Matrix, then rotary switch, then two pseudo-pins per encoder.
pub const SCAN_LEN: usize =
    MATRIX_COLUMNS * MATRIX_ROWS + ROTARY_POSITIONS + ENCODER_COUNT * 2;
pub const OUTPUT_COUNT: usize = 29;

/// Scan position for each logical button.
const SCAN_MAP: [u16; OUTPUT_COUNT] = [
    // push buttons
    22, 20, 23, 21, 14, 12, 15, 13, //
    // toggle switches
    6, 4, 8, 10, 19, 17, 1, 3, //
    // rotary switch
    30, 29, 28, 35, 34, 33, 32, 31, //
    // encoders
    36, 37, 27, 38, //
    // encoder push button
    39,
];

const SWITCHES: core::ops::Range<usize> = 8..16;
const ROTARY: core::ops::Range<usize> = 16..24;

pub type DefaultRegistry<const UNITS: usize> = UnitRegistry<UNITS, OUTPUT_COUNT, SCAN_LEN>;

/// How the toggle switches present themselves to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    /// Switches pulse press then release on each flip; suits games that bind to button presses.
    #[default]
    Driving,
    /// Switches are held down for as long as they are closed.
    Flying,
}

pub const fn default_layout(profile: Profile) -> [UnitConfig; OUTPUT_COUNT] {
    let mut units = [UnitConfig::Primary(ButtonConfig::momentary(0, 0)); OUTPUT_COUNT];
    let mut i = 0;
    while i < OUTPUT_COUNT {
        let synthetic = (i >= ROTARY.start && i < ROTARY.end)
            || (i >= SWITCHES.start && i < SWITCHES.end && matches!(profile, Profile::Driving));
        let kind = if synthetic {
            ButtonKind::SyntheticMomentary
        } else {
            ButtonKind::Momentary
        };
        units[i] = UnitConfig::Primary(ButtonConfig::new(kind, SCAN_MAP[i], i as u16));
        i += 1;
    }
    units
}

pub const DEFAULT_LAYOUT: [UnitConfig; OUTPUT_COUNT] = default_layout(Profile::Driving);

/// Decode and validate a binary layout into a registry.
pub fn load<const UNITS: usize, const OUTPUTS: usize, const SCAN: usize>(
    words: impl IntoIterator<Item = u16>,
) -> Result<UnitRegistry<UNITS, OUTPUTS, SCAN>, LayoutError> {
    let reader = LayoutReader::new(words)?;
    let header = *reader.header();
    if header.scan_len as usize != SCAN || header.output_count as usize != OUTPUTS {
        return Err(LayoutError::SizeMismatch);
    }

    let mut configs: Vec<UnitConfig, UNITS> = Vec::new();
    for config in reader {
        configs
            .push(config?)
            .map_err(|_| LayoutError::TooManyUnits)?;
    }

    UnitRegistry::new(&configs)
}

/// [load] the layout, or fall back to [DEFAULT_LAYOUT] if it cannot be used.
pub fn load_or_default<const UNITS: usize>(
    words: impl IntoIterator<Item = u16>,
) -> Result<DefaultRegistry<UNITS>, LayoutError> {
    match load(words) {
        Ok(registry) => Ok(registry),
        Err(err) => {
            crate::info!("error loading layout {:?}; using default", err);
            UnitRegistry::new(&DEFAULT_LAYOUT)
        }
    }
}

/// One raw sample of the controller hardware, as levels read from the pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerSample {
    /// `matrix[column][row]`
    pub matrix: [[bool; MATRIX_ROWS]; MATRIX_COLUMNS],
    pub rotary: [bool; ROTARY_POSITIONS],
    /// Signed change of each encoder since the previous sample.
    pub encoders: [i32; ENCODER_COUNT],
}

impl Default for ControllerSample {
    fn default() -> Self {
        Self {
            matrix: [[true; MATRIX_ROWS]; MATRIX_COLUMNS],
            rotary: [true; ROTARY_POSITIONS],
            encoders: [0; ENCODER_COUNT],
        }
    }
}

impl ControllerSample {
    /// Write the sample in scan order.
    pub fn write_to(&self, state: &mut InputState<SCAN_LEN>) {
        let mut builder = state.builder();
        for column in self.matrix.iter() {
            builder.push_levels(column.iter().copied());
        }
        builder.push_levels(self.rotary.iter().copied());
        for delta in self.encoders {
            builder.push_encoder(delta);
        }
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod test;
