use crate::{DEFAULT_DEBOUNCE_MS, DEFAULT_MOMENTARY_MS};

/// Number of `u16` words in a serialized [ButtonConfig].
pub const RECORD_LEN: usize = 5;

pub(crate) const FLAG_SYNTHETIC_MOMENTARY: u16 = 1;
pub(crate) const FLAG_SYNTHETIC_PRESS: u16 = 1 << 1;
pub(crate) const FLAG_HAS_SECONDARY: u16 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonKind {
    /// Reports press and release as the contact closes and opens.
    #[default]
    Momentary,
    /// A maintained contact (toggle or rotary position) that auto-releases after the momentary
    /// hold, whether or not the contact opens.
    SyntheticMomentary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReleaseBehaviour {
    #[default]
    None,
    /// Each release of this button drives a secondary unit, producing a second event on the
    /// secondary's output.
    SyntheticPress,
}

/// Immutable per-unit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    pub kind: ButtonKind,
    /// Position in the per-cycle scan. Ignored for the secondary of a compound unit.
    pub scan_index: u16,
    /// Logical button number reported to the host.
    pub output_index: u16,
    pub debounce_ms: u16,
    /// Only meaningful for [ButtonKind::SyntheticMomentary].
    pub momentary_ms: u16,
    pub release_behaviour: ReleaseBehaviour,
}

impl ButtonConfig {
    pub const fn new(kind: ButtonKind, scan_index: u16, output_index: u16) -> Self {
        Self {
            kind,
            scan_index,
            output_index,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            momentary_ms: DEFAULT_MOMENTARY_MS,
            release_behaviour: ReleaseBehaviour::None,
        }
    }

    pub const fn momentary(scan_index: u16, output_index: u16) -> Self {
        Self::new(ButtonKind::Momentary, scan_index, output_index)
    }

    pub const fn synthetic_momentary(scan_index: u16, output_index: u16) -> Self {
        Self::new(ButtonKind::SyntheticMomentary, scan_index, output_index)
    }

    /// Config for the secondary of a compound unit. The scan index is never read.
    pub const fn secondary(output_index: u16) -> Self {
        Self::new(ButtonKind::SyntheticMomentary, 0, output_index)
    }

    pub const fn with_debounce(self, debounce_ms: u16) -> Self {
        Self {
            debounce_ms,
            ..self
        }
    }

    pub const fn with_momentary(self, momentary_ms: u16) -> Self {
        Self {
            momentary_ms,
            ..self
        }
    }

    pub const fn with_release(self, release_behaviour: ReleaseBehaviour) -> Self {
        Self {
            release_behaviour,
            ..self
        }
    }

    pub fn is_synthetic_momentary(&self) -> bool {
        matches!(self.kind, ButtonKind::SyntheticMomentary)
    }

    pub fn serialize(&self) -> [u16; RECORD_LEN] {
        let mut flags = 0;
        if self.is_synthetic_momentary() {
            flags |= FLAG_SYNTHETIC_MOMENTARY;
        }
        if matches!(self.release_behaviour, ReleaseBehaviour::SyntheticPress) {
            flags |= FLAG_SYNTHETIC_PRESS;
        }
        [
            flags,
            self.scan_index,
            self.output_index,
            self.debounce_ms,
            self.momentary_ms,
        ]
    }

    /// Reads one record. Returns the config and the raw flags word, or `None` if `bin` ran out.
    ///
    /// Unknown flag bits are ignored, so an unrecognised kind reads as [ButtonKind::Momentary].
    pub fn deserialize(bin: &mut impl Iterator<Item = u16>) -> Option<(Self, u16)> {
        let flags = bin.next()?;
        Some((
            Self {
                kind: if flags & FLAG_SYNTHETIC_MOMENTARY != 0 {
                    ButtonKind::SyntheticMomentary
                } else {
                    ButtonKind::Momentary
                },
                scan_index: bin.next()?,
                output_index: bin.next()?,
                debounce_ms: bin.next()?,
                momentary_ms: bin.next()?,
                release_behaviour: if flags & FLAG_SYNTHETIC_PRESS != 0 {
                    ReleaseBehaviour::SyntheticPress
                } else {
                    ReleaseBehaviour::None
                },
            },
            flags,
        ))
    }
}

/// How one registry slot is built: a plain unit, or a primary with an internally driven secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnitConfig {
    Primary(ButtonConfig),
    Compound {
        primary: ButtonConfig,
        secondary: ButtonConfig,
    },
}

impl UnitConfig {
    pub const fn primary(&self) -> &ButtonConfig {
        match self {
            UnitConfig::Primary(primary) | UnitConfig::Compound { primary, .. } => primary,
        }
    }

    pub const fn secondary(&self) -> Option<&ButtonConfig> {
        match self {
            UnitConfig::Primary(_) => None,
            UnitConfig::Compound { secondary, .. } => Some(secondary),
        }
    }

    pub fn serialize(&self) -> impl Iterator<Item = u16> {
        let mut primary = self.primary().serialize();
        let secondary = self.secondary().map(ButtonConfig::serialize);
        if secondary.is_some() {
            primary[0] |= FLAG_HAS_SECONDARY;
        }
        primary.into_iter().chain(secondary.into_iter().flatten())
    }
}

#[cfg(test)]
#[path = "button_config_test.rs"]
mod test;
