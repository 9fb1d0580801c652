//! The binary layout: a header followed by one record per unit.
//!
//! ```text
//! PROTOCOL_VERSION, scan_len, output_count, unit_count,
//! [flags, scan_index, output_index, debounce_ms, momentary_ms]   (primary)
//! [flags, scan_index, output_index, debounce_ms, momentary_ms]   (secondary, if flagged)
//! ...
//! ```
//!
//! Flags: bit 0 synthetic momentary, bit 1 synthetic press on release, bit 2 a secondary record
//! follows.

use crate::{
    button_config::{ButtonConfig, ReleaseBehaviour, UnitConfig, FLAG_HAS_SECONDARY},
    PROTOCOL_VERSION,
};

pub const HEADER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    VersionMismatch,
    Corrupt,
    /// The layout was built for a different scan length or output count.
    SizeMismatch,
    TooManyUnits,
    ScanIndexOutOfRange { unit: usize, scan_index: u16 },
    OutputIndexOutOfRange { unit: usize, output_index: u16 },
    /// Two units report their primary event on the same output.
    DuplicateOutput { unit: usize, output_index: u16 },
    /// The unit synthesizes a press on release but has no secondary to drive.
    MissingSecondary { unit: usize },
    /// A secondary asked to drive a secondary of its own.
    UnexpectedSecondary { unit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayoutHeader {
    pub scan_len: u16,
    pub output_count: u16,
    pub unit_count: u16,
}

/// Check a set of units against the scan and output sizes they will run with.
///
/// Outputs of a compound unit's secondary may overlap any other output; collisions there are
/// resolved at run time by registration order. Two primaries on one output are rejected.
pub fn validate(
    units: &[UnitConfig],
    scan_len: usize,
    output_count: usize,
) -> Result<(), LayoutError> {
    if units.len() > u16::MAX as usize {
        return Err(LayoutError::TooManyUnits);
    }
    for (unit, config) in units.iter().enumerate() {
        let primary = config.primary();
        if primary.scan_index as usize >= scan_len {
            return Err(LayoutError::ScanIndexOutOfRange {
                unit,
                scan_index: primary.scan_index,
            });
        }

        for output_index in
            core::iter::once(primary.output_index).chain(config.secondary().map(|s| s.output_index))
        {
            if output_index as usize >= output_count {
                return Err(LayoutError::OutputIndexOutOfRange { unit, output_index });
            }
        }

        match config.secondary() {
            None if matches!(primary.release_behaviour, ReleaseBehaviour::SyntheticPress) => {
                return Err(LayoutError::MissingSecondary { unit });
            }
            Some(secondary)
                if matches!(secondary.release_behaviour, ReleaseBehaviour::SyntheticPress) =>
            {
                return Err(LayoutError::UnexpectedSecondary { unit });
            }
            _ => {}
        }

        if units[..unit]
            .iter()
            .any(|other| other.primary().output_index == primary.output_index)
        {
            return Err(LayoutError::DuplicateOutput {
                unit,
                output_index: primary.output_index,
            });
        }
    }
    Ok(())
}

/// Serialize a complete layout, header included. The unit count is stored in one word, so
/// `units` must have passed [validate].
pub fn serialize(
    scan_len: u16,
    output_count: u16,
    units: &[UnitConfig],
) -> impl Iterator<Item = u16> + '_ {
    [PROTOCOL_VERSION, scan_len, output_count, units.len() as u16]
        .into_iter()
        .chain(units.iter().flat_map(UnitConfig::serialize))
}

/// Decodes units from a binary layout. Does not [validate] them.
pub struct LayoutReader<I: Iterator<Item = u16>> {
    iter: I,
    header: LayoutHeader,
    remaining: u16,
}

impl<I: Iterator<Item = u16>> LayoutReader<I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Result<Self, LayoutError> {
        let mut iter = iter.into_iter();
        if iter.next().ok_or(LayoutError::Corrupt)? != PROTOCOL_VERSION {
            return Err(LayoutError::VersionMismatch);
        }
        let header = LayoutHeader {
            scan_len: iter.next().ok_or(LayoutError::Corrupt)?,
            output_count: iter.next().ok_or(LayoutError::Corrupt)?,
            unit_count: iter.next().ok_or(LayoutError::Corrupt)?,
        };
        Ok(Self {
            iter,
            remaining: header.unit_count,
            header,
        })
    }

    pub fn header(&self) -> &LayoutHeader {
        &self.header
    }
}

impl<I: Iterator<Item = u16>> Iterator for LayoutReader<I> {
    type Item = Result<UnitConfig, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let Some((primary, flags)) = ButtonConfig::deserialize(&mut self.iter) else {
            self.remaining = 0;
            return Some(Err(LayoutError::Corrupt));
        };
        if flags & FLAG_HAS_SECONDARY == 0 {
            return Some(Ok(UnitConfig::Primary(primary)));
        }
        match ButtonConfig::deserialize(&mut self.iter) {
            Some((secondary, _)) => Some(Ok(UnitConfig::Compound { primary, secondary })),
            None => {
                self.remaining = 0;
                Some(Err(LayoutError::Corrupt))
            }
        }
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod test;
