#![no_std]
//! Types and encodings shared by the switchbox firmware and the `switchbox-config` tool.
//!
//! ```
//! use switchbox_common::{ButtonConfig, UnitConfig, validate};
//!
//! let units = [
//!     UnitConfig::Primary(ButtonConfig::momentary(0, 0)),
//!     UnitConfig::Primary(ButtonConfig::synthetic_momentary(1, 1)),
//! ];
//! assert!(validate(&units, 2, 2).is_ok());
//! ```

pub mod button_config;
pub mod layout;

pub use button_config::{ButtonConfig, ButtonKind, ReleaseBehaviour, UnitConfig};
pub use layout::{validate, LayoutError, LayoutHeader, LayoutReader};

/// Version of the binary layout format. Stored as the first word of every layout.
pub const PROTOCOL_VERSION: u16 = 1;

/// Minimum dwell after a press before a release will be reported.
pub const DEFAULT_DEBOUNCE_MS: u16 = 50;
/// Additional hold, after the debounce window, before a synthetic momentary input auto-releases.
pub const DEFAULT_MOMENTARY_MS: u16 = 50;
