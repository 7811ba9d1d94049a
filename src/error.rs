//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction, raised before any I/O
//! - [`Error`] - Runtime errors while driving the display
//!
//! ## Example
//!
//! ```
//! use lcdclock::{Builder, BuilderError};
//!
//! // Missing device
//! let result = Builder::new().address(0x3f).build();
//! assert!(matches!(result, Err(BuilderError::MissingDevice)));
//!
//! // Sensor identifiers are exactly 15 characters
//! let result = Builder::new()
//!     .device("/dev/i2c-1")
//!     .address(0x3f)
//!     .sensor_id("28-0000")
//!     .build();
//! assert!(matches!(result, Err(BuilderError::InvalidSensorId { len: 7 })));
//! ```

use crate::interface::Bus;

/// Length of a 1-wire sensor identifier such as `28-0316a2794aff`
pub const SENSOR_ID_LEN: usize = 15;

/// Highest 7-bit bus address
pub const MAX_BUS_ADDRESS: u32 = 0x7F;

/// Errors that can occur when driving the display
///
/// Generic over the bus type to preserve the specific transport error.
#[derive(Debug)]
pub enum Error<B: Bus> {
    /// Bus write failed
    ///
    /// The display protocol is write-only, so there is nothing to recover from.
    /// Callers treat this as fatal.
    Bus(B::Error),
    /// Glyph slot outside the 8 CGRAM entries
    InvalidGlyphSlot {
        /// Requested slot
        slot: u8,
    },
    /// Text contains a character the controller's ROM cannot show
    ///
    /// Only ASCII and the CGRAM codes 0x00-0x07 are accepted.
    UnsupportedChar {
        /// The rejected character
        ch: char,
    },
}

impl<B: Bus> core::fmt::Display for Error<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "Write error: {e:?}"),
            Self::InvalidGlyphSlot { slot } => {
                write!(f, "Invalid glyph slot {slot} (must be 0-7)")
            }
            Self::UnsupportedChar { ch } => {
                write!(f, "Character {ch:?} cannot be shown on the panel")
            }
        }
    }
}

impl<B: Bus + core::fmt::Debug> core::error::Error for Error<B> {}

/// Errors that can occur when building configuration
///
/// These errors occur before the bus is opened or the sensor is touched.
#[cfg(feature = "std")]
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Bus device path was not specified
    MissingDevice,
    /// Bus address was not specified
    MissingAddress,
    /// Bus address could not be parsed or is outside the 7-bit range
    InvalidAddress {
        /// Offending input
        value: String,
    },
    /// Sensor identifier has the wrong length
    InvalidSensorId {
        /// Length of the rejected identifier
        len: usize,
    },
    /// No sensor identifier and missing sensors are not allowed
    MissingSensorId,
}

#[cfg(feature = "std")]
impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDevice => write!(f, "Bus device must be specified"),
            Self::MissingAddress => write!(f, "Bus address must be specified"),
            Self::InvalidAddress { value } => write!(
                f,
                "Address Error: invalid bus address {value} (max {MAX_BUS_ADDRESS:#04x})"
            ),
            Self::InvalidSensorId { len } => write!(
                f,
                "Sensor Error: invalid device identifier ({len} characters, expected {SENSOR_ID_LEN})"
            ),
            Self::MissingSensorId => write!(f, "Sensor Error: sensor identifier must be specified"),
        }
    }
}

#[cfg(feature = "std")]
impl core::error::Error for BuilderError {}
