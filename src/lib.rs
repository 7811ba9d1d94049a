//! LCD Clock
//!
//! Drives a 16x2 HD44780 character display through a PCF8574 I2C expander and
//! overlays the temperature from a DS1820 read through the kernel's 1-wire driver.
//!
//! ## Features
//!
//! - HD44780 4-bit protocol over any `embedded-hal` v1.0 I2C bus
//! - Normal and reversed expander wiring, optional backlight
//! - Custom CGRAM glyphs (a degree sign is loaded at startup)
//! - `w1_slave` parsing with CRC classification and optional re-reads (`std` feature)
//! - Per-second clock refresh with a sensor re-query every 20 seconds (`std` feature)
//! - Command-line front end for Linux (`linux` feature)
//!
//! Without the `std` feature the display driver is `no_std`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use lcdclock::{Builder, Bus, Lcd, LocalClock, Scheduler, SensorReader, W1Slave};
//!
//! # struct MockBus;
//! # impl Bus for MockBus {
//! #     type Error = Infallible;
//! #     fn send_byte(&mut self, _byte: u8) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! let config = match Builder::new()
//!     .device("/dev/i2c-1")
//!     .address(0x3f)
//!     .sensor_id("28-0316a2794aff")
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let lcd = Lcd::new(MockBus, config.pin_map());
//! let source = config
//!     .sensor_path()
//!     .map_or_else(W1Slave::absent, W1Slave::new);
//! let reader = SensorReader::new(source, config.retry);
//!
//! let mut scheduler = Scheduler::new(lcd, reader, LocalClock, MockDelay);
//! let _ = scheduler.startup();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

/// HD44780 instruction bytes
pub mod command;
/// Configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Custom CGRAM glyphs
pub mod glyph;
/// Hardware interface abstraction
pub mod interface;

/// Wall-clock formatting
#[cfg(feature = "std")]
pub mod clock;
/// Startup sequence and refresh loop
#[cfg(feature = "std")]
pub mod scheduler;
/// DS1820 sensor reading
#[cfg(feature = "std")]
pub mod sensor;

/// Command-line surface
#[cfg(feature = "linux")]
pub mod cli;

pub use config::{PinLayout, PinMap, RetryPolicy};
pub use display::{LINE_WIDTH, Lcd};
pub use error::Error;
pub use glyph::{DEGREE, DEGREE_SLOT, Glyph};
pub use interface::{Bus, I2cBus};

#[cfg(feature = "std")]
pub use clock::{LocalClock, WallClock, format_clock, is_leap_second};
#[cfg(feature = "std")]
pub use config::{Builder, Config, SensorId};
#[cfg(feature = "std")]
pub use error::BuilderError;
#[cfg(feature = "std")]
pub use scheduler::Scheduler;
#[cfg(feature = "std")]
pub use sensor::{RawSource, SensorReader, SensorReading, SensorStatus, W1Slave};
