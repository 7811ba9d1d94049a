//! Hardware interface abstraction
//!
//! This module provides the [`Bus`] trait and the [`I2cBus`] struct for pushing
//! single bytes to the PCF8574 expander that drives the HD44780 lines.
//!
//! ## Hardware Requirements
//!
//! - I2C bus with the expander at a 7-bit address (typically 0x27 or 0x3f)
//! - Expander outputs wired per [`PinLayout`](crate::config::PinLayout)
//!
//! Every logical byte sent to the controller costs exactly four bus writes:
//! two nibbles, each written once with EN high and once with EN low.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
//! use lcdclock::{Bus, I2cBus};
//! # use core::convert::Infallible;
//! # struct MockI2c;
//! # impl ErrorType for MockI2c { type Error = Infallible; }
//! # impl I2c<SevenBitAddress> for MockI2c {
//! #     fn transaction(
//! #         &mut self,
//! #         _address: u8,
//! #         _operations: &mut [Operation<'_>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! let mut bus = I2cBus::new(MockI2c, 0x3f);
//!
//! // Drive every expander output low
//! let _ = bus.send_byte(0x00);
//! ```

use core::fmt::Debug;
use embedded_hal::i2c::I2c;

/// Trait for the byte transport to the expander
///
/// This trait abstracts over the bus so the [`Lcd`](crate::display::Lcd)
/// driver can be exercised against a recording mock in tests.
///
/// ## Implementing
///
/// For most cases, use the provided [`I2cBus`]. There is no buffering: one
/// call is one transfer on the wire.
pub trait Bus {
    /// Error type for bus operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Write one byte to the expander's output port
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer fails. The display protocol has no
    /// read-back, so callers treat any error as a lost device.
    fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    type Error = B::Error;

    fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).send_byte(byte)
    }
}

/// Expander transport over an embedded-hal I2C bus
///
/// ## Type Parameters
///
/// * `I2C` - Bus implementing [`I2c`], e.g. `linux_embedded_hal::I2cdev`
///
/// The bus handle is owned for the lifetime of the driver and released when
/// the `I2cBus` is dropped.
pub struct I2cBus<I2C> {
    /// Underlying bus
    i2c: I2C,
    /// 7-bit expander address
    address: u8,
}

impl<I2C> I2cBus<I2C>
where
    I2C: I2c,
{
    /// Create a new transport for the expander at `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Expander address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the underlying bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Bus for I2cBus<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn send_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[byte])
    }
}
