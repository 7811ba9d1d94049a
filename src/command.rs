//! HD44780 instruction bytes
//!
//! The controller is driven in 4-bit mode through a PCF8574 expander, so each
//! instruction below is sent as two nibbles with RS low. Character bytes go out
//! the same way with RS high.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lcdclock::{command, Bus, Builder, Lcd};
//! # use core::convert::Infallible;
//! # struct MockBus;
//! # impl Bus for MockBus {
//! #     type Error = Infallible;
//! #     fn send_byte(&mut self, _byte: u8) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # let config = match Builder::new().device("/dev/i2c-1").address(0x3f).allow_missing_sensor(true).build() {
//! #     Ok(config) => config,
//! #     Err(_) => return,
//! # };
//! let mut lcd = Lcd::new(MockBus, config.pin_map());
//! let _ = lcd.send_command(command::CLEAR_DISPLAY);
//! let _ = lcd.send_command(command::RETURN_HOME);
//! ```

/// Clear display (0x01)
///
/// Fills DDRAM with spaces and resets the address counter. The controller
/// needs a long settle time afterwards.
pub const CLEAR_DISPLAY: u8 = 0x01;

/// Return home (0x02)
///
/// Moves the cursor to the first column of the first line without touching DDRAM.
pub const RETURN_HOME: u8 = 0x02;

/// Function set: 4-bit bus, 2 lines, 5x7 font (0x28)
pub const FUNCTION_SET_4BIT_2LINE: u8 = 0x28;

/// Display on, cursor on, blink on (0x0F)
///
/// Used during initialization so a half-initialized panel is easy to spot.
pub const DISPLAY_ON_CURSOR_BLINK: u8 = 0x0F;

/// Display on, cursor off, blink off (0x0C)
pub const DISPLAY_ON_CURSOR_OFF: u8 = 0x0C;

/// Set CGRAM address base (0x40)
///
/// OR with `slot * 8` to address the first row of a custom glyph.
pub const SET_CGRAM_ADDR: u8 = 0x40;

/// Set DDRAM address to the first line (0x80)
pub const SET_DDRAM_LINE1: u8 = 0x80;

/// Set DDRAM address to the second line (0xC0)
pub const SET_DDRAM_LINE2: u8 = 0xC0;

// Raw nibbles used before the controller is in 4-bit mode

/// 8-bit mode wake-up nibble (0x03)
///
/// Sent three times after power-on to force the controller into a known state.
pub const WAKE_NIBBLE: u8 = 0x03;

/// Switch-to-4-bit nibble (0x02)
pub const FOUR_BIT_NIBBLE: u8 = 0x02;

/// Expander reset byte (0x00)
///
/// Drives every expander output low before the wake sequence.
pub const EXPANDER_RESET: u8 = 0x00;
