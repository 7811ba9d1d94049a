//! Core display operations
//!
//! [`Lcd`] drives an HD44780 in 4-bit mode through the expander. The protocol is
//! write-only: no framebuffer is mirrored, every refresh re-sends the text it
//! needs and then returns the cursor home so line addressing stays predictable.

use embedded_hal::delay::DelayNs;
use log::{debug, trace};

use crate::command::{
    CLEAR_DISPLAY, DISPLAY_ON_CURSOR_BLINK, DISPLAY_ON_CURSOR_OFF, EXPANDER_RESET,
    FOUR_BIT_NIBBLE, FUNCTION_SET_4BIT_2LINE, RETURN_HOME, SET_CGRAM_ADDR, SET_DDRAM_LINE1,
    SET_DDRAM_LINE2, WAKE_NIBBLE,
};
use crate::config::PinMap;
use crate::error::Error;
use crate::glyph::{GLYPH_SLOTS, Glyph};
use crate::interface::Bus;

type DisplayResult<B> = core::result::Result<(), Error<B>>;

// Power-on timing. All values are minimums required by the controller.
const PRE_WAIT_MS: u32 = 5;
const POWER_ON_WAIT_MS: u32 = 20;
const WAKE_PULSE_US: u32 = 10;
const WAKE_SETTLE_MS: [u32; 3] = [15, 5, 5];
const FOUR_BIT_SETTLE_MS: u32 = 5;
const CLEAR_SETTLE_MS: u32 = 10;

// CGRAM programming pacing.
const ADDRESS_JUMP_SETTLE_MS: u32 = 5;
const GLYPH_ROW_US: u32 = 100;

/// Visible columns per line on a 16x2 panel
pub const LINE_WIDTH: usize = 16;

/// HD44780 driver over a byte-wide expander
///
/// Holds the bus for its whole lifetime; dropping the driver releases it.
pub struct Lcd<B>
where
    B: Bus,
{
    /// Byte transport
    bus: B,
    /// Expander wiring
    pins: PinMap,
}

impl<B> Lcd<B>
where
    B: Bus,
{
    /// Create a new driver
    ///
    /// Nothing is sent until [`Lcd::initialize`] is called.
    pub fn new(bus: B, pins: PinMap) -> Self {
        Self { bus, pins }
    }

    /// Run the power-on sequence
    ///
    /// Puts the controller in 4-bit, 2-line, 5x7 mode, clears it, and leaves
    /// the display on with the cursor hidden.
    pub fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<B> {
        debug!("lcd: initializing with {:?}", self.pins);
        delay.delay_ms(PRE_WAIT_MS);
        self.send_raw(EXPANDER_RESET)?;
        delay.delay_ms(POWER_ON_WAIT_MS);

        // Three 8-bit wake pulses, then the switch to 4-bit mode
        for settle_ms in WAKE_SETTLE_MS {
            self.pulse_raw(WAKE_NIBBLE, delay)?;
            delay.delay_ms(settle_ms);
        }
        self.pulse_raw(FOUR_BIT_NIBBLE, delay)?;
        delay.delay_ms(FOUR_BIT_SETTLE_MS);

        self.send_command(FUNCTION_SET_4BIT_2LINE)?;
        self.send_command(DISPLAY_ON_CURSOR_BLINK)?;
        self.send_command(CLEAR_DISPLAY)?;
        delay.delay_ms(CLEAR_SETTLE_MS);

        self.send_command(DISPLAY_ON_CURSOR_OFF)
    }

    /// Send an instruction byte (RS low)
    pub fn send_command(&mut self, cmd: u8) -> DisplayResult<B> {
        trace!("lcd: command {cmd:#04x}");
        self.send_byte(self.pins.command_offset(), cmd)
    }

    /// Send a character byte (RS high)
    pub fn send_char(&mut self, byte: u8) -> DisplayResult<B> {
        self.send_byte(self.pins.data_offset(), byte)
    }

    /// Program a custom glyph into a CGRAM slot
    ///
    /// Leaves the address counter at the start of the first visible line, so
    /// text written afterwards lands on screen rather than in glyph memory.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidGlyphSlot` for slots above 7.
    pub fn load_glyph<D: DelayNs>(
        &mut self,
        slot: u8,
        pattern: &Glyph,
        delay: &mut D,
    ) -> DisplayResult<B> {
        if slot >= GLYPH_SLOTS {
            return Err(Error::InvalidGlyphSlot { slot });
        }
        debug!("lcd: loading glyph into slot {slot}");

        self.send_command(SET_CGRAM_ADDR + slot * 8)?;
        delay.delay_ms(ADDRESS_JUMP_SETTLE_MS);

        for row in pattern {
            self.send_char(*row)?;
            delay.delay_us(GLYPH_ROW_US);
        }

        self.send_command(SET_DDRAM_LINE1)?;
        delay.delay_ms(ADDRESS_JUMP_SETTLE_MS);
        Ok(())
    }

    /// Write text at the current cursor position
    ///
    /// There is no wrapping; call [`Lcd::goto_second_line`] to move down.
    /// Characters `'\u{0}'` to `'\u{7}'` show the CGRAM glyphs.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedChar` without sending anything if the text
    /// contains a non-ASCII character.
    pub fn write_string(&mut self, text: &str) -> DisplayResult<B> {
        if let Some(ch) = text.chars().find(|ch| !ch.is_ascii()) {
            return Err(Error::UnsupportedChar { ch });
        }
        for byte in text.bytes() {
            self.send_char(byte)?;
        }
        Ok(())
    }

    /// Move the cursor to the start of the second line
    pub fn goto_second_line(&mut self) -> DisplayResult<B> {
        self.send_command(SET_DDRAM_LINE2)
    }

    /// Hide the cursor and return it home after a content update
    pub fn home_and_clean(&mut self) -> DisplayResult<B> {
        self.send_command(DISPLAY_ON_CURSOR_OFF)?;
        self.send_command(RETURN_HOME)
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Split a byte into nibbles and latch each one
    fn send_byte(&mut self, offset: u8, byte: u8) -> DisplayResult<B> {
        let high = (byte >> 4) & 0x0F;
        let low = byte & 0x0F;
        self.latch_nibble(offset | high)?;
        self.latch_nibble(offset | low)
    }

    /// EN high then EN low; the controller samples on the falling edge
    fn latch_nibble(&mut self, value: u8) -> DisplayResult<B> {
        self.send_raw(value | self.pins.en)?;
        self.send_raw(value)
    }

    /// Wake-up pulse used before 4-bit mode is active
    fn pulse_raw<D: DelayNs>(&mut self, nibble: u8, delay: &mut D) -> DisplayResult<B> {
        self.send_raw(nibble | self.pins.en)?;
        delay.delay_us(WAKE_PULSE_US);
        self.send_raw(nibble)
    }

    fn send_raw(&mut self, byte: u8) -> DisplayResult<B> {
        self.bus.send_byte(byte).map_err(Error::Bus)
    }
}
