//! Custom CGRAM glyphs
//!
//! The HD44780 has room for eight user-defined 5x8 characters. Each glyph is
//! eight row bytes, top row first, using the low five bits of each byte.
//! Writing the slot number as a character code shows the glyph.

/// Number of CGRAM slots
pub const GLYPH_SLOTS: u8 = 8;

/// A 5x8 character pattern
pub type Glyph = [u8; 8];

/// Slot permanently reserved for [`DEGREE`]
pub const DEGREE_SLOT: u8 = 0x01;

/// Small raised ring used as the degree sign
///
/// ```text
/// .##.
/// #..#
/// #..#
/// .##.
/// ```
pub const DEGREE: Glyph = [0x06, 0x09, 0x09, 0x06, 0x00, 0x00, 0x00, 0x00];

/// Character to write to show the degree sign
pub const DEGREE_CHAR: char = DEGREE_SLOT as char;
