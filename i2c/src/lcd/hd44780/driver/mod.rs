mod i2c;

pub use i2c::*;
use log::warn;
use std::fmt::Debug;

/// Low-level interface of an HD44780 controller.
///
/// The command set is implemented here on top of [Self::send_command] and [Self::put_char], which
/// are provided by the specific bus implementation. The bus is write-only, so the busy flag is never
/// polled; implementations wait long enough after every transfer instead.
///
/// Transfer failures are not reported through these methods. A dropped byte usually gets corrected by
/// the next command, so implementations log it and carry on.
pub trait HD44780Driver: Debug {
    /// Brings the controller from an unknown state into 4-bit, 2-line mode with the display on,
    /// the cursor hidden and at the home position.
    ///
    /// Always succeeds; the bus can't be read back to verify the controller state.
    fn init(&mut self) -> crate::I2cResult<()>;

    /// Clears the display and sets the cursor to the home position.
    fn clear_screen(&mut self) {
        self.send_command(0b00000001)
    }

    /// Sets the cursor to the home position, without touching the content.
    fn return_home(&mut self) {
        self.send_command(0b00000010)
    }

    /// Sets the direction the cursor moves after each character, and whether the whole display
    /// shifts instead.
    fn set_entry_mode(&mut self, cursor_direction: CursorDirection, shift: bool) {
        let mut command = 0b00000100;
        if cursor_direction == CursorDirection::Right {
            command |= 0b00000010;
        }
        if shift {
            command |= 0b00000001;
        }
        self.send_command(command)
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    fn set_display_control(&mut self, display_on: bool, cursor_on: bool, blink_on: bool) {
        let mut command = 0b00001000;
        if display_on {
            command |= 0b00000100;
        }
        if cursor_on {
            command |= 0b00000010;
        }
        if blink_on {
            command |= 0b00000001;
        }
        self.send_command(command)
    }

    /// Moves the cursor or shifts the display.
    fn cursor_shift(&mut self, display_shift: bool, direction: CursorDirection) {
        let mut command = 0b00010000;
        if display_shift {
            command |= 0b00001000;
        }
        if direction == CursorDirection::Right {
            command |= 0b00000100;
        }
        self.send_command(command)
    }

    /// Sets the interface width, the number of lines and the font.
    ///
    /// `eight_bit` must stay `false` once the controller is in 4-bit mode, or it will stop
    /// understanding the following transfers.
    fn function_set(&mut self, eight_bit: bool, two_lines: bool, alt_font: bool) {
        let mut command = 0b00100000;
        if eight_bit {
            command |= 0b00010000;
        }
        if two_lines {
            command |= 0b00001000;
        }
        if alt_font {
            command |= 0b00000100;
        }
        self.send_command(command)
    }

    /// Sets the CGRAM address. Only the low 6 bits are used.
    fn set_cgram_address(&mut self, address: u8) {
        self.send_command(0b01000000 | (address & 0b00111111))
    }

    /// Sets the DDRAM address. Only the low 7 bits are used.
    fn set_ddram_address(&mut self, address: u8) {
        self.send_command(0b10000000 | (address & 0b01111111))
    }

    /// Moves the cursor to column `x` of row `y`.
    ///
    /// Any row past the first one maps to the second row. Nothing is checked against the size of
    /// the display; out of range positions end up wherever the controller puts them.
    fn go_to(&mut self, x: u8, y: u8);

    /// Writes character codes at the cursor position, each one as-is.
    ///
    /// Stops at the first `0`. Codes above `0x7F` select the upper half of the character ROM, e.g.
    /// `0xDF` is the degree sign on the common A00 ROM.
    /// There is no wrapping: text running past the visible width keeps going into the hidden part
    /// of the line.
    fn put_string(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if byte == 0 {
                break;
            }
            self.put_char(byte);
        }
    }

    /// Writes a string at the cursor position, see [Self::put_string].
    ///
    /// Non-ASCII characters have no fixed place in the controller ROM and are shown as `?`.
    fn put_str(&mut self, s: &str) {
        for c in s.chars() {
            if c == '\0' {
                break;
            }
            if c.is_ascii() {
                self.put_char(c as u8);
            } else {
                warn!("Non-ASCII character: {}", c);
                self.put_char(b'?');
            }
        }
    }

    /// Stores a custom 5x8 glyph in one of the 8 CGRAM slots. It can be shown afterwards by writing
    /// the slot number as a character.
    ///
    /// The cursor is moved back to the home position, since the address counter is left pointing
    /// into CGRAM.
    fn define_char(&mut self, slot: u8, glyph: &[u8; 8]) {
        self.set_cgram_address((slot & 0b111) << 3);
        for row in glyph {
            self.put_char(row & 0b00011111);
        }
        self.set_ddram_address(0);
    }

    // Low-level commands
    // These raw commands are used by the high-level functions above.
    // They are implemented by the driver implementation.

    /// Sends a command to the HD44780 controller.
    /// Sets the RS line to 0 (instruction register).
    fn send_command(&mut self, command: u8);

    /// Sends a character to the HD44780 controller.
    /// Sets the RS line to 1 (data register).
    fn put_char(&mut self, character: u8);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    Right,
}
