use crate::lcd::hd44780::driver::{CursorDirection, HD44780Driver};
use crate::{I2cBus, I2cError, I2cResult, MAX_ADDRESS};
use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};
use std::fmt::{Debug, Formatter};

/// RS line, set for the data register.
pub const RS_DATA: u8 = 0b00000001;
/// E line, the controller latches the nibble on its falling edge.
pub const ENABLE: u8 = 0b00000100;
/// Backlight transistor of the backpack.
pub const BACKLIGHT: u8 = 0b00001000;

/// Time around every edge of the E line.
pub const TOGGLE_DELAY_US: u32 = 600;

/// DDRAM address of the first character of the second row.
pub const ROW_OFFSET: u8 = 0x40;

/// Splits a byte into the two frames sent to the backpack, high nibble first.
///
/// The nibble goes to the upper 4 bits (wired to DB7..DB4), the lower 4 bits carry the control
/// lines: RS in bit 0, E in bit 2 (left low here), backlight in bit 3. Bit 1 would be R/W, which is
/// always low as nothing is ever read.
pub fn frames(data: u8, rs: bool, backlight: bool) -> [u8; 2] {
    let mut control = 0;
    if rs {
        control |= RS_DATA;
    }
    if backlight {
        control |= BACKLIGHT;
    }
    [(data & 0xF0) | control, ((data << 4) & 0xF0) | control]
}

/// I2cHD44780 driver for HD44780 LCD controller behind a PCF8574 I2C backpack.
///
/// The backpack only exposes the upper half of the data bus, so the controller is run in 4-bit mode
/// and every byte goes out as two nibbles. Each nibble is latched by pulsing the E line, with
/// [TOGGLE_DELAY_US] before, between and after the two edges. That's way above what the controller
/// needs, and lets the slowest commands finish before the next transfer without polling the busy flag.
///
/// The driver borrows the bus and the delay, it never closes or frees either of them.
pub struct I2cHD44780Driver<'a> {
    bus: &'a mut dyn I2cBus,
    delay: &'a mut dyn DelayNs,
    address: u8,
    width: u8,
    lines: u8,
    backlight: bool,
    failed_writes: usize,
}

impl<'a> I2cHD44780Driver<'a> {
    /// Creates a new I2cHD44780Driver and runs the power-on sequence, see [HD44780Driver::init].
    ///
    /// # Parameters
    ///
    /// - `bus`: The I2C bus the backpack is attached to.
    /// - `delay`: Blocking delay used for all the protocol timing.
    /// - `address`: 7-bit address of the backpack, usually `0x27` or `0x3F`.
    /// - `width`: Characters per line.
    /// - `lines`: Number of lines.
    ///
    /// `width` and `lines` are kept for reference only, nothing is validated against them.
    ///
    /// # Errors
    /// - `I2cError::InvalidArgument` if the address doesn't fit in 7 bits.
    ///
    /// Failing bus writes are not errors, see [Self::failed_writes].
    pub fn new(
        bus: &'a mut dyn I2cBus,
        delay: &'a mut dyn DelayNs,
        address: u8,
        width: u8,
        lines: u8,
    ) -> I2cResult<Self> {
        if address > MAX_ADDRESS {
            return Err(I2cError::InvalidArgument);
        }

        let mut driver = I2cHD44780Driver {
            bus,
            delay,
            address,
            width,
            lines,
            backlight: true,
            failed_writes: 0,
        };
        driver.init()?;
        Ok(driver)
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn lines(&self) -> u8 {
        self.lines
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Number of bus writes that failed since the driver was created.
    pub fn failed_writes(&self) -> usize {
        self.failed_writes
    }

    /// Switches the backlight on or off. Takes effect immediately, and is kept for every
    /// following transfer.
    pub fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
        self.write_frame(if on { BACKLIGHT } else { 0 });
    }

    fn write_frame(&mut self, frame: u8) {
        trace!("Writing frame: {:08b}", frame);
        if let Err(err) = self.bus.write_byte(self.address, frame) {
            self.failed_writes += 1;
            warn!("I2C write of {:08b} to {:#04x} failed: {}", frame, self.address, err);
        }
    }

    fn toggle_enable(&mut self, frame: u8) {
        self.delay.delay_us(TOGGLE_DELAY_US);
        self.write_frame(frame | ENABLE);
        self.delay.delay_us(TOGGLE_DELAY_US);
        self.write_frame(frame & !ENABLE);
        self.delay.delay_us(TOGGLE_DELAY_US);
    }

    fn send(&mut self, data: u8, rs: bool) {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        let [high, low] = frames(data, rs, self.backlight);
        self.toggle_enable(high);
        self.toggle_enable(low);
    }
}

impl Debug for I2cHD44780Driver<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I2cHD44780Driver")
            .field("bus", &self.bus)
            .field("address", &format_args!("{:#04x}", self.address))
            .field("width", &self.width)
            .field("lines", &self.lines)
            .field("backlight", &self.backlight)
            .field("failed_writes", &self.failed_writes)
            .finish()
    }
}

impl HD44780Driver for I2cHD44780Driver<'_> {
    /// Runs the "initialization by instruction" sequence from the HD44780 datasheet, for a 4-bit
    /// interface.
    ///
    /// The first three `0x03` sends put the controller in 8-bit mode whatever state it was in, and
    /// `0x02` then switches it to 4-bit mode. Only the low nibble of these matters, the high one is
    /// all zeroes and gets read as a no-op.
    fn init(&mut self) -> I2cResult<()> {
        debug!("Initializing HD44780 at {:#04x}", self.address);

        // Synchronize
        self.delay.delay_ms(40);
        self.send_command(0x03);
        self.delay.delay_ms(5);
        self.send_command(0x03);
        self.delay.delay_ms(1);
        self.send_command(0x03);
        self.delay.delay_ms(1);
        self.send_command(0x02);

        self.function_set(false, true, false);
        self.clear_screen();
        self.set_entry_mode(CursorDirection::Right, false);
        self.set_display_control(true, false, false);
        self.return_home();

        if self.failed_writes > 0 {
            warn!("{} writes failed so far, the display might be out of sync", self.failed_writes);
        }
        debug!("HD44780 at {:#04x} initialized", self.address);

        Ok(())
    }

    fn go_to(&mut self, x: u8, y: u8) {
        let mut address = x;
        if y > 0 {
            address |= ROW_OFFSET;
        }
        self.send_command(0b10000000 | address)
    }

    fn send_command(&mut self, command: u8) {
        self.send(command, false)
    }

    fn put_char(&mut self, character: u8) {
        self.send(character, true)
    }
}
