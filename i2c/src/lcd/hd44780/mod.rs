//! HD44780 LCD module.
//!
//! The HD44780 is the controller behind nearly every 16x2 and 20x4 character display. Here it's
//! driven through a PCF8574-style I2C backpack, see [driver::I2cHD44780Driver].

pub mod driver;
